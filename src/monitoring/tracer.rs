/*!
 * Structured Tracing
 * Subscriber setup and spans for blocking syncpoint waits
 */

use crate::core::types::SyncptId;
use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Environment switch for JSON log output
pub const ENV_TRACE_JSON: &str = "SYNCPT_TRACE_JSON";

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SYNCPT_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Span covering the blocking part of one threshold wait
pub struct WaitSpan {
    span: tracing::Span,
    start: Instant,
    id: SyncptId,
    thresh: u32,
}

impl WaitSpan {
    pub fn new(id: SyncptId, thresh: u32) -> Self {
        let span = span!(
            Level::DEBUG,
            "syncpt_wait",
            id,
            thresh,
            duration_ms = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            id,
            thresh,
        }
    }

    /// Enter the span for the duration of the returned guard
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for WaitSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_ms", duration.as_millis() as u64);

        if duration.as_secs() >= 1 {
            warn!(
                id = self.id,
                thresh = self.thresh,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow syncpt wait"
            );
        } else {
            debug!(
                id = self.id,
                thresh = self.thresh,
                duration_us = duration.as_micros() as u64,
                "syncpt wait finished"
            );
        }
    }
}
