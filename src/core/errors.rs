/*!
 * Error Types
 * Recoverable syncpoint errors with thiserror, miette and serde support
 *
 * Configuration faults and stuck-wait escalations are not represented here:
 * they panic after dumping diagnostics.
 */

use super::types::{IdKind, InlineString, SyncptId};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Syncpoint, interrupt and mutex errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SyncptError {
    #[error("Wait on syncpt {id} for {thresh} would never be met (max {max})")]
    #[diagnostic(
        code(syncpt::invalid_threshold),
        help("No work has been submitted that increments the syncpoint this far. Advance max before waiting.")
    )]
    InvalidThreshold { id: SyncptId, thresh: u32, max: u32 },

    #[error("Syncpt {id} has not reached {thresh} and no wait time was given")]
    #[diagnostic(
        code(syncpt::would_block),
        help("Retry later or pass a non-zero timeout.")
    )]
    WouldBlock { id: SyncptId, thresh: u32 },

    #[error("Timed out waiting for syncpt {id} to reach {thresh}")]
    #[diagnostic(
        code(syncpt::timeout),
        help("The hardware has not finished the work yet. Retry or increase the timeout.")
    )]
    Timeout { id: SyncptId, thresh: u32 },

    #[error("Out of interrupt waiters")]
    #[diagnostic(
        code(syncpt::no_memory),
        help("Too many threads are blocked on syncpoints. Retry once waits complete.")
    )]
    NoMemory,

    #[error("Interrupt registration failed: {0}")]
    #[diagnostic(code(syncpt::interrupt))]
    Interrupt(InlineString),

    #[error("Wait interrupted by signal")]
    #[diagnostic(
        code(syncpt::interrupted),
        help("A signal was delivered to the waiting thread. The wait may be restarted.")
    )]
    Interrupted,

    #[error("Hardware mutex {0} is busy")]
    #[diagnostic(code(syncpt::busy))]
    Busy(u32),

    #[error("Hardware mutex {0} released without being held")]
    #[diagnostic(
        code(syncpt::not_held),
        help("Every release must match an earlier successful try-lock.")
    )]
    NotHeld(u32),

    #[error("Device busy ({0} outstanding power references)")]
    #[diagnostic(
        code(syncpt::device_busy),
        help("Release all mutexes and let in-flight operations finish before suspending.")
    )]
    DeviceBusy(usize),

    #[error("Invalid {kind} id {id} (limit {limit})")]
    #[diagnostic(code(syncpt::invalid_id))]
    InvalidId { kind: IdKind, id: u32, limit: u32 },

    #[error("Failed to patch wait: {0}")]
    #[diagnostic(
        code(syncpt::patch_failed),
        help("The memory client rejected the command buffer patch.")
    )]
    Patch(InlineString),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(syncpt::invalid_config))]
    InvalidConfig(InlineString),
}

impl SyncptError {
    /// Errors a caller can simply retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncptError::WouldBlock { .. }
                | SyncptError::Timeout { .. }
                | SyncptError::Interrupted
                | SyncptError::Busy(_)
                | SyncptError::NoMemory
        )
    }
}

/// Result type for syncpoint operations
pub type SyncptResult<T> = Result<T, SyncptError>;
