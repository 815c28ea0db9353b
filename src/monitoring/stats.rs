/*!
 * Wait Statistics
 * Lock-free counters of which path each threshold wait resolved through
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Serializable copy of the wait counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WaitStatsSnapshot {
    pub cache_hits: u64,
    pub hw_hits: u64,
    pub blocked: u64,
    pub woken: u64,
    pub would_block: u64,
    pub timeouts: u64,
    pub interrupted: u64,
    pub invalid_thresholds: u64,
    pub stuck_reports: u64,
}

/// Atomic wait statistics
///
/// # Performance
/// Cache-line aligned; every counter is a relaxed increment
#[repr(C, align(64))]
#[derive(Default)]
pub struct WaitStats {
    cache_hits: AtomicU64,
    hw_hits: AtomicU64,
    blocked: AtomicU64,
    woken: AtomicU64,
    would_block: AtomicU64,
    timeouts: AtomicU64,
    interrupted: AtomicU64,
    invalid_thresholds: AtomicU64,
    stuck_reports: AtomicU64,
}

impl WaitStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Satisfied from the cached value, no hardware access
    #[inline(always)]
    pub fn inc_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Satisfied by the direct register read
    #[inline(always)]
    pub fn inc_hw_hit(&self) {
        self.hw_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Entered the interrupt-driven sleep
    #[inline(always)]
    pub fn inc_blocked(&self) {
        self.blocked.fetch_add(1, Ordering::Relaxed);
    }

    /// Blocking sleep ended with the threshold met
    #[inline(always)]
    pub fn inc_woken(&self) {
        self.woken.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_would_block(&self) {
        self.would_block.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_interrupted(&self) {
        self.interrupted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_invalid_threshold(&self) {
        self.invalid_thresholds.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_stuck_report(&self) {
        self.stuck_reports.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> WaitStatsSnapshot {
        WaitStatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            hw_hits: self.hw_hits.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            woken: self.woken.load(Ordering::Relaxed),
            would_block: self.would_block.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            interrupted: self.interrupted.load(Ordering::Relaxed),
            invalid_thresholds: self.invalid_thresholds.load(Ordering::Relaxed),
            stuck_reports: self.stuck_reports.load(Ordering::Relaxed),
        }
    }
}
