/*!
 * Module Power
 * Atomic refcount implementation of the power bracket
 */

use super::PowerBracket;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::{debug, error};

/// Reference-counted power state of one hardware module
#[repr(C, align(64))]
pub struct ModulePower {
    name: &'static str,
    refcount: AtomicUsize,
    power_ups: AtomicU64,
}

impl ModulePower {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            refcount: AtomicUsize::new(0),
            power_ups: AtomicU64::new(0),
        }
    }

    /// Outstanding busy references
    #[inline]
    pub fn refcount(&self) -> usize {
        self.refcount.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.refcount() > 0
    }

    /// Number of idle -> busy transitions so far
    pub fn power_ups(&self) -> u64 {
        self.power_ups.load(Ordering::Relaxed)
    }
}

impl PowerBracket for ModulePower {
    fn busy(&self) {
        if self.refcount.fetch_add(1, Ordering::AcqRel) == 0 {
            self.power_ups.fetch_add(1, Ordering::Relaxed);
            debug!(module = self.name, "module busy");
        }
    }

    fn idle(&self) {
        match self
            .refcount
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => debug!(module = self.name, "module idle"),
            Ok(_) => {}
            Err(_) => error!(module = self.name, "idle without matching busy"),
        }
    }
}
