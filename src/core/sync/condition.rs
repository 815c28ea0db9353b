/*!
 * Wait Condition
 *
 * Condvar-backed wait queue head. Sleepers re-evaluate a condition under the
 * queue lock, so a waker that changes state before calling `wake_all` can
 * never be missed.
 */

use crate::signals::InterruptibleSleep;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Result of a wake operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Successfully woke N waiters (N >= 1)
    Woken(usize),
    /// No waiters were waiting
    NoWaiters,
}

impl WakeResult {
    /// Check if any waiters were woken
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    /// Get number of woken waiters (0 if none)
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }
}

/// How an interruptible timed sleep ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitEvent {
    /// Condition became true with this much of the slice left
    Satisfied { remaining: Duration },
    /// Slice expired with the condition still false
    TimedOut,
    /// A signal is pending for the sleeping thread
    Interrupted,
}

/// Wait queue head shared between a sleeper and its wakers
pub struct WaitCondition {
    generation: Mutex<u64>,
    condvar: Condvar,
    sleepers: AtomicUsize,
}

impl WaitCondition {
    pub fn new() -> Self {
        Self {
            generation: Mutex::new(0),
            condvar: Condvar::new(),
            sleepers: AtomicUsize::new(0),
        }
    }

    /// Wake every thread sleeping on this condition
    pub fn wake_all(&self) -> WakeResult {
        let mut generation = self.generation.lock();
        *generation = generation.wrapping_add(1);
        match self.condvar.notify_all() {
            0 => WakeResult::NoWaiters,
            n => WakeResult::Woken(n),
        }
    }

    /// Approximate number of sleepers (for diagnostics)
    pub fn sleeper_count(&self) -> usize {
        self.sleepers.load(Ordering::Relaxed)
    }

    /// Sleep until `condition` holds or `timeout` elapses
    ///
    /// Returns `true` if the condition was met.
    pub fn wait_timeout<F>(&self, timeout: Duration, mut condition: F) -> bool
    where
        F: FnMut() -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut generation = self.generation.lock();
        self.sleepers.fetch_add(1, Ordering::Relaxed);

        let met = loop {
            if condition() {
                break true;
            }
            if Instant::now() >= deadline {
                break false;
            }
            self.condvar.wait_until(&mut generation, deadline);
        };

        self.sleepers.fetch_sub(1, Ordering::Relaxed);
        met
    }

    /// Interruptible variant of [`wait_timeout`](Self::wait_timeout)
    ///
    /// The condition is checked first, so a satisfied condition wins over a
    /// pending signal.
    pub fn wait_interruptible_timeout<F>(
        &self,
        timeout: Duration,
        sleep: &InterruptibleSleep<'_>,
        mut condition: F,
    ) -> WaitEvent
    where
        F: FnMut() -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut generation = self.generation.lock();
        self.sleepers.fetch_add(1, Ordering::Relaxed);

        let event = loop {
            if condition() {
                break WaitEvent::Satisfied {
                    remaining: deadline.saturating_duration_since(Instant::now()),
                };
            }
            if sleep.signal_pending() {
                break WaitEvent::Interrupted;
            }
            if Instant::now() >= deadline {
                break WaitEvent::TimedOut;
            }
            self.condvar.wait_until(&mut generation, deadline);
        };

        self.sleepers.fetch_sub(1, Ordering::Relaxed);
        event
    }
}

impl Default for WaitCondition {
    fn default() -> Self {
        Self::new()
    }
}
