/*!
 * Threshold Wait Engine
 *
 * `wait_timeout` escalates through:
 *
 * 1. cached `min` already past the threshold (no hardware, no power)
 * 2. direct register read under the power bracket
 * 3. `WouldBlock` when no wait time was given
 * 4. interrupt registration
 * 5. interruptible sleep in slices of at most one check period, reporting
 *    the waiter as stuck after every unproductive slice
 *
 * The registration and power bracket are released on every exit path.
 */

use super::ops::SyncptOp;
use super::Syncpt;
use crate::core::errors::{SyncptError, SyncptResult};
use crate::core::guard::BusyGuard;
use crate::core::sync::{WaitCondition, WaitEvent};
use crate::core::types::{syncpt_reached, SyncptId, Timeout};
use crate::intr::{ActionRef, IntrAction};
use crate::monitoring::WaitSpan;
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};

impl Syncpt {
    /// Wait until syncpoint `id` reaches `thresh`
    ///
    /// Returns the value that satisfied the wait.
    ///
    /// # Errors
    ///
    /// - `InvalidThreshold` if `thresh` is beyond the tracked max
    /// - `WouldBlock` for a zero timeout that is not yet satisfied
    /// - `NoMemory` / `Interrupt` if the interrupt registration fails
    /// - `Interrupted` if a signal is delivered to the waiting thread
    /// - `Timeout` once the whole budget is spent
    ///
    /// # Panics
    ///
    /// When the wait has been reported stuck more than the configured number
    /// of times, as the hardware is considered hung.
    pub fn wait_timeout(
        &self,
        id: SyncptId,
        thresh: u32,
        timeout: impl Into<Timeout>,
    ) -> SyncptResult<u32> {
        let timeout = timeout.into();
        self.check_syncpt(id)?;
        self.require(SyncptOp::UpdateMin);

        if !self.cache.check_max(id, thresh) {
            let max = self.cache.read_max(id);
            warn!(
                id,
                name = %self.ops.name(id),
                thresh,
                max,
                "wait wouldn't be met"
            );
            self.debug.dump();
            self.stats.inc_invalid_threshold();
            return Err(SyncptError::InvalidThreshold { id, thresh, max });
        }

        // first check cache
        if self.cache.min_cmp(id, thresh) {
            self.stats.inc_cache_hit();
            let value = self.cache.read_min(id);
            trace!(id, thresh, value, "wait satisfied from cache");
            return Ok(value);
        }

        // keep host alive
        let _busy = BusyGuard::new(self.power.as_ref());

        if self.cache.client_managed(id) || !self.cache.min_eq_max(id) {
            let value = self.ops.update_min(&self.cache, id);
            if syncpt_reached(value, thresh) {
                self.stats.inc_hw_hit();
                trace!(id, thresh, value, "wait satisfied from register");
                return Ok(value);
            }
        }

        if timeout.is_zero() {
            self.stats.inc_would_block();
            return Err(SyncptError::WouldBlock { id, thresh });
        }

        // schedule a wakeup when the syncpoint value is reached
        let waiter = self.intr.alloc_waiter().ok_or(SyncptError::NoMemory)?;
        let wq = Arc::new(WaitCondition::new());
        let handle = self.intr.add_action(
            id,
            thresh,
            IntrAction::WakeupInterruptible,
            wq.clone(),
            waiter,
        )?;
        let _action = ActionRef::new(self.intr.as_ref(), handle);

        self.sleep_until(id, thresh, timeout, &wq)
    }

    /// Wait with no timeout
    pub fn wait(&self, id: SyncptId, thresh: u32) -> SyncptResult<u32> {
        self.wait_timeout(id, thresh, Timeout::Never)
    }

    /// Sliced interruptible sleep on `wq` until the threshold is met
    fn sleep_until(
        &self,
        id: SyncptId,
        thresh: u32,
        timeout: Timeout,
        wq: &Arc<WaitCondition>,
    ) -> SyncptResult<u32> {
        let period = self.config.check_period;
        let mut remaining = timeout;
        let mut check_count = 0u32;
        let mut low_timeout: Option<Duration> = None;

        let span = WaitSpan::new(id, thresh);
        let _entered = span.enter();
        let sleep = self.signals.sleep_on(wq);
        self.stats.inc_blocked();

        while !remaining.is_zero() {
            let check = match remaining {
                Timeout::Never => period,
                Timeout::After(left) => left.min(period),
            };

            let event =
                wq.wait_interruptible_timeout(check, &sleep, || self.cache.min_cmp(id, thresh));
            match event {
                WaitEvent::Satisfied { .. } => {
                    self.stats.inc_woken();
                    return Ok(self.cache.read_min(id));
                }
                WaitEvent::Interrupted => {
                    sleep.consume_signal();
                    self.stats.inc_interrupted();
                    return Err(SyncptError::Interrupted);
                }
                WaitEvent::TimedOut if self.cache.min_cmp(id, thresh) => {
                    self.stats.inc_woken();
                    return Ok(self.cache.read_min(id));
                }
                WaitEvent::TimedOut => {}
            }

            if let Timeout::After(left) = remaining {
                if left < period {
                    // Caller-specified timeout may be impractically low
                    low_timeout = Some(left);
                }
                remaining = Timeout::After(left.saturating_sub(check));
            }

            if !remaining.is_zero() {
                self.report_stuck(id, thresh, remaining, check_count, low_timeout);
                check_count += 1;
            }
        }

        self.stats.inc_timeout();
        Err(SyncptError::Timeout { id, thresh })
    }
}
