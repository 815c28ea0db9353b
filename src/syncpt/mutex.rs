/*!
 * Hardware Mutexes
 *
 * Non-blocking acquire/release of the host's binary hardware locks. Each
 * lock is mirrored by a software count so unbalanced releases are caught,
 * and the device stays powered for as long as any lock is held through
 * this manager.
 */

use super::ops::SyncptOp;
use super::Syncpt;
use crate::core::errors::{SyncptError, SyncptResult};
use crate::core::guard::{Guard, GuardError, GuardResult};
use crate::core::types::MutexId;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, error};

/// Software lock counts, one per hardware mutex
pub(super) struct LockCounts(Box<[AtomicU32]>);

impl LockCounts {
    pub(super) fn new(nb_mtxs: u32) -> Self {
        Self((0..nb_mtxs).map(|_| AtomicU32::new(0)).collect())
    }

    #[inline]
    pub(super) fn len(&self) -> u32 {
        self.0.len() as u32
    }

    #[inline]
    pub(super) fn get(&self, idx: MutexId) -> u32 {
        self.0[idx as usize].load(Ordering::Acquire)
    }

    fn increment(&self, idx: MutexId) {
        // saturating
        let _ = self.0[idx as usize].fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
            c.checked_add(1)
        });
    }

    /// Decrement, `false` if the count was already zero
    fn decrement(&self, idx: MutexId) -> bool {
        self.0[idx as usize]
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1))
            .is_ok()
    }
}

impl Syncpt {
    /// Try to take hardware mutex `idx` without blocking
    ///
    /// On success the device stays busy until the matching
    /// [`mutex_unlock`](Self::mutex_unlock).
    ///
    /// # Errors
    ///
    /// `Busy` if the hardware reports the mutex as owned; the lock count is
    /// left unchanged.
    pub fn mutex_try_lock(&self, idx: MutexId) -> SyncptResult<()> {
        self.check_mutex(idx)?;
        self.require(SyncptOp::MutexTryLock);

        self.power.busy();
        if self.ops.mutex_try_lock(idx) {
            self.power.idle();
            debug!(idx, "hardware mutex busy");
            return Err(SyncptError::Busy(idx));
        }
        self.lock_counts.increment(idx);
        Ok(())
    }

    /// Release hardware mutex `idx`
    ///
    /// # Errors
    ///
    /// `NotHeld` if this manager holds no lock on `idx`; the hardware and
    /// the power bracket are left alone in that case.
    pub fn mutex_unlock(&self, idx: MutexId) -> SyncptResult<()> {
        self.check_mutex(idx)?;
        self.require(SyncptOp::MutexUnlock);

        // claim the release before touching hardware or power
        if !self.lock_counts.decrement(idx) {
            error!(idx, "unbalanced hardware mutex release");
            return Err(SyncptError::NotHeld(idx));
        }

        self.ops.mutex_unlock(idx);
        self.power.idle();
        Ok(())
    }

    /// Number of acquisitions of mutex `idx` not yet released
    pub fn lock_count(&self, idx: MutexId) -> SyncptResult<u32> {
        self.check_mutex(idx)?;
        Ok(self.lock_counts.get(idx))
    }

    /// Take mutex `idx`, releasing it when the guard drops
    pub fn try_lock_guard(&self, idx: MutexId) -> SyncptResult<HwMutexGuard<'_>> {
        self.mutex_try_lock(idx)?;
        Ok(HwMutexGuard {
            syncpt: self,
            idx,
            active: true,
        })
    }
}

/// Hardware mutex held for the lifetime of the guard
pub struct HwMutexGuard<'a> {
    syncpt: &'a Syncpt,
    idx: MutexId,
    active: bool,
}

impl HwMutexGuard<'_> {
    pub fn idx(&self) -> MutexId {
        self.idx
    }
}

impl Guard for HwMutexGuard<'_> {
    fn resource_type(&self) -> &'static str {
        "hw_mutex"
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn release(&mut self) -> GuardResult<()> {
        if !self.active {
            return Err(GuardError::AlreadyReleased);
        }
        self.active = false;
        self.syncpt.mutex_unlock(self.idx).map_err(|e| {
            error!(idx = self.idx, error = %e, "hardware mutex guard release failed");
            GuardError::ReleaseFailed(e.to_string())
        })
    }
}

impl Drop for HwMutexGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.release();
        }
    }
}
