/*!
 * Syncpoints
 *
 * Counter cache, threshold waits, hardware mutexes and wait checks over a
 * pluggable hardware operation table.
 *
 * # Architecture
 *
 * - `SyncptCache`: shadow `min`/`max`/wait-base values, cheap comparisons
 * - `Syncpt::wait_timeout`: cache check, register probe, then
 *   interrupt-driven sleep in check-period slices
 * - `Syncpt::mutex_try_lock` / `mutex_unlock`: non-blocking hardware locks
 *   with a software lock count
 * - `Syncpt::wait_check`: delegated expired-wait patching
 *
 * Configuration faults (missing operations, untracked work at save time)
 * and hung waits panic instead of returning errors.
 */

mod cache;
mod diagnostics;
mod mutex;
mod ops;
mod wait;
mod waitchk;

pub use cache::{CacheSnapshot, SyncptCache, SyncptState};
pub use diagnostics::{dump_clock_tree, CacheDump, DebugDump};
pub use mutex::HwMutexGuard;
pub use ops::{MemoryClient, SyncptOp, SyncptOps, WaitCheck};

use crate::config::SyncptConfig;
use crate::core::errors::{SyncptError, SyncptResult};
use crate::core::guard::BusyGuard;
use crate::core::types::{IdKind, MutexId, SyncptId, WaitBaseId};
use crate::intr::Interrupts;
use crate::monitoring::{WaitStats, WaitStatsSnapshot};
use crate::power::{ModulePower, PowerBracket};
use crate::signals::Signals;
use mutex::LockCounts;
use std::sync::atomic::{fence, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// Syncpoint manager of one host device
pub struct Syncpt {
    config: SyncptConfig,
    cache: Arc<SyncptCache>,
    ops: Arc<dyn SyncptOps>,
    intr: Arc<dyn Interrupts>,
    power: Arc<dyn PowerBracket>,
    debug: Arc<dyn DebugDump>,
    signals: Signals,
    lock_counts: LockCounts,
    stats: WaitStats,
}

/// Builder for [`Syncpt`]
pub struct SyncptBuilder {
    config: SyncptConfig,
    cache: Arc<SyncptCache>,
    ops: Arc<dyn SyncptOps>,
    intr: Arc<dyn Interrupts>,
    power: Option<Arc<dyn PowerBracket>>,
    debug: Option<Arc<dyn DebugDump>>,
}

impl SyncptBuilder {
    /// Power bracket collaborator (default: a private `ModulePower`)
    pub fn with_power(mut self, power: Arc<dyn PowerBracket>) -> Self {
        self.power = Some(power);
        self
    }

    /// Device-wide debug dump (default: `CacheDump`)
    pub fn with_debug(mut self, debug: Arc<dyn DebugDump>) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn build(self) -> SyncptResult<Syncpt> {
        self.config.validate()?;
        if self.cache.nb_pts() != self.config.nb_pts || self.cache.nb_bases() != self.config.nb_bases {
            return Err(SyncptError::InvalidConfig(
                format!(
                    "cache sized {}x{} but config wants {}x{}",
                    self.cache.nb_pts(),
                    self.cache.nb_bases(),
                    self.config.nb_pts,
                    self.config.nb_bases
                )
                .into(),
            ));
        }

        let power = self
            .power
            .unwrap_or_else(|| Arc::new(ModulePower::new("host")) as Arc<dyn PowerBracket>);
        let debug = self
            .debug
            .unwrap_or_else(|| {
                Arc::new(CacheDump::new(self.cache.clone(), self.ops.clone())) as Arc<dyn DebugDump>
            });

        Ok(Syncpt {
            lock_counts: LockCounts::new(self.config.nb_mtxs),
            config: self.config,
            cache: self.cache,
            ops: self.ops,
            intr: self.intr,
            power,
            debug,
            signals: Signals::new(),
            stats: WaitStats::new(),
        })
    }
}

impl Syncpt {
    pub fn builder(
        config: SyncptConfig,
        cache: Arc<SyncptCache>,
        ops: Arc<dyn SyncptOps>,
        intr: Arc<dyn Interrupts>,
    ) -> SyncptBuilder {
        SyncptBuilder {
            config,
            cache,
            ops,
            intr,
            power: None,
            debug: None,
        }
    }

    pub fn config(&self) -> &SyncptConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<SyncptCache> {
        &self.cache
    }

    /// Signal delivery for threads blocked in `wait_timeout`
    pub fn signals(&self) -> &Signals {
        &self.signals
    }

    pub fn stats(&self) -> WaitStatsSnapshot {
        self.stats.snapshot()
    }

    /// Configuration fault unless the operation table provides `op`
    fn require(&self, op: SyncptOp) {
        if !self.ops.supports(op) {
            error!(?op, "hardware operation table lacks required operation");
            panic!("syncpt operation {:?} not provided by hardware layer", op);
        }
    }

    fn check_syncpt(&self, id: SyncptId) -> SyncptResult<()> {
        check_range(IdKind::Syncpt, id, self.cache.nb_pts())
    }

    fn check_wait_base(&self, id: WaitBaseId) -> SyncptResult<()> {
        check_range(IdKind::WaitBase, id, self.cache.nb_bases())
    }

    fn check_mutex(&self, idx: MutexId) -> SyncptResult<()> {
        check_range(IdKind::Mutex, idx, self.lock_counts.len())
    }

    /// Restore every syncpoint and wait base register from the cache
    ///
    /// # Panics
    ///
    /// If the hardware layer cannot reset syncpoints or wait bases.
    pub fn reset(&self) {
        self.require(SyncptOp::Reset);
        self.require(SyncptOp::ResetWaitBase);

        for id in 0..self.cache.nb_pts() {
            self.ops.reset(&self.cache, id);
        }
        for id in 0..self.cache.nb_bases() {
            self.ops.reset_wait_base(&self.cache, id);
        }
        fence(Ordering::SeqCst);
    }

    /// Resynchronize the cache from hardware before the device loses state
    ///
    /// # Panics
    ///
    /// If a tracked syncpoint still has outstanding work (`min != max`), or
    /// if the hardware layer cannot read syncpoints or wait bases.
    pub fn save(&self) {
        self.require(SyncptOp::UpdateMin);
        self.require(SyncptOp::ReadWaitBase);

        for id in 0..self.cache.nb_pts() {
            if self.cache.client_managed(id) {
                self.ops.update_min(&self.cache, id);
            } else if !self.cache.min_eq_max(id) {
                let (min, max) = (self.cache.read_min(id), self.cache.read_max(id));
                error!(id, min, max, "tracked syncpt has outstanding work at save");
                panic!("syncpt {} min {} != max {} at save", id, min, max);
            }
        }

        for id in 0..self.cache.nb_bases() {
            self.ops.read_wait_base(&self.cache, id);
        }
    }

    /// Refresh the cached value from hardware; caller keeps the device powered
    pub fn update_min(&self, id: SyncptId) -> SyncptResult<u32> {
        self.check_syncpt(id)?;
        self.require(SyncptOp::UpdateMin);
        Ok(self.ops.update_min(&self.cache, id))
    }

    /// Current syncpoint value, read from hardware
    pub fn read(&self, id: SyncptId) -> SyncptResult<u32> {
        self.check_syncpt(id)?;
        self.require(SyncptOp::UpdateMin);
        let _busy = BusyGuard::new(self.power.as_ref());
        Ok(self.ops.update_min(&self.cache, id))
    }

    /// Current wait base value, read from hardware
    pub fn read_wait_base(&self, id: WaitBaseId) -> SyncptResult<u32> {
        self.check_wait_base(id)?;
        self.require(SyncptOp::ReadWaitBase);
        let _busy = BusyGuard::new(self.power.as_ref());
        self.ops.read_wait_base(&self.cache, id);
        Ok(self.cache.read_wait_base(id))
    }

    /// Cached value, no hardware access
    pub fn read_min(&self, id: SyncptId) -> SyncptResult<u32> {
        self.check_syncpt(id)?;
        Ok(self.cache.read_min(id))
    }

    pub fn read_max(&self, id: SyncptId) -> SyncptResult<u32> {
        self.check_syncpt(id)?;
        Ok(self.cache.read_max(id))
    }

    /// Reserve `incrs` increments of upcoming hardware work
    ///
    /// Returns the threshold the syncpoint reaches once that work retires.
    pub fn incr_max(&self, id: SyncptId, incrs: u32) -> SyncptResult<u32> {
        self.check_syncpt(id)?;
        Ok(self.cache.incr_max(id, incrs))
    }

    pub fn set_max(&self, id: SyncptId, val: u32) -> SyncptResult<()> {
        self.check_syncpt(id)?;
        self.cache.set_max(id, val);
        Ok(())
    }

    pub fn client_managed(&self, id: SyncptId) -> SyncptResult<bool> {
        self.check_syncpt(id)?;
        Ok(self.cache.client_managed(id))
    }

    pub fn is_expired(&self, id: SyncptId, thresh: u32) -> SyncptResult<bool> {
        self.check_syncpt(id)?;
        Ok(self.cache.is_expired(id, thresh))
    }

    /// Increment from the CPU without touching the cache
    ///
    /// The caller is responsible for the device being powered.
    pub fn cpu_incr(&self, id: SyncptId) -> SyncptResult<()> {
        self.check_syncpt(id)?;
        self.require(SyncptOp::CpuIncr);
        self.ops.cpu_incr(&self.cache, id);
        Ok(())
    }

    /// Increment from the CPU, advancing max first
    pub fn incr(&self, id: SyncptId) -> SyncptResult<()> {
        self.check_syncpt(id)?;
        self.require(SyncptOp::CpuIncr);
        self.cache.incr_max(id, 1);
        let _busy = BusyGuard::new(self.power.as_ref());
        self.ops.cpu_incr(&self.cache, id);
        Ok(())
    }

    /// Dump hardware syncpoint state
    pub fn debug(&self) {
        self.ops.debug(&self.cache);
    }

    /// Device-wide debug dump
    pub fn debug_dump(&self) {
        info!("device debug dump requested");
        self.debug.dump();
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        self.cache.snapshot()
    }
}

fn check_range(kind: IdKind, id: u32, limit: u32) -> SyncptResult<()> {
    if id < limit {
        Ok(())
    } else {
        Err(SyncptError::InvalidId { kind, id, limit })
    }
}
