/*!
 * Host Device
 *
 * Wires one simulated host block together: value cache, register file,
 * software interrupt controller, module power bracket and the `Syncpt`
 * manager on top. Also owns the suspend/resume sequence that saves the
 * cache before the registers lose power and restores them afterwards.
 */

use crate::config::SyncptConfig;
use crate::core::errors::{SyncptError, SyncptResult};
use crate::core::guard::BusyGuard;
use crate::core::types::SyncptId;
use crate::hw::SimHost;
use crate::intr::SoftIntr;
use crate::power::ModulePower;
use crate::syncpt::{DebugDump, Syncpt, SyncptCache, SyncptOps};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Device-wide dump: power, interrupt and register state
struct HostDebug {
    cache: Arc<SyncptCache>,
    hw: Arc<SimHost>,
    intr: Arc<SoftIntr>,
    power: Arc<ModulePower>,
}

impl DebugDump for HostDebug {
    fn dump(&self) {
        let pending: usize = (0..self.cache.nb_pts())
            .map(|id| self.intr.pending_count(id))
            .sum();
        info!(
            powered = self.hw.is_powered(),
            power_refs = self.power.refcount(),
            pending_actions = pending,
            waiters = self.intr.waiters_in_use(),
            sleepers = self.intr.sleepers(),
            irqs = self.intr.irq_count(),
            "host device dump"
        );
        self.hw.debug(&self.cache);
    }
}

/// One host block with its syncpoint manager
pub struct HostDevice {
    cache: Arc<SyncptCache>,
    hw: Arc<SimHost>,
    intr: Arc<SoftIntr>,
    power: Arc<ModulePower>,
    syncpt: Syncpt,
}

impl HostDevice {
    /// Device with a fresh simulated register file
    pub fn new(config: SyncptConfig) -> SyncptResult<Self> {
        config.validate()?;
        let hw = SimHost::from_config(&config);
        Self::from_hardware(config, hw)
    }

    /// Device over a caller-prepared register file
    #[instrument(skip_all, fields(nb_pts = config.nb_pts, nb_mtxs = config.nb_mtxs))]
    pub fn from_hardware(config: SyncptConfig, hw: SimHost) -> SyncptResult<Self> {
        let cache = Arc::new(SyncptCache::from_config(&config));
        let intr = Arc::new(SoftIntr::new(cache.clone(), config.max_waiters));
        let hw = Arc::new(hw);
        hw.set_irq(intr.clone());
        let power = Arc::new(ModulePower::new("host1x"));

        let debug = Arc::new(HostDebug {
            cache: cache.clone(),
            hw: hw.clone(),
            intr: intr.clone(),
            power: power.clone(),
        });

        let syncpt = Syncpt::builder(
            config,
            cache.clone(),
            hw.clone() as Arc<dyn SyncptOps>,
            intr.clone(),
        )
        .with_power(power.clone())
        .with_debug(debug)
        .build()?;

        // registers start from the cached baseline
        syncpt.reset();
        info!("host device initialized");

        Ok(Self {
            cache,
            hw,
            intr,
            power,
            syncpt,
        })
    }

    pub fn syncpt(&self) -> &Syncpt {
        &self.syncpt
    }

    pub fn cache(&self) -> &Arc<SyncptCache> {
        &self.cache
    }

    pub fn hw(&self) -> &Arc<SimHost> {
        &self.hw
    }

    pub fn intr(&self) -> &Arc<SoftIntr> {
        &self.intr
    }

    pub fn power(&self) -> &Arc<ModulePower> {
        &self.power
    }

    /// Reserve `incrs` increments of work on `id`, returning the fence threshold
    pub fn submit(&self, id: SyncptId, incrs: u32) -> SyncptResult<u32> {
        self.syncpt.incr_max(id, incrs)
    }

    /// Retire `incrs` increments of submitted work, as the hardware would
    pub fn complete(&self, id: SyncptId, incrs: u32) -> SyncptResult<u32> {
        let _busy = BusyGuard::new(self.power.as_ref());
        let mut live = self.hw.register(id)?;
        for _ in 0..incrs {
            live = self.hw.hw_incr(id)?;
        }
        Ok(live)
    }

    /// Save syncpoint state and power the block off
    ///
    /// # Errors
    ///
    /// `DeviceBusy` while any power reference is held (a blocked wait, a
    /// held mutex or an in-flight register access).
    ///
    /// # Panics
    ///
    /// If a tracked syncpoint still has outstanding work.
    pub fn suspend(&self) -> SyncptResult<()> {
        if self.power.is_busy() {
            let refs = self.power.refcount();
            warn!(refs, "suspend refused, device busy");
            return Err(SyncptError::DeviceBusy(refs));
        }
        self.syncpt.save();
        self.hw.power_off();
        info!("host device suspended");
        Ok(())
    }

    /// Power the block on and restore the registers from the cache
    pub fn resume(&self) {
        self.hw.power_on();
        self.syncpt.reset();
        info!("host device resumed");
    }
}
