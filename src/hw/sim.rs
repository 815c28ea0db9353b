/*!
 * Simulated Host Block
 *
 * In-memory syncpoint, wait base and module lock registers implementing the
 * operation table. Producers advance syncpoints with `hw_incr`/`hw_set`,
 * which raise the interrupt line towards the attached `IrqSink`.
 *
 * Powering the block off clears every register, as real hardware loses
 * its state; the device restores it from the cache on resume.
 */

use super::{class_host_wait_syncpt, syncpt_name};
use crate::config::SyncptConfig;
use crate::core::errors::{SyncptError, SyncptResult};
use crate::core::limits::SYNCPT_GRAPHICS_HOST;
use crate::core::types::{IdKind, MutexId, SyncptId, WaitBaseId};
use crate::intr::IrqSink;
use crate::syncpt::{MemoryClient, SyncptCache, SyncptOp, SyncptOps, WaitCheck};
use ahash::AHashSet;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Simulated host register file
pub struct SimHost {
    syncpts: Box<[AtomicU32]>,
    bases: Box<[AtomicU32]>,
    mutexes: Box<[AtomicBool]>,
    irq: RwLock<Option<Arc<dyn IrqSink>>>,
    powered: AtomicBool,
    unsupported: AHashSet<SyncptOp>,
    register_reads: AtomicU64,
}

impl SimHost {
    pub fn new(nb_pts: u32, nb_bases: u32, nb_mtxs: u32) -> Self {
        Self {
            syncpts: (0..nb_pts).map(|_| AtomicU32::new(0)).collect(),
            bases: (0..nb_bases).map(|_| AtomicU32::new(0)).collect(),
            mutexes: (0..nb_mtxs).map(|_| AtomicBool::new(false)).collect(),
            irq: RwLock::new(None),
            powered: AtomicBool::new(true),
            unsupported: AHashSet::new(),
            register_reads: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &SyncptConfig) -> Self {
        Self::new(config.nb_pts, config.nb_bases, config.nb_mtxs)
    }

    /// Drop `op` from the operation table (builder style)
    pub fn without(mut self, op: SyncptOp) -> Self {
        self.unsupported.insert(op);
        self
    }

    /// Attach the interrupt line
    pub fn set_irq(&self, sink: Arc<dyn IrqSink>) {
        *self.irq.write() = Some(sink);
    }

    fn raise(&self, id: SyncptId, live: u32) {
        let sink = self.irq.read().clone();
        if let Some(sink) = sink {
            sink.syncpt_irq(id, live);
        }
    }

    fn slot(&self, id: SyncptId) -> SyncptResult<&AtomicU32> {
        self.syncpts.get(id as usize).ok_or(SyncptError::InvalidId {
            kind: IdKind::Syncpt,
            id,
            limit: self.syncpts.len() as u32,
        })
    }

    /// Hardware-side increment, as a command stream retiring work would
    pub fn hw_incr(&self, id: SyncptId) -> SyncptResult<u32> {
        let live = self.slot(id)?.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        self.raise(id, live);
        Ok(live)
    }

    /// Hardware-side store of an arbitrary value
    pub fn hw_set(&self, id: SyncptId, value: u32) -> SyncptResult<()> {
        self.slot(id)?.store(value, Ordering::Release);
        self.raise(id, value);
        Ok(())
    }

    /// Live syncpoint register, bypassing the cache
    pub fn register(&self, id: SyncptId) -> SyncptResult<u32> {
        Ok(self.slot(id)?.load(Ordering::Acquire))
    }

    pub fn wait_base_register(&self, id: WaitBaseId) -> Option<u32> {
        self.bases.get(id as usize).map(|b| b.load(Ordering::Acquire))
    }

    pub fn set_wait_base_register(&self, id: WaitBaseId, value: u32) -> bool {
        match self.bases.get(id as usize) {
            Some(b) => {
                b.store(value, Ordering::Release);
                true
            }
            None => false,
        }
    }

    pub fn mutex_locked(&self, idx: MutexId) -> bool {
        self.mutexes
            .get(idx as usize)
            .map(|m| m.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Register reads performed through the operation table
    pub fn register_reads(&self) -> u64 {
        self.register_reads.load(Ordering::Relaxed)
    }

    pub fn is_powered(&self) -> bool {
        self.powered.load(Ordering::Acquire)
    }

    /// Cut power, losing every register
    pub fn power_off(&self) {
        self.powered.store(false, Ordering::Release);
        for reg in self.syncpts.iter().chain(self.bases.iter()) {
            reg.store(0, Ordering::Release);
        }
        for m in self.mutexes.iter() {
            m.store(false, Ordering::Release);
        }
        info!("host block powered off");
    }

    pub fn power_on(&self) {
        self.powered.store(true, Ordering::Release);
        info!("host block powered on");
    }

    fn read_syncpt(&self, id: SyncptId) -> u32 {
        if !self.is_powered() {
            warn!(id, "syncpt read while host block is off");
        }
        self.register_reads.fetch_add(1, Ordering::Relaxed);
        self.syncpts[id as usize].load(Ordering::Acquire)
    }
}

impl SyncptOps for SimHost {
    fn supports(&self, op: SyncptOp) -> bool {
        !self.unsupported.contains(&op)
    }

    fn reset(&self, cache: &SyncptCache, id: SyncptId) {
        self.syncpts[id as usize].store(cache.read_min(id), Ordering::Release);
    }

    fn reset_wait_base(&self, cache: &SyncptCache, id: WaitBaseId) {
        self.bases[id as usize].store(cache.read_wait_base(id), Ordering::Release);
    }

    fn update_min(&self, cache: &SyncptCache, id: SyncptId) -> u32 {
        let live = self.read_syncpt(id);
        cache.update_min(id, live)
    }

    fn read_wait_base(&self, cache: &SyncptCache, id: WaitBaseId) {
        cache.set_wait_base(id, self.bases[id as usize].load(Ordering::Acquire));
    }

    fn cpu_incr(&self, cache: &SyncptCache, id: SyncptId) {
        if !cache.client_managed(id) && cache.min_eq_max(id) {
            error!(
                id,
                name = syncpt_name(id),
                value = cache.read_min(id),
                "trying to increment syncpoint beyond max"
            );
            self.debug(cache);
            return;
        }
        let live = self.syncpts[id as usize]
            .fetch_add(1, Ordering::AcqRel)
            .wrapping_add(1);
        self.raise(id, live);
    }

    fn name(&self, id: SyncptId) -> String {
        syncpt_name(id).to_string()
    }

    fn debug(&self, cache: &SyncptCache) {
        for id in 0..cache.nb_pts() {
            let (min, max) = (cache.read_min(id), cache.read_max(id));
            if min == 0 && max == 0 {
                continue;
            }
            let live = self.syncpts[id as usize].load(Ordering::Acquire);
            info!(id, name = syncpt_name(id), min, max, live, "syncpt");
        }
        for id in 0..cache.nb_bases() {
            let base = self.bases[id as usize].load(Ordering::Acquire);
            if base != 0 {
                info!(id, base, "wait base");
            }
        }
    }

    fn mutex_try_lock(&self, idx: MutexId) -> bool {
        self.mutexes[idx as usize].swap(true, Ordering::AcqRel)
    }

    fn mutex_unlock(&self, idx: MutexId) {
        self.mutexes[idx as usize].store(false, Ordering::Release);
    }

    fn wait_check(
        &self,
        cache: &SyncptCache,
        client: &dyn MemoryClient,
        mask: u32,
        waits: &[WaitCheck],
    ) -> SyncptResult<()> {
        // refresh only the syncpoints the caller asked about
        for id in (0..cache.nb_pts()).filter(|id| mask & (1 << id) != 0) {
            self.update_min(cache, id);
        }

        for wait in waits {
            if wait.syncpt_id >= cache.nb_pts() {
                return Err(SyncptError::InvalidId {
                    kind: IdKind::Syncpt,
                    id: wait.syncpt_id,
                    limit: cache.nb_pts(),
                });
            }
            if cache.is_expired(wait.syncpt_id, wait.thresh) {
                debug!(
                    id = wait.syncpt_id,
                    thresh = wait.thresh,
                    min = cache.read_min(wait.syncpt_id),
                    "drop expired wait"
                );
                let noop = class_host_wait_syncpt(SYNCPT_GRAPHICS_HOST, 0);
                client.patch_word(wait.mem, wait.offset, noop)?;
            }
        }
        Ok(())
    }
}
