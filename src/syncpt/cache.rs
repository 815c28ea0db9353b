/*!
 * Syncpoint Value Cache
 *
 * Software shadow of every syncpoint (`min`, `max`) and wait base. `min` is
 * the last value read from hardware (or restored into it); `max` is the value
 * the syncpoint will reach once all submitted work retires. Comparisons
 * against the shadow never touch hardware and are safe from any context.
 *
 * All slots are per-id atomics in fixed arenas sized at construction.
 * Accessors index directly and panic on out-of-range ids; the `Syncpt`
 * facade validates ids before reaching this layer.
 */

use crate::config::SyncptConfig;
use crate::core::types::{syncpt_reached, SyncptId, WaitBaseId};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{error, warn};

/// Cached state of one syncpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncptState {
    pub id: SyncptId,
    pub min: u32,
    pub max: u32,
    pub client_managed: bool,
}

/// Point-in-time copy of the whole cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub syncpts: Vec<SyncptState>,
    pub wait_bases: Vec<u32>,
}

fn atomic_arena(len: u32) -> Box<[AtomicU32]> {
    (0..len).map(|_| AtomicU32::new(0)).collect()
}

/// Shadow values of all syncpoints and wait bases
pub struct SyncptCache {
    min_val: Box<[AtomicU32]>,
    max_val: Box<[AtomicU32]>,
    base_val: Box<[AtomicU32]>,
    client_managed: u32,
}

impl SyncptCache {
    pub fn new(nb_pts: u32, nb_bases: u32, client_managed: u32) -> Self {
        Self {
            min_val: atomic_arena(nb_pts),
            max_val: atomic_arena(nb_pts),
            base_val: atomic_arena(nb_bases),
            client_managed,
        }
    }

    pub fn from_config(config: &SyncptConfig) -> Self {
        Self::new(config.nb_pts, config.nb_bases, config.client_managed)
    }

    #[inline]
    pub fn nb_pts(&self) -> u32 {
        self.min_val.len() as u32
    }

    #[inline]
    pub fn nb_bases(&self) -> u32 {
        self.base_val.len() as u32
    }

    /// Client-managed syncpoints have no `max` tracking by this cache
    #[inline]
    pub fn client_managed(&self, id: SyncptId) -> bool {
        id < u32::BITS && self.client_managed & (1 << id) != 0
    }

    #[inline]
    pub fn read_min(&self, id: SyncptId) -> u32 {
        self.min_val[id as usize].load(Ordering::Acquire)
    }

    #[inline]
    pub fn read_max(&self, id: SyncptId) -> u32 {
        self.max_val[id as usize].load(Ordering::Acquire)
    }

    #[inline]
    pub fn read_wait_base(&self, id: WaitBaseId) -> u32 {
        self.base_val[id as usize].load(Ordering::Acquire)
    }

    /// Has the cached value already reached `thresh`?
    #[inline]
    pub fn min_cmp(&self, id: SyncptId, thresh: u32) -> bool {
        syncpt_reached(self.read_min(id), thresh)
    }

    /// Can `real` ever be reached with the work submitted so far?
    ///
    /// Always true for client-managed syncpoints.
    #[inline]
    pub fn check_max(&self, id: SyncptId, real: u32) -> bool {
        if self.client_managed(id) {
            return true;
        }
        syncpt_reached(self.read_max(id), real)
    }

    /// No submitted work is outstanding
    #[inline]
    pub fn min_eq_max(&self, id: SyncptId) -> bool {
        self.read_min(id) == self.read_max(id)
    }

    /// Has `thresh` expired, i.e. can a wait on it be dropped?
    ///
    /// For tracked syncpoints a threshold is pending only while it lies in
    /// the window `(min, max]`; everything else, including thresholds beyond
    /// max, counts as expired.
    pub fn is_expired(&self, id: SyncptId, thresh: u32) -> bool {
        let current = self.read_min(id);
        if self.client_managed(id) {
            return syncpt_reached(current, thresh);
        }
        let future = self.read_max(id);
        future.wrapping_sub(thresh) >= future.wrapping_sub(current)
    }

    /// Advance `max` by `incrs`, returning the new max
    #[inline]
    pub fn incr_max(&self, id: SyncptId, incrs: u32) -> u32 {
        self.max_val[id as usize]
            .fetch_add(incrs, Ordering::AcqRel)
            .wrapping_add(incrs)
    }

    /// Force `max`, used when a client hands over its own bookkeeping
    #[inline]
    pub fn set_max(&self, id: SyncptId, val: u32) {
        self.max_val[id as usize].store(val, Ordering::Release);
    }

    /// Record a live hardware value as the new `min`
    ///
    /// `min` only moves forward: a live value behind the cache is reported
    /// as a regression and the cached value is kept. Returns the resulting
    /// `min`.
    pub fn update_min(&self, id: SyncptId, live: u32) -> u32 {
        let slot = &self.min_val[id as usize];
        match slot.fetch_update(Ordering::AcqRel, Ordering::Acquire, |old| {
            syncpt_reached(live, old).then_some(live)
        }) {
            Ok(_) => {
                if !self.check_max(id, live) {
                    error!(
                        id,
                        min = live,
                        max = self.read_max(id),
                        "syncpt value beyond tracked max"
                    );
                }
                live
            }
            Err(old) => {
                warn!(id, cached = old, live, "syncpt value went backwards");
                old
            }
        }
    }

    /// Record a wait base register value
    #[inline]
    pub fn set_wait_base(&self, id: WaitBaseId, val: u32) {
        self.base_val[id as usize].store(val, Ordering::Release);
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            syncpts: (0..self.nb_pts())
                .map(|id| SyncptState {
                    id,
                    min: self.read_min(id),
                    max: self.read_max(id),
                    client_managed: self.client_managed(id),
                })
                .collect(),
            wait_bases: (0..self.nb_bases()).map(|id| self.read_wait_base(id)).collect(),
        }
    }
}
