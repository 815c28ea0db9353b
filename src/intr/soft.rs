/*!
 * Software Interrupt Controller
 *
 * Per-syncpoint lists of pending threshold actions. The hardware raises
 * `syncpt_irq` with the live register value; the controller refreshes the
 * cache and runs every action whose threshold is now met. Actions run after
 * the list lock is dropped.
 */

use super::{IntrAction, IntrRef, Interrupts, IrqSink, Waiter};
use crate::core::errors::{SyncptError, SyncptResult};
use crate::core::sync::WaitCondition;
use crate::core::types::{syncpt_reached, SyncptId};
use crate::syncpt::SyncptCache;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

struct PendingAction {
    key: u64,
    thresh: u32,
    action: IntrAction,
    wq: Arc<WaitCondition>,
    _waiter: Waiter,
}

impl PendingAction {
    fn run(self, id: SyncptId) {
        match self.action {
            IntrAction::Wakeup | IntrAction::WakeupInterruptible => {
                let woken = self.wq.wake_all();
                if woken.is_woken() {
                    trace!(id, thresh = self.thresh, woken = woken.count(), "threshold action ran");
                } else {
                    trace!(id, thresh = self.thresh, "threshold action ran with no sleepers");
                }
            }
        }
    }
}

/// Interrupt subsystem backed by software action lists
pub struct SoftIntr {
    cache: Arc<SyncptCache>,
    pending: Box<[Mutex<Vec<PendingAction>>]>,
    next_key: AtomicU64,
    waiters: Arc<AtomicUsize>,
    max_waiters: usize,
    irqs: AtomicU64,
}

impl SoftIntr {
    pub fn new(cache: Arc<SyncptCache>, max_waiters: usize) -> Self {
        let pending = (0..cache.nb_pts()).map(|_| Mutex::new(Vec::new())).collect();
        Self {
            cache,
            pending,
            next_key: AtomicU64::new(1),
            waiters: Arc::new(AtomicUsize::new(0)),
            max_waiters,
            irqs: AtomicU64::new(0),
        }
    }

    /// Actions still registered on `id`
    pub fn pending_count(&self, id: SyncptId) -> usize {
        self.pending
            .get(id as usize)
            .map(|list| list.lock().len())
            .unwrap_or(0)
    }

    /// Waiters currently allocated
    pub fn waiters_in_use(&self) -> usize {
        self.waiters.load(Ordering::Acquire)
    }

    /// Interrupts handled so far
    pub fn irq_count(&self) -> u64 {
        self.irqs.load(Ordering::Relaxed)
    }

    /// Run every action on `id` whose threshold the cache has reached
    fn fire(&self, id: SyncptId) -> usize {
        let Some(list) = self.pending.get(id as usize) else {
            return 0;
        };
        let value = self.cache.read_min(id);

        let ready: Vec<PendingAction> = {
            let mut list = list.lock();
            let mut ready = Vec::new();
            let mut i = 0;
            while i < list.len() {
                if syncpt_reached(value, list[i].thresh) {
                    ready.push(list.swap_remove(i));
                } else {
                    i += 1;
                }
            }
            ready
        };

        let fired = ready.len();
        for action in ready {
            action.run(id);
        }
        fired
    }
}

impl SoftIntr {
    /// Threads currently asleep on a pending action's wait queue
    pub fn sleepers(&self) -> usize {
        self.pending
            .iter()
            .map(|list| list.lock().iter().map(|a| a.wq.sleeper_count()).sum::<usize>())
            .sum()
    }
}

impl Interrupts for SoftIntr {
    fn alloc_waiter(&self) -> Option<Waiter> {
        self.waiters
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_waiters).then_some(n + 1)
            })
            .ok()
            .map(|_| Waiter::pooled(self.waiters.clone()))
    }

    fn add_action(
        &self,
        id: SyncptId,
        thresh: u32,
        action: IntrAction,
        wq: Arc<WaitCondition>,
        waiter: Waiter,
    ) -> SyncptResult<IntrRef> {
        let list = self.pending.get(id as usize).ok_or_else(|| {
            SyncptError::Interrupt(format!("no interrupt line for syncpt {}", id).into())
        })?;

        let key = self.next_key.fetch_add(1, Ordering::Relaxed);
        list.lock().push(PendingAction {
            key,
            thresh,
            action,
            wq,
            _waiter: waiter,
        });

        // The threshold may have been crossed before the action was queued
        if self.cache.min_cmp(id, thresh) {
            self.fire(id);
        }

        Ok(IntrRef { id, key })
    }

    fn put_ref(&self, handle: IntrRef) {
        if let Some(list) = self.pending.get(handle.id as usize) {
            list.lock().retain(|a| a.key != handle.key);
        }
    }
}

impl IrqSink for SoftIntr {
    fn syncpt_irq(&self, id: SyncptId, live: u32) {
        if id >= self.cache.nb_pts() {
            return;
        }
        self.irqs.fetch_add(1, Ordering::Relaxed);
        self.cache.update_min(id, live);
        self.fire(id);
    }
}
