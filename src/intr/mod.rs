/*!
 * Interrupt Subsystem
 *
 * Threshold interrupts: a client registers an action for "syncpoint `id`
 * reached `thresh`" and the subsystem runs it once the hardware reports the
 * crossing. The wait engine only uses the wakeup actions.
 */

mod soft;

pub use soft::SoftIntr;

use crate::core::errors::SyncptResult;
use crate::core::sync::WaitCondition;
use crate::core::types::SyncptId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What to do once a threshold is crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrAction {
    /// Wake an uninterruptible sleeper
    Wakeup,
    /// Wake a sleeper that may also be woken by signals
    WakeupInterruptible,
}

/// Preallocated bookkeeping for one pending action
///
/// Waiters allocated from a bounded pool give their slot back on drop.
pub struct Waiter {
    pool: Option<Arc<AtomicUsize>>,
}

impl Waiter {
    /// A waiter not accounted against any pool
    pub fn new() -> Self {
        Self { pool: None }
    }

    pub(crate) fn pooled(pool: Arc<AtomicUsize>) -> Self {
        Self { pool: Some(pool) }
    }
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

/// Reference to a registered action, returned to `put_ref`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntrRef {
    pub id: SyncptId,
    pub key: u64,
}

/// Interrupt subsystem collaborator
pub trait Interrupts: Send + Sync {
    /// Allocate waiter bookkeeping, `None` when exhausted
    fn alloc_waiter(&self) -> Option<Waiter>;

    /// Run `action` on `wq` once syncpoint `id` reaches `thresh`
    fn add_action(
        &self,
        id: SyncptId,
        thresh: u32,
        action: IntrAction,
        wq: Arc<WaitCondition>,
        waiter: Waiter,
    ) -> SyncptResult<IntrRef>;

    /// Drop a registration, whether or not its action already ran
    fn put_ref(&self, handle: IntrRef);
}

/// Interrupt line raised by hardware when a syncpoint advances
pub trait IrqSink: Send + Sync {
    fn syncpt_irq(&self, id: SyncptId, live: u32);
}

/// Registration released on drop
pub(crate) struct ActionRef<'a> {
    intr: &'a dyn Interrupts,
    handle: IntrRef,
}

impl<'a> ActionRef<'a> {
    pub(crate) fn new(intr: &'a dyn Interrupts, handle: IntrRef) -> Self {
        Self { intr, handle }
    }
}

impl Drop for ActionRef<'_> {
    fn drop(&mut self) {
        self.intr.put_ref(self.handle);
    }
}
