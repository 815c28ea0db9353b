/*!
 * Signal Delivery
 * Per-thread pending flags that break interruptible sleeps
 */

use crate::core::sync::WaitCondition;
use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use tracing::debug;

/// Signal state of one thread
#[derive(Default)]
struct SignalSlot {
    pending: AtomicBool,
    sleeping_on: Mutex<Option<Arc<WaitCondition>>>,
}

/// Thread-directed signal delivery
///
/// A signal sets the target thread's pending flag and wakes the condition it
/// is sleeping on, if any. The flag stays set until the interrupted wait
/// consumes it, so a signal delivered just before the thread goes to sleep
/// is still observed.
pub struct Signals {
    threads: DashMap<ThreadId, Arc<SignalSlot>, RandomState>,
}

impl Signals {
    pub fn new() -> Self {
        Self {
            threads: DashMap::with_hasher(RandomState::new()),
        }
    }

    fn slot(&self, thread: ThreadId) -> Arc<SignalSlot> {
        self.threads
            .entry(thread)
            .or_insert_with(Default::default)
            .clone()
    }

    /// Deliver a signal to `thread`
    ///
    /// Returns `true` if the thread was asleep and got woken.
    pub fn deliver(&self, thread: ThreadId) -> bool {
        // flag set under the entry lock so a concurrent prune keeps the slot
        let slot = {
            let entry = self.threads.entry(thread).or_insert_with(Default::default);
            entry.pending.store(true, Ordering::SeqCst);
            entry.clone()
        };

        let sleeping_on = slot.sleeping_on.lock().clone();
        match sleeping_on {
            Some(wq) => {
                debug!(thread = ?thread, "signal woke interruptible sleeper");
                wq.wake_all();
                true
            }
            None => false,
        }
    }

    /// Is a signal pending for `thread`?
    pub fn is_pending(&self, thread: ThreadId) -> bool {
        self.threads
            .get(&thread)
            .map(|s| s.pending.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Consume the pending signal of `thread`, returning whether there was one
    pub fn take_pending(&self, thread: ThreadId) -> bool {
        self.threads
            .get(&thread)
            .map(|s| s.pending.swap(false, Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Threads with live signal state
    pub(crate) fn tracked_threads(&self) -> usize {
        self.threads.len()
    }

    /// Forget `thread` unless it is asleep or has a signal pending
    fn prune(&self, thread: ThreadId) {
        self.threads.remove_if(&thread, |_, slot| {
            !slot.pending.load(Ordering::SeqCst) && slot.sleeping_on.lock().is_none()
        });
    }

    /// Mark the current thread as sleeping on `wq` until the returned guard drops
    pub fn sleep_on(&self, wq: &Arc<WaitCondition>) -> InterruptibleSleep<'_> {
        let thread = thread::current().id();
        let slot = self.slot(thread);
        *slot.sleeping_on.lock() = Some(wq.clone());
        InterruptibleSleep {
            signals: self,
            thread,
            slot,
        }
    }
}

impl Default for Signals {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration of the current thread as an interruptible sleeper
pub struct InterruptibleSleep<'a> {
    signals: &'a Signals,
    thread: ThreadId,
    slot: Arc<SignalSlot>,
}

impl InterruptibleSleep<'_> {
    #[inline]
    pub fn signal_pending(&self) -> bool {
        self.slot.pending.load(Ordering::SeqCst)
    }

    /// Consume the pending signal that interrupted this sleep
    pub fn consume_signal(&self) -> bool {
        self.signals.take_pending(self.thread)
    }
}

impl Drop for InterruptibleSleep<'_> {
    fn drop(&mut self) {
        self.slot.sleeping_on.lock().take();
        self.signals.prune(self.thread);
    }
}
