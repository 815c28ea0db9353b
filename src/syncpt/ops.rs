/*!
 * Hardware Operation Table
 *
 * Register-level capabilities one hardware generation supplies. The core
 * never branches on generation; it only calls through this trait. Every
 * operation receives the value cache so the implementation can refresh the
 * shadow from the register it just touched.
 */

use super::cache::SyncptCache;
use crate::core::errors::SyncptResult;
use crate::core::types::{MutexId, SyncptId, WaitBaseId};
use serde::{Deserialize, Serialize};

/// Operations an implementation may or may not provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncptOp {
    Reset,
    ResetWaitBase,
    UpdateMin,
    ReadWaitBase,
    CpuIncr,
    MutexTryLock,
    MutexUnlock,
    WaitCheck,
}

/// A previously recorded wait in a command buffer
///
/// `mem` and `offset` locate the host wait method inside the buffer so it
/// can be patched once the wait has expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitCheck {
    pub mem: u32,
    pub offset: u32,
    pub syncpt_id: SyncptId,
    pub thresh: u32,
}

/// Memory client able to rewrite words of command buffers
pub trait MemoryClient: Send + Sync {
    /// Overwrite the 32-bit word at byte `offset` of buffer `mem`
    fn patch_word(&self, mem: u32, offset: u32, word: u32) -> SyncptResult<()>;
}

/// Register access for one hardware generation
pub trait SyncptOps: Send + Sync {
    /// Does this generation implement `op`?
    ///
    /// Calling an unsupported operation is a configuration fault; the core
    /// checks this before every call.
    fn supports(&self, op: SyncptOp) -> bool {
        let _ = op;
        true
    }

    /// Write the cached `min` of `id` back into the hardware register
    fn reset(&self, cache: &SyncptCache, id: SyncptId);

    /// Write the cached wait base `id` back into hardware
    fn reset_wait_base(&self, cache: &SyncptCache, id: WaitBaseId);

    /// Read the live register, store it as the cached `min` and return it
    fn update_min(&self, cache: &SyncptCache, id: SyncptId) -> u32;

    /// Read wait base `id` into the cache
    fn read_wait_base(&self, cache: &SyncptCache, id: WaitBaseId);

    /// Increment the hardware counter from the CPU, leaving the cache alone
    fn cpu_incr(&self, cache: &SyncptCache, id: SyncptId);

    /// Human-readable name of syncpoint `id`, empty if unnamed
    fn name(&self, id: SyncptId) -> String;

    /// Dump generation-specific register state
    fn debug(&self, cache: &SyncptCache);

    /// Try to take hardware mutex `idx`
    ///
    /// Returns `true` if the hardware reports the mutex as already owned.
    fn mutex_try_lock(&self, idx: MutexId) -> bool;

    fn mutex_unlock(&self, idx: MutexId);

    /// Drop already-expired waits from command buffers before submission
    fn wait_check(
        &self,
        cache: &SyncptCache,
        client: &dyn MemoryClient,
        mask: u32,
        waits: &[WaitCheck],
    ) -> SyncptResult<()>;
}
