/*!
 * Simulated Command Buffers
 * Word-addressed buffers the wait checker patches through `MemoryClient`
 */

use crate::core::errors::{SyncptError, SyncptResult};
use crate::syncpt::MemoryClient;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::debug;

/// In-memory command buffer store
pub struct SimMemory {
    buffers: DashMap<u32, Vec<u32>, RandomState>,
    next_handle: AtomicU32,
    patches: AtomicU64,
}

impl SimMemory {
    pub fn new() -> Self {
        Self {
            buffers: DashMap::with_hasher(RandomState::new()),
            next_handle: AtomicU32::new(1),
            patches: AtomicU64::new(0),
        }
    }

    /// Allocate a buffer holding `words`, returning its handle
    pub fn alloc(&self, words: Vec<u32>) -> u32 {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.buffers.insert(handle, words);
        handle
    }

    /// Word at byte `offset` of buffer `mem`
    pub fn word(&self, mem: u32, offset: u32) -> Option<u32> {
        if offset % 4 != 0 {
            return None;
        }
        self.buffers
            .get(&mem)
            .and_then(|buf| buf.get((offset / 4) as usize).copied())
    }

    /// Patches applied so far
    pub fn patch_count(&self) -> u64 {
        self.patches.load(Ordering::Relaxed)
    }
}

impl Default for SimMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClient for SimMemory {
    fn patch_word(&self, mem: u32, offset: u32, word: u32) -> SyncptResult<()> {
        if offset % 4 != 0 {
            return Err(SyncptError::Patch(
                format!("unaligned offset {:#x} in buffer {}", offset, mem).into(),
            ));
        }

        let mut buf = self
            .buffers
            .get_mut(&mem)
            .ok_or_else(|| SyncptError::Patch(format!("no buffer {}", mem).into()))?;
        let slot = buf.get_mut((offset / 4) as usize).ok_or_else(|| {
            SyncptError::Patch(format!("offset {:#x} beyond buffer {}", offset, mem).into())
        })?;

        *slot = word;
        self.patches.fetch_add(1, Ordering::Relaxed);
        debug!(mem, offset, word = %format!("{:#010x}", word), "patched wait");
        Ok(())
    }
}
