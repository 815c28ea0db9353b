/*!
 * Wait Checks
 * Thin delegation of expired-wait patching to the hardware layer
 */

use super::ops::{MemoryClient, SyncptOp, WaitCheck};
use super::Syncpt;
use crate::core::errors::SyncptResult;
use tracing::trace;

impl Syncpt {
    /// Patch out waits in `waits` that have already expired
    ///
    /// Only syncpoints selected by `mask` are refreshed from hardware before
    /// the check; the rest are judged on their cached values.
    pub fn wait_check(
        &self,
        client: &dyn MemoryClient,
        mask: u32,
        waits: &[WaitCheck],
    ) -> SyncptResult<()> {
        self.require(SyncptOp::WaitCheck);
        trace!(mask = %format!("{:#010x}", mask), count = waits.len(), "wait check");
        self.ops.wait_check(&self.cache, client, mask, waits)
    }
}
