/*!
 * Stuck-Wait Diagnostics
 *
 * Reporting for waits that outlive a check period. The first stuck report
 * in the life of the process additionally takes a full device dump and
 * scans the clock tree file; later reports only log and call the hardware
 * debug hook. Too many consecutive reports on one wait are treated as a
 * hardware hang and abort.
 */

use super::cache::SyncptCache;
use super::ops::SyncptOps;
use super::Syncpt;
use crate::core::limits::CLOCK_TREE_CHUNK;
use crate::core::types::{SyncptId, Timeout};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Set once the one-shot deep diagnostic has run in this process
static STUCK_DUMPED: AtomicBool = AtomicBool::new(false);

/// Claim the one-shot deep diagnostic; `true` only for the first caller
fn first_stuck_report() -> bool {
    !STUCK_DUMPED.swap(true, Ordering::AcqRel)
}

/// Device-wide debug dump collaborator
pub trait DebugDump: Send + Sync {
    fn dump(&self);
}

/// Dump of the syncpoint cache plus the hardware debug hook
pub struct CacheDump {
    cache: Arc<SyncptCache>,
    ops: Arc<dyn SyncptOps>,
}

impl CacheDump {
    pub fn new(cache: Arc<SyncptCache>, ops: Arc<dyn SyncptOps>) -> Self {
        Self { cache, ops }
    }
}

impl DebugDump for CacheDump {
    fn dump(&self) {
        info!(
            nb_pts = self.cache.nb_pts(),
            nb_bases = self.cache.nb_bases(),
            "syncpt debug dump"
        );
        self.ops.debug(&self.cache);
    }
}

/// Scan a diagnostic file and log its contents chunk by chunk
///
/// Best effort: an unreadable file is logged and skipped. Returns the
/// number of bytes logged, `None` if the file could not be opened.
pub fn dump_clock_tree(path: &Path) -> Option<usize> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to open clock tree");
            return None;
        }
    };

    info!(path = %path.display(), "reading clock tree");
    let mut buf = [0u8; CLOCK_TREE_CHUNK];
    let mut total = 0;
    loop {
        match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                total += n;
                info!(target: "syncpt::clock_tree", "{}", String::from_utf8_lossy(&buf[..n]));
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "clock tree read failed");
                break;
            }
        }
    }
    Some(total)
}

impl Syncpt {
    /// Report a wait that is still unsatisfied after a check period
    ///
    /// # Panics
    ///
    /// Once `check_count` exceeds the configured maximum, after a full
    /// device dump.
    pub(super) fn report_stuck(
        &self,
        id: SyncptId,
        thresh: u32,
        remaining: Timeout,
        check_count: u32,
        low_timeout: Option<Duration>,
    ) {
        let current = std::thread::current();
        let thread = current.name().unwrap_or("<unnamed>");
        let thread_id = current.id();
        let name = self.ops.name(id);

        warn!(
            thread,
            thread_id = ?thread_id,
            id,
            name = %name,
            thresh,
            timeout = ?remaining,
            "syncpoint stuck waiting"
        );
        self.ops.debug(&self.cache);
        self.stats.inc_stuck_report();

        if first_stuck_report() {
            self.debug.dump();
            dump_clock_tree(&self.config.clock_tree_path);
        }

        if check_count > self.config.max_stuck_checks {
            if let Some(low) = low_timeout {
                warn!(timeout_ms = low.as_millis() as u64, "is timeout too low?");
            }
            self.debug.dump();
            error!(
                thread,
                thread_id = ?thread_id,
                id,
                name = %name,
                thresh,
                min = self.cache.read_min(id),
                max = self.cache.read_max(id),
                checks = check_count,
                "syncpoint never advanced, giving up"
            );
            panic!(
                "syncpt {} ({}) stuck waiting for {} after {} checks",
                id, name, thresh, check_count
            );
        }
    }
}
