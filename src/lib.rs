/*!
 * Syncpoint Host Library
 * Hardware syncpoint cache, threshold waits and module locks of a host block
 */

pub mod config;
pub mod core;
pub mod device;
pub mod hw;
pub mod intr;
pub mod monitoring;
pub mod power;
pub mod signals;
pub mod syncpt;

// Re-exports
pub use config::SyncptConfig;
pub use crate::core::errors::{SyncptError, SyncptResult};
pub use crate::core::types::{syncpt_reached, MutexId, SyncptId, Timeout, WaitBaseId};
pub use device::HostDevice;
pub use hw::{SimHost, SimMemory};
pub use intr::{IntrAction, Interrupts, IrqSink, SoftIntr, Waiter};
pub use monitoring::{init_tracing, WaitStatsSnapshot};
pub use power::{ModulePower, PowerBracket};
pub use signals::Signals;
pub use syncpt::{
    CacheSnapshot, DebugDump, HwMutexGuard, MemoryClient, Syncpt, SyncptBuilder, SyncptCache,
    SyncptOp, SyncptOps, WaitCheck,
};
