/*!
 * Shared fixtures for syncpoint integration tests
 */

#![allow(dead_code)]

use mockall::mock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use syncpt_host::{
    DebugDump, HostDevice, MemoryClient, SoftIntr, Syncpt, SyncptCache, SyncptConfig, SyncptId,
    SyncptOp, SyncptOps, SyncptResult, WaitCheck,
};
use syncpt_host::{ModulePower, MutexId, WaitBaseId};

/// Client-managed syncpoint in the test configuration
pub const CLIENT: SyncptId = 6;

/// Tracked syncpoint used by most tests
pub const TRACKED: SyncptId = 3;

pub fn config() -> SyncptConfig {
    SyncptConfig::default()
        .with_nb_pts(8)
        .with_nb_bases(2)
        .with_nb_mtxs(4)
        .with_client_managed(1 << CLIENT)
}

pub fn device() -> HostDevice {
    HostDevice::new(config()).unwrap()
}

mock! {
    pub Ops {}

    impl SyncptOps for Ops {
        fn supports(&self, op: SyncptOp) -> bool;
        fn reset(&self, cache: &SyncptCache, id: SyncptId);
        fn reset_wait_base(&self, cache: &SyncptCache, id: WaitBaseId);
        fn update_min(&self, cache: &SyncptCache, id: SyncptId) -> u32;
        fn read_wait_base(&self, cache: &SyncptCache, id: WaitBaseId);
        fn cpu_incr(&self, cache: &SyncptCache, id: SyncptId);
        fn name(&self, id: SyncptId) -> String;
        fn debug(&self, cache: &SyncptCache);
        fn mutex_try_lock(&self, idx: MutexId) -> bool;
        fn mutex_unlock(&self, idx: MutexId);
        fn wait_check(
            &self,
            cache: &SyncptCache,
            client: &dyn MemoryClient,
            mask: u32,
            waits: &[WaitCheck],
        ) -> SyncptResult<()>;
    }
}

/// Mock that supports every operation
pub fn mock_ops() -> MockOps {
    let mut ops = MockOps::new();
    ops.expect_supports().return_const(true);
    ops.expect_name().returning(|id| format!("sp{}", id));
    ops
}

/// Debug dump that only counts invocations
#[derive(Default)]
pub struct CountingDump(AtomicUsize);

impl CountingDump {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl DebugDump for CountingDump {
    fn dump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Manager over `ops` with observable power and debug collaborators
pub struct Fixture {
    pub cache: Arc<SyncptCache>,
    pub intr: Arc<SoftIntr>,
    pub power: Arc<ModulePower>,
    pub dump: Arc<CountingDump>,
    pub syncpt: Syncpt,
}

pub fn fixture(ops: impl SyncptOps + 'static) -> Fixture {
    let config = config();
    let cache = Arc::new(SyncptCache::from_config(&config));
    let intr = Arc::new(SoftIntr::new(cache.clone(), config.max_waiters));
    let power = Arc::new(ModulePower::new("test"));
    let dump = Arc::new(CountingDump::default());

    let syncpt = Syncpt::builder(config, cache.clone(), Arc::new(ops), intr.clone())
        .with_power(power.clone())
        .with_debug(dump.clone())
        .build()
        .unwrap();

    Fixture {
        cache,
        intr,
        power,
        dump,
        syncpt,
    }
}
