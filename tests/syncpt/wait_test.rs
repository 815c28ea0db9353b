/*!
 * Wait Engine Tests
 * Cache, probe and interrupt-driven paths of threshold waits
 */

use crate::common::{device, fixture, mock_ops, CLIENT, TRACKED};
use pretty_assertions::assert_eq;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use syncpt_host::{IrqSink, SimHost, SyncptError, SyncptOp, Timeout};

#[test]
fn test_cache_hit_touches_no_hardware() {
    let mut ops = mock_ops();
    ops.expect_update_min().never();
    ops.expect_debug().never();
    let fx = fixture(ops);

    fx.cache.incr_max(TRACKED, 10);
    fx.cache.update_min(TRACKED, 10);

    let value = fx
        .syncpt
        .wait_timeout(TRACKED, 10, Timeout::from_millis(100))
        .unwrap();
    assert_eq!(value, 10);

    // no power bracket either
    assert_eq!(fx.power.power_ups(), 0);
    assert_eq!(fx.syncpt.stats().cache_hits, 1);
}

#[test]
fn test_probe_path_satisfies_zero_timeout() {
    let mut ops = mock_ops();
    ops.expect_update_min()
        .times(1)
        .returning(|cache, id| cache.update_min(id, 10));
    let fx = fixture(ops);

    fx.cache.incr_max(TRACKED, 10);
    fx.cache.update_min(TRACKED, 5);

    let value = fx.syncpt.wait_timeout(TRACKED, 8, Timeout::ZERO).unwrap();
    assert_eq!(value, 10);
    assert_eq!(fx.cache.read_min(TRACKED), 10);

    let stats = fx.syncpt.stats();
    assert_eq!(stats.hw_hits, 1);
    assert_eq!(stats.blocked, 0);
    assert_eq!(fx.power.power_ups(), 1);
    assert_eq!(fx.power.refcount(), 0);
}

#[test]
fn test_interrupt_after_probe_miss() {
    let mut ops = mock_ops();
    ops.expect_update_min()
        .times(1)
        .returning(|cache, id| cache.update_min(id, 5));
    let fx = fixture(ops);

    fx.cache.incr_max(TRACKED, 10);
    fx.cache.update_min(TRACKED, 5);

    let irq = {
        let intr = fx.intr.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            intr.syncpt_irq(TRACKED, 10);
        })
    };

    let start = Instant::now();
    let value = fx
        .syncpt
        .wait_timeout(TRACKED, 10, Duration::from_millis(100))
        .unwrap();
    let elapsed = start.elapsed();
    irq.join().unwrap();

    assert_eq!(value, 10);
    assert!(elapsed >= Duration::from_millis(15));
    assert!(elapsed < Duration::from_millis(100));
    assert_eq!(fx.syncpt.stats().woken, 1);
    assert_eq!(fx.power.refcount(), 0);
}

#[test]
fn test_unreachable_threshold_rejected() {
    let mut ops = mock_ops();
    ops.expect_update_min().never();
    let fx = fixture(ops);

    fx.cache.incr_max(TRACKED, 10);

    assert_eq!(
        fx.syncpt.wait_timeout(TRACKED, 11, Timeout::Never),
        Err(SyncptError::InvalidThreshold {
            id: TRACKED,
            thresh: 11,
            max: 10
        })
    );
    assert_eq!(fx.dump.count(), 1);
    assert_eq!(fx.power.power_ups(), 0);
    assert_eq!(fx.syncpt.stats().invalid_thresholds, 1);
}

#[test]
fn test_client_managed_skips_max_check() {
    let mut ops = mock_ops();
    ops.expect_update_min()
        .returning(|cache, id| cache.update_min(id, 1000));
    let fx = fixture(ops);

    assert_eq!(fx.syncpt.wait_timeout(CLIENT, 1000, Timeout::ZERO), Ok(1000));
    assert_eq!(fx.dump.count(), 0);
}

#[test]
fn test_zero_timeout_would_block() {
    let dev = device();
    dev.submit(TRACKED, 2).unwrap();

    assert_eq!(
        dev.syncpt().wait_timeout(TRACKED, 1, Timeout::ZERO),
        Err(SyncptError::WouldBlock {
            id: TRACKED,
            thresh: 1
        })
    );
    assert_eq!(dev.power().refcount(), 0);
    assert_eq!(dev.intr().waiters_in_use(), 0);
}

#[test]
fn test_interrupt_wakes_blocked_wait() {
    let dev = Arc::new(device());
    let fence = dev.submit(TRACKED, 1).unwrap();

    let producer = {
        let dev = dev.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            dev.complete(TRACKED, 1).unwrap();
        })
    };

    let start = Instant::now();
    let value = dev
        .syncpt()
        .wait_timeout(TRACKED, fence, Duration::from_secs(1))
        .unwrap();
    producer.join().unwrap();

    assert_eq!(value, 1);
    assert!(start.elapsed() < Duration::from_millis(900));

    let stats = dev.syncpt().stats();
    assert_eq!(stats.blocked, 1);
    assert_eq!(stats.woken, 1);

    // registration and bracket released
    assert_eq!(dev.intr().sleepers(), 0);
    assert_eq!(dev.intr().pending_count(TRACKED), 0);
    assert_eq!(dev.intr().waiters_in_use(), 0);
    assert_eq!(dev.power().refcount(), 0);
}

#[test]
fn test_wait_times_out() {
    let dev = device();
    let fence = dev.submit(TRACKED, 1).unwrap();

    let start = Instant::now();
    assert_eq!(
        dev.syncpt()
            .wait_timeout(TRACKED, fence, Duration::from_millis(30)),
        Err(SyncptError::Timeout {
            id: TRACKED,
            thresh: fence
        })
    );
    assert!(start.elapsed() >= Duration::from_millis(30));
    assert_eq!(dev.intr().pending_count(TRACKED), 0);
    assert_eq!(dev.power().refcount(), 0);
    assert_eq!(dev.syncpt().stats().timeouts, 1);
}

#[test]
fn test_signal_interrupts_wait() {
    let dev = Arc::new(device());
    let fence = dev.submit(TRACKED, 1).unwrap();
    let (tx, rx) = mpsc::channel();

    let waiter = {
        let dev = dev.clone();
        thread::spawn(move || {
            tx.send(thread::current().id()).unwrap();
            dev.syncpt().wait_timeout(TRACKED, fence, Duration::from_secs(1))
        })
    };

    let tid = rx.recv().unwrap();
    let start = Instant::now();
    while dev.intr().sleepers() == 0 && start.elapsed() < Duration::from_millis(500) {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(dev.intr().sleepers(), 1);
    assert!(dev.syncpt().signals().deliver(tid));

    assert_eq!(waiter.join().unwrap(), Err(SyncptError::Interrupted));
    assert!(!dev.syncpt().signals().is_pending(tid));
    assert_eq!(dev.syncpt().stats().interrupted, 1);
    assert_eq!(dev.power().refcount(), 0);
}

#[test]
fn test_waiter_exhaustion_reports_no_memory() {
    let dev = syncpt_host::HostDevice::new(crate::common::config().with_max_waiters(1)).unwrap();
    let dev = Arc::new(dev);
    let fence = dev.submit(TRACKED, 1).unwrap();

    let blocker = {
        let dev = dev.clone();
        thread::spawn(move || {
            dev.syncpt()
                .wait_timeout(TRACKED, fence, Duration::from_millis(200))
        })
    };

    let start = Instant::now();
    while dev.intr().waiters_in_use() == 0 && start.elapsed() < Duration::from_secs(1) {
        thread::sleep(Duration::from_millis(1));
    }

    assert_eq!(
        dev.syncpt()
            .wait_timeout(TRACKED, fence, Duration::from_millis(50)),
        Err(SyncptError::NoMemory)
    );
    assert!(blocker.join().unwrap().is_err());
    assert_eq!(dev.power().refcount(), 0);
}

#[test]
fn test_concurrent_waiters_all_woken() {
    let dev = Arc::new(device());
    let fence = dev.submit(TRACKED, 3).unwrap();

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let dev = dev.clone();
            thread::spawn(move || dev.syncpt().wait_timeout(TRACKED, fence, Duration::from_secs(1)))
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    dev.complete(TRACKED, 3).unwrap();

    for waiter in waiters {
        assert_eq!(waiter.join().unwrap(), Ok(3));
    }
    assert_eq!(dev.intr().waiters_in_use(), 0);
}

#[test]
fn test_invalid_id_rejected() {
    let dev = device();
    assert!(matches!(
        dev.syncpt().wait_timeout(8, 0, Timeout::ZERO),
        Err(SyncptError::InvalidId { id: 8, limit: 8, .. })
    ));
}

#[test]
#[should_panic(expected = "not provided by hardware layer")]
fn test_wait_without_update_min_is_fatal() {
    let hw = SimHost::from_config(&crate::common::config()).without(SyncptOp::UpdateMin);
    let dev = syncpt_host::HostDevice::from_hardware(crate::common::config(), hw).unwrap();
    let _ = dev.syncpt().wait_timeout(TRACKED, 0, Timeout::ZERO);
}
