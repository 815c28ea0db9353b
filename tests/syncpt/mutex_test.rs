/*!
 * Hardware Mutex Tests
 */

use crate::common::{device, fixture, mock_ops};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use syncpt_host::core::guard::{Guard, GuardError};
use syncpt_host::SyncptError;

#[test]
fn test_try_lock_and_unlock() {
    let dev = device();
    let syncpt = dev.syncpt();

    syncpt.mutex_try_lock(2).unwrap();
    assert_eq!(syncpt.lock_count(2).unwrap(), 1);
    assert!(dev.hw().mutex_locked(2));
    // device kept powered while the lock is held
    assert_eq!(dev.power().refcount(), 1);

    syncpt.mutex_unlock(2).unwrap();
    assert_eq!(syncpt.lock_count(2).unwrap(), 0);
    assert!(!dev.hw().mutex_locked(2));
    assert_eq!(dev.power().refcount(), 0);
}

#[test]
fn test_held_mutex_reports_busy() {
    let dev = device();
    let syncpt = dev.syncpt();

    syncpt.mutex_try_lock(1).unwrap();
    assert_eq!(syncpt.mutex_try_lock(1), Err(SyncptError::Busy(1)));
    assert_eq!(syncpt.lock_count(1).unwrap(), 1);
    assert_eq!(dev.power().refcount(), 1);

    syncpt.mutex_unlock(1).unwrap();
}

#[test]
fn test_unbalanced_release_detected() {
    let mut ops = mock_ops();
    ops.expect_mutex_unlock().never();
    let fx = fixture(ops);

    assert_eq!(fx.syncpt.mutex_unlock(3), Err(SyncptError::NotHeld(3)));
    assert_eq!(fx.power.refcount(), 0);
}

#[test]
fn test_busy_hardware_releases_bracket() {
    let mut ops = mock_ops();
    ops.expect_mutex_try_lock().times(1).return_const(true);
    let fx = fixture(ops);

    assert_eq!(fx.syncpt.mutex_try_lock(0), Err(SyncptError::Busy(0)));
    assert_eq!(fx.syncpt.lock_count(0).unwrap(), 0);
    assert_eq!(fx.power.refcount(), 0);
    assert_eq!(fx.power.power_ups(), 1);
}

#[test]
fn test_invalid_mutex_id() {
    let dev = device();
    assert!(matches!(
        dev.syncpt().mutex_try_lock(4),
        Err(SyncptError::InvalidId { id: 4, limit: 4, .. })
    ));
    assert_eq!(dev.power().refcount(), 0);
}

#[test]
fn test_guard_releases_on_drop() {
    let dev = device();
    {
        let guard = dev.syncpt().try_lock_guard(0).unwrap();
        assert_eq!(guard.idx(), 0);
        assert!(guard.is_active());
        assert_eq!(guard.resource_type(), "hw_mutex");
        assert!(dev.hw().mutex_locked(0));
    }
    assert!(!dev.hw().mutex_locked(0));
    assert_eq!(dev.syncpt().lock_count(0).unwrap(), 0);
    assert_eq!(dev.power().refcount(), 0);
}

#[test]
fn test_guard_explicit_release() {
    let dev = device();
    let mut guard = dev.syncpt().try_lock_guard(0).unwrap();
    assert!(guard.release().is_ok());
    assert_eq!(guard.release(), Err(GuardError::AlreadyReleased));
    drop(guard);
    assert_eq!(dev.power().refcount(), 0);
}

#[test]
fn test_contended_mutex_single_owner() {
    let dev = Arc::new(device());
    let acquired = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(std::sync::Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let dev = dev.clone();
            let acquired = acquired.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let guard = dev.syncpt().try_lock_guard(2);
                if guard.is_ok() {
                    acquired.fetch_add(1, Ordering::SeqCst);
                }
                // hold until everyone has tried
                barrier.wait();
                drop(guard);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(acquired.load(Ordering::SeqCst), 1);
    assert_eq!(dev.syncpt().lock_count(2).unwrap(), 0);
    assert_eq!(dev.power().refcount(), 0);
}

#[test]
fn test_guard_release_reports_lost_lock() {
    let dev = device();
    let mut guard = dev.syncpt().try_lock_guard(1).unwrap();

    // released behind the guard's back
    dev.syncpt().mutex_unlock(1).unwrap();

    assert!(matches!(guard.release(), Err(GuardError::ReleaseFailed(_))));
    assert!(!guard.is_active());
    assert_eq!(dev.power().refcount(), 0);
}

#[test]
fn test_racing_releases_keep_other_holders_powered() {
    let dev = Arc::new(device());
    dev.syncpt().mutex_try_lock(2).unwrap();

    for _ in 0..200 {
        dev.syncpt().mutex_try_lock(1).unwrap();
        let barrier = Arc::new(std::sync::Barrier::new(2));

        let releases: Vec<_> = (0..2)
            .map(|_| {
                let dev = dev.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    dev.syncpt().mutex_unlock(1)
                })
            })
            .collect();

        let ok = releases
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();

        assert_eq!(ok, 1);
        assert_eq!(dev.syncpt().lock_count(1).unwrap(), 0);
        // mutex 2 is still held
        assert_eq!(dev.power().refcount(), 1);
        assert!(dev.hw().mutex_locked(2));
    }

    dev.syncpt().mutex_unlock(2).unwrap();
    assert_eq!(dev.power().refcount(), 0);
}
