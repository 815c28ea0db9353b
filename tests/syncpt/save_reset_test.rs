/*!
 * Save/Reset Tests
 * Cache resynchronization around power loss and configuration faults
 */

use crate::common::{device, fixture, mock_ops, CLIENT, TRACKED};
use pretty_assertions::assert_eq;
use syncpt_host::{SimHost, SyncptOp};

#[test]
fn test_save_reads_wait_bases() {
    let dev = device();
    assert!(dev.hw().set_wait_base_register(1, 9));

    dev.syncpt().save();
    assert_eq!(dev.cache().read_wait_base(1), 9);
    assert_eq!(dev.syncpt().read_wait_base(1).unwrap(), 9);
}

#[test]
fn test_save_refreshes_client_managed() {
    let mut ops = mock_ops();
    ops.expect_update_min()
        .withf(|_, id| *id == CLIENT)
        .times(1)
        .returning(|cache, id| cache.update_min(id, 42));
    ops.expect_read_wait_base().times(2).return_const(());
    let fx = fixture(ops);

    fx.syncpt.save();
    assert_eq!(fx.cache.read_min(CLIENT), 42);
}

#[test]
#[should_panic(expected = "at save")]
fn test_save_with_outstanding_work_is_fatal() {
    let dev = device();
    dev.submit(TRACKED, 1).unwrap();
    dev.syncpt().save();
}

#[test]
fn test_reset_writes_cache_into_registers() {
    let dev = device();
    dev.submit(TRACKED, 5).unwrap();
    dev.complete(TRACKED, 5).unwrap();
    dev.cache().set_wait_base(0, 3);

    dev.hw().power_off();
    assert_eq!(dev.hw().register(TRACKED).unwrap(), 0);

    dev.hw().power_on();
    dev.syncpt().reset();
    assert_eq!(dev.hw().register(TRACKED).unwrap(), 5);
    assert_eq!(dev.hw().wait_base_register(0), Some(3));
}

#[test]
#[should_panic(expected = "not provided by hardware layer")]
fn test_reset_without_wait_base_op_is_fatal() {
    let config = crate::common::config();
    let hw = SimHost::from_config(&config).without(SyncptOp::ResetWaitBase);
    // construction resets every register
    let _ = syncpt_host::HostDevice::from_hardware(config, hw);
}

#[test]
fn test_read_refreshes_cache() {
    let dev = device();
    dev.submit(TRACKED, 2).unwrap();
    dev.hw().hw_incr(TRACKED).unwrap();

    assert_eq!(dev.syncpt().read(TRACKED).unwrap(), 1);
    assert_eq!(dev.syncpt().read_min(TRACKED).unwrap(), 1);
    assert_eq!(dev.syncpt().read_max(TRACKED).unwrap(), 2);
    assert_eq!(dev.power().refcount(), 0);
}

#[test]
fn test_incr_advances_max_and_register() {
    let dev = device();
    dev.syncpt().incr(TRACKED).unwrap();

    assert_eq!(dev.syncpt().read_max(TRACKED).unwrap(), 1);
    assert_eq!(dev.hw().register(TRACKED).unwrap(), 1);
    // the interrupt line refreshed the cache
    assert_eq!(dev.syncpt().read_min(TRACKED).unwrap(), 1);
    assert_eq!(dev.power().refcount(), 0);
}

#[test]
fn test_cpu_incr_beyond_max_refused() {
    let dev = device();
    dev.syncpt().cpu_incr(TRACKED).unwrap();
    assert_eq!(dev.hw().register(TRACKED).unwrap(), 0);
}

#[test]
fn test_is_expired_window() {
    let dev = device();
    dev.submit(TRACKED, 10).unwrap();
    dev.complete(TRACKED, 4).unwrap();

    let syncpt = dev.syncpt();
    assert!(syncpt.is_expired(TRACKED, 3).unwrap());
    assert!(syncpt.is_expired(TRACKED, 4).unwrap());
    assert!(!syncpt.is_expired(TRACKED, 5).unwrap());
    assert!(!syncpt.is_expired(TRACKED, 10).unwrap());
    // beyond max can never be waited on
    assert!(syncpt.is_expired(TRACKED, 11).unwrap());
}

#[test]
fn test_snapshot_reports_every_syncpt() {
    let dev = device();
    dev.submit(TRACKED, 2).unwrap();

    let snapshot = dev.syncpt().snapshot();
    assert_eq!(snapshot.syncpts.len(), 8);
    assert_eq!(snapshot.wait_bases.len(), 2);
    assert_eq!(snapshot.syncpts[TRACKED as usize].max, 2);
    assert!(snapshot.syncpts[CLIENT as usize].client_managed);
}
