/*!
 * Wait-Check Tests
 */

use crate::common::{device, fixture, mock_ops, TRACKED};
use pretty_assertions::assert_eq;
use syncpt_host::hw::class_host_wait_syncpt;
use syncpt_host::{SimHost, SimMemory, SyncptError, SyncptOp, WaitCheck};

#[test]
fn test_expired_waits_patched_to_noop() {
    let dev = device();
    let memory = SimMemory::new();

    let first = dev.submit(TRACKED, 2).unwrap();
    let second = dev.submit(TRACKED, 2).unwrap();
    let words = vec![
        class_host_wait_syncpt(TRACKED, first),
        class_host_wait_syncpt(TRACKED, second),
    ];
    let mem = memory.alloc(words.clone());
    dev.complete(TRACKED, 2).unwrap();

    let waits = [
        WaitCheck { mem, offset: 0, syncpt_id: TRACKED, thresh: first },
        WaitCheck { mem, offset: 4, syncpt_id: TRACKED, thresh: second },
    ];
    dev.syncpt().wait_check(&memory, 1 << TRACKED, &waits).unwrap();

    assert_eq!(memory.word(mem, 0), Some(class_host_wait_syncpt(0, 0)));
    assert_eq!(memory.word(mem, 4), Some(words[1]));
    assert_eq!(memory.patch_count(), 1);
}

#[test]
fn test_patch_failure_propagates() {
    let dev = device();
    let memory = SimMemory::new();
    let waits = [WaitCheck { mem: 99, offset: 0, syncpt_id: TRACKED, thresh: 0 }];

    assert!(matches!(
        dev.syncpt().wait_check(&memory, 0, &waits),
        Err(SyncptError::Patch(_))
    ));
}

#[test]
fn test_delegates_to_hardware_layer() {
    let mut ops = mock_ops();
    ops.expect_wait_check()
        .withf(|_, _, mask, waits| *mask == 0b1000 && waits.len() == 1)
        .times(1)
        .returning(|_, _, _, _| Ok(()));
    let fx = fixture(ops);
    let memory = SimMemory::new();

    let waits = [WaitCheck { mem: 1, offset: 0, syncpt_id: TRACKED, thresh: 1 }];
    assert_eq!(fx.syncpt.wait_check(&memory, 0b1000, &waits), Ok(()));
}

#[test]
#[should_panic(expected = "not provided by hardware layer")]
fn test_missing_wait_check_is_fatal() {
    let config = crate::common::config();
    let hw = SimHost::from_config(&config).without(SyncptOp::WaitCheck);
    let dev = syncpt_host::HostDevice::from_hardware(config, hw).unwrap();
    let _ = dev.syncpt().wait_check(&SimMemory::new(), 0, &[]);
}
