/*!
 * Synchronization Primitives
 *
 * Wait queue heads used by the threshold wait engine. A sleeper registers
 * a `WaitCondition` with the interrupt subsystem and blocks on it in bounded
 * slices; the interrupt action calls `wake_all` once the syncpoint crosses
 * the threshold.
 */

mod condition;

pub use condition::{WaitCondition, WaitEvent, WakeResult};
