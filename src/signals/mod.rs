/*!
 * Signals Module
 * Thread-directed signals that cancel blocking syncpoint waits
 */

mod delivery;

pub use delivery::{InterruptibleSleep, Signals};
