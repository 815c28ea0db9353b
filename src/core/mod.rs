/*!
 * Core Module
 * Fundamental types, limits, errors, guards and wait primitives
 */

pub mod errors;
pub mod guard;
pub mod limits;
pub mod sync;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use guard::{BusyGuard, Guard, GuardError, GuardResult};
pub use types::*;
