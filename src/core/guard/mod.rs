/*!
 * RAII Resource Guards
 *
 * Scoped ownership of device resources with automatic cleanup:
 *
 * - **BusyGuard**: holds the device power bracket open
 * - **HwMutexGuard** (in `syncpt`): holds a hardware mutex
 *
 * ## Example
 *
 * ```rust,ignore
 * {
 *     let _busy = BusyGuard::new(power.as_ref());
 *     // registers may be touched here
 * } // device marked idle
 * ```
 */

mod busy;

pub use busy::BusyGuard;

/// Result type for guard operations
pub type GuardResult<T> = Result<T, GuardError>;

/// Errors that can occur during guard operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("Resource already released")]
    AlreadyReleased,

    #[error("Release failed: {0}")]
    ReleaseFailed(String),
}

/// Core guard trait
pub trait Guard: Send {
    /// Resource type name for logging/debugging
    fn resource_type(&self) -> &'static str;

    /// Check if guard still owns its resource
    fn is_active(&self) -> bool;

    /// Release the resource before drop
    ///
    /// Returns `Err` if already released or if the underlying release
    /// failed; the guard is inactive afterwards either way
    fn release(&mut self) -> GuardResult<()>;
}
