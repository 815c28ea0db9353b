/*!
 * Core Types
 * Identifiers and timeout types shared by every subsystem
 */

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Syncpoint (hardware counter) identifier, `[0, nb_pts)`
pub type SyncptId = u32;

/// Wait base identifier, `[0, nb_bases)`
pub type WaitBaseId = u32;

/// Hardware mutex identifier, `[0, nb_mtxs)`
pub type MutexId = u32;

/// Short string for names and error details
pub type InlineString = smartstring::alias::String;

/// How long a threshold wait may block
///
/// `Never` is the "no timeout" sentinel: the wait keeps sleeping in check
/// periods until the threshold is met, a signal arrives, or the stuck
/// escalation fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeout {
    Never,
    After(Duration),
}

impl Timeout {
    /// Do not block at all
    pub const ZERO: Self = Self::After(Duration::ZERO);

    #[inline]
    pub const fn from_millis(ms: u64) -> Self {
        Self::After(Duration::from_millis(ms))
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self, Self::After(d) if d.is_zero())
    }

    /// Remaining budget, `None` when waiting forever
    #[inline]
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::Never => None,
            Self::After(d) => Some(*d),
        }
    }
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Self::After(d)
    }
}

/// Kind of identifier, used in range errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdKind {
    Syncpt,
    WaitBase,
    Mutex,
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdKind::Syncpt => write!(f, "syncpt"),
            IdKind::WaitBase => write!(f, "wait base"),
            IdKind::Mutex => write!(f, "mutex"),
        }
    }
}

/// Signed 32-bit difference comparison: has `value` reached `thresh`?
///
/// Correct across wraparound as long as the two values are less than
/// 2^31 apart.
#[inline(always)]
pub fn syncpt_reached(value: u32, thresh: u32) -> bool {
    (value.wrapping_sub(thresh) as i32) >= 0
}
