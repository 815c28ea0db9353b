/*!
 * Syncpoint Configuration
 *
 * Runtime configuration of id spaces and wait-engine policy. Defaults match
 * the reference host block; every field can be loaded from JSON or
 * overridden from the environment.
 */

use crate::core::errors::{SyncptError, SyncptResult};
use crate::core::limits;
use crate::core::types::SyncptId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment override for the check period, in milliseconds
pub const ENV_CHECK_PERIOD_MS: &str = "SYNCPT_CHECK_PERIOD_MS";
/// Environment override for the stuck escalation threshold
pub const ENV_MAX_STUCK_CHECKS: &str = "SYNCPT_MAX_STUCK_CHECKS";
/// Environment override for the clock tree diagnostic path
pub const ENV_CLOCK_TREE: &str = "SYNCPT_CLOCK_TREE";

/// Syncpoint subsystem configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncptConfig {
    /// Number of syncpoints (at most 32)
    pub nb_pts: u32,
    /// Number of wait bases
    pub nb_bases: u32,
    /// Number of hardware mutexes
    pub nb_mtxs: u32,
    /// Bit `i` set means syncpoint `i` is client managed
    pub client_managed: u32,
    /// Longest single sleep of a blocking wait
    #[serde(with = "duration_ms", rename = "check_period_ms")]
    pub check_period: Duration,
    /// Stuck reports tolerated before escalating to a fatal hang
    pub max_stuck_checks: u32,
    /// Diagnostic file scanned on the first stuck wait
    pub clock_tree_path: PathBuf,
    /// Capacity of the software interrupt controller
    pub max_waiters: usize,
}

impl Default for SyncptConfig {
    fn default() -> Self {
        Self {
            nb_pts: limits::NB_PTS,
            nb_bases: limits::NB_BASES,
            nb_mtxs: limits::NB_MTXS,
            client_managed: limits::CLIENT_MANAGED_MASK,
            check_period: limits::SYNCPT_CHECK_PERIOD,
            max_stuck_checks: limits::MAX_STUCK_CHECK_COUNT,
            clock_tree_path: PathBuf::from(limits::CLOCK_TREE_PATH),
            max_waiters: limits::MAX_INTR_WAITERS,
        }
    }
}

impl SyncptConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> SyncptResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SyncptError::InvalidConfig(e.to_string().into()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> SyncptResult<Self> {
        let mut config = Self::default();

        if let Some(ms) = env_parse::<u64>(ENV_CHECK_PERIOD_MS)? {
            config.check_period = Duration::from_millis(ms);
        }
        if let Some(n) = env_parse::<u32>(ENV_MAX_STUCK_CHECKS)? {
            config.max_stuck_checks = n;
        }
        if let Ok(path) = std::env::var(ENV_CLOCK_TREE) {
            config.clock_tree_path = PathBuf::from(path);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SyncptResult<()> {
        if self.nb_pts == 0 || self.nb_pts > limits::MAX_NB_PTS {
            return Err(SyncptError::InvalidConfig(
                format!("nb_pts must be in 1..={}, got {}", limits::MAX_NB_PTS, self.nb_pts).into(),
            ));
        }
        if self.check_period.is_zero() {
            return Err(SyncptError::InvalidConfig("check_period must be non-zero".into()));
        }
        if self.max_waiters == 0 {
            return Err(SyncptError::InvalidConfig("max_waiters must be non-zero".into()));
        }
        Ok(())
    }

    /// Is syncpoint `id` client managed?
    #[inline]
    pub fn is_client_managed(&self, id: SyncptId) -> bool {
        id < u32::BITS && self.client_managed & (1 << id) != 0
    }

    pub fn with_nb_pts(mut self, nb_pts: u32) -> Self {
        self.nb_pts = nb_pts;
        self
    }

    pub fn with_nb_bases(mut self, nb_bases: u32) -> Self {
        self.nb_bases = nb_bases;
        self
    }

    pub fn with_nb_mtxs(mut self, nb_mtxs: u32) -> Self {
        self.nb_mtxs = nb_mtxs;
        self
    }

    pub fn with_client_managed(mut self, mask: u32) -> Self {
        self.client_managed = mask;
        self
    }

    pub fn with_check_period(mut self, period: Duration) -> Self {
        self.check_period = period;
        self
    }

    pub fn with_max_stuck_checks(mut self, n: u32) -> Self {
        self.max_stuck_checks = n;
        self
    }

    pub fn with_clock_tree_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.clock_tree_path = path.into();
        self
    }

    pub fn with_max_waiters(mut self, n: usize) -> Self {
        self.max_waiters = n;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> SyncptResult<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SyncptError::InvalidConfig(format!("{}={} is not a number", key, raw).into())),
        Err(_) => Ok(None),
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
