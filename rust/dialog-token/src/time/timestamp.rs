//! Unix-seconds timestamps.

use serde::{Deserialize, Serialize};
use std::fmt;
use web_time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, as carried by `exp` and `nbf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp from Unix seconds.
    #[must_use]
    pub const fn from_unix(seconds: u64) -> Self {
        Self(seconds)
    }

    /// Reads the wall clock.
    ///
    /// Validation never calls this implicitly; callers pass the result in
    /// through [`TimeContext`](super::TimeContext).
    #[must_use]
    pub fn now() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        Self(seconds)
    }

    /// Unix seconds.
    #[must_use]
    pub const fn to_unix(self) -> u64 {
        self.0
    }

    /// Shifts forward, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_add(self, seconds: u64) -> Self {
        Self(self.0.saturating_add(seconds))
    }

    /// Shifts backward, saturating at the epoch.
    #[must_use]
    pub const fn saturating_sub(self, seconds: u64) -> Self {
        Self(self.0.saturating_sub(seconds))
    }
}

impl From<u64> for Timestamp {
    fn from(seconds: u64) -> Self {
        Self(seconds)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
