//! Time-window checks.
//!
//! The clock is always supplied by the caller as a [`TimeContext`]; nothing
//! here reads the wall clock on its own.

mod timestamp;

pub use timestamp::*;

use crate::Payload;

/// The verifier's notion of "now", plus slack for clock skew.
///
/// Drift tolerance only ever widens the validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeContext {
    /// Current time.
    pub now: Timestamp,

    /// Seconds of skew to forgive on either edge of the window.
    pub clock_drift_tolerance: u64,
}

impl TimeContext {
    /// A context at `now` with no drift tolerance.
    #[must_use]
    pub const fn at(now: Timestamp) -> Self {
        Self {
            now,
            clock_drift_tolerance: 0,
        }
    }

    /// Sets the drift tolerance in seconds.
    #[must_use]
    pub const fn with_clock_drift_tolerance(mut self, seconds: u64) -> Self {
        self.clock_drift_tolerance = seconds;
        self
    }
}

/// `true` iff `exp` is set and `now > exp + tolerance`.
#[must_use]
pub fn is_token_expired(payload: &Payload, time: &TimeContext) -> bool {
    payload.expiration().is_some_and(|expiration| {
        time.now > expiration.saturating_add(time.clock_drift_tolerance)
    })
}

/// `true` iff `nbf` is set and `now < nbf - tolerance`.
#[must_use]
pub fn is_token_not_yet_valid(payload: &Payload, time: &TimeContext) -> bool {
    payload.not_before().is_some_and(|not_before| {
        time.now < not_before.saturating_sub(time.clock_drift_tolerance)
    })
}
