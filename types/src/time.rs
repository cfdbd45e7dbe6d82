//! Timestamps and the clock abstraction.
//!
//! Timestamps are Unix epoch seconds (UTC). Every component that needs "now" takes a
//! [`Clock`] so tests can substitute a controllable one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const SECS_PER_HOUR: u64 = 60 * 60;
pub const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Read the wall clock. A clock set before 1970 reads as the epoch.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// This timestamp shifted forward by `secs`, saturating at `u64::MAX`.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Seconds left until this timestamp is reached, zero once it has passed.
    pub fn remaining_from(&self, now: Timestamp) -> u64 {
        self.0.saturating_sub(now.0)
    }

    /// Whether this timestamp + duration has passed relative to `now`.
    pub fn has_expired(&self, duration_secs: u64, now: Timestamp) -> bool {
        now.0 >= self.0.saturating_add(duration_secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Clock handle shared between engine components.
pub type SharedClock = Arc<dyn Clock>;

/// Wall clock that never reports a time earlier than one it already reported.
///
/// Deadline comparisons in the scheduler assume time does not run backwards, so a
/// wall-clock step back (NTP correction) is absorbed by holding the last reading.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let wall = Timestamp::now().as_secs();
        let prev = self.last.fetch_max(wall, Ordering::AcqRel);
        Timestamp::new(prev.max(wall))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        clock.last.store(u64::MAX - 1, Ordering::Release);
        assert_eq!(clock.now().as_secs(), u64::MAX - 1);
        assert!(clock.now() >= Timestamp::new(u64::MAX - 1));
    }

    #[test]
    fn remaining_from_saturates() {
        let end = Timestamp::new(100);
        assert_eq!(end.remaining_from(Timestamp::new(40)), 60);
        assert_eq!(end.remaining_from(Timestamp::new(140)), 0);
    }

    #[test]
    fn plus_secs_saturates() {
        assert_eq!(Timestamp::new(u64::MAX).plus_secs(5).as_secs(), u64::MAX);
    }
}
