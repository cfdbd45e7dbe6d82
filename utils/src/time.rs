//! Time formatting helpers.

use serde::Serialize;

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Whole days, hours and minutes left until a deadline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

impl Countdown {
    /// Break `secs` down, truncating leftover seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self {
            days: secs / 86_400,
            hours: (secs % 86_400) / 3_600,
            minutes: (secs % 3_600) / 60,
        }
    }

    pub fn is_over(&self) -> bool {
        *self == Self::default()
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d {}h {}m", self.days, self.hours, self.minutes)
    }
}
