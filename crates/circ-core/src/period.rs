//! # Loan Periods
//!
//! A `Period` is a duration expressed in one of the interval units that loan
//! policies use: `Minutes`, `Hours`, `Days`, `Weeks`, `Months`.
//!
//! Interval names arrive from stored policy records as plain strings. An
//! unrecognised name does not fail deserialization; it is kept as
//! [`Interval::Unrecognized`] so the calculation that needs it can decide:
//! due-date calculation reports the period as not recognised, while the
//! overdue calculation treats an unknown grace period as zero minutes.
//!
//! ## Minute conversion
//!
//! | Interval | Minutes |
//! |----------|---------|
//! | Minutes  | 1       |
//! | Hours    | 60      |
//! | Days     | 1 440   |
//! | Weeks    | 10 080  |
//! | Months   | 44 640 (31 days) |

use chrono::{DateTime, Days, Duration, Months, TimeZone};
use serde::{Deserialize, Serialize};

/// Unit of a [`Period`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Interval {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    /// A unit name this engine does not know, kept verbatim.
    Unrecognized(String),
}

impl Interval {
    /// Minutes in one unit of this interval; zero when unrecognised.
    pub fn minutes(&self) -> i64 {
        match self {
            Self::Minutes => 1,
            Self::Hours => 60,
            Self::Days => 60 * 24,
            Self::Weeks => 60 * 24 * 7,
            Self::Months => 60 * 24 * 31,
            Self::Unrecognized(_) => 0,
        }
    }

    /// Whether this is one of the known units.
    pub fn is_recognised(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// Whether periods in this unit are shorter than a day. Short-term loans
    /// are adjusted against service-point hours rather than whole days.
    pub fn is_short_term(&self) -> bool {
        matches!(self, Self::Minutes | Self::Hours)
    }

    fn name(&self) -> &str {
        match self {
            Self::Minutes => "Minutes",
            Self::Hours => "Hours",
            Self::Days => "Days",
            Self::Weeks => "Weeks",
            Self::Months => "Months",
            Self::Unrecognized(name) => name,
        }
    }
}

impl From<String> for Interval {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Minutes" => Self::Minutes,
            "Hours" => Self::Hours,
            "Days" => Self::Days,
            "Weeks" => Self::Weeks,
            "Months" => Self::Months,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<&str> for Interval {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Interval> for String {
    fn from(value: Interval) -> Self {
        value.name().to_string()
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A duration in loan-policy units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub duration: u32,
    pub interval: Interval,
}

impl Period {
    pub fn new(duration: u32, interval: impl Into<Interval>) -> Self {
        Self {
            duration,
            interval: interval.into(),
        }
    }

    pub fn minutes(duration: u32) -> Self {
        Self::new(duration, Interval::Minutes)
    }

    pub fn hours(duration: u32) -> Self {
        Self::new(duration, Interval::Hours)
    }

    pub fn days(duration: u32) -> Self {
        Self::new(duration, Interval::Days)
    }

    pub fn weeks(duration: u32) -> Self {
        Self::new(duration, Interval::Weeks)
    }

    pub fn months(duration: u32) -> Self {
        Self::new(duration, Interval::Months)
    }

    /// Length of the period in whole minutes; unrecognised units count as 0.
    pub fn to_minutes(&self) -> i64 {
        i64::from(self.duration) * self.interval.minutes()
    }

    /// A period is usable for due-date arithmetic when its unit is known and
    /// its duration is positive.
    pub fn is_usable(&self) -> bool {
        self.duration > 0 && self.interval.is_recognised()
    }

    /// Add this period to a local date-time.
    ///
    /// Days, weeks and months move the local calendar date and keep the
    /// local time of day; minutes and hours add elapsed time. Returns `None`
    /// for unrecognised units and on overflow.
    pub fn add_to<Tz: TimeZone>(&self, dt: DateTime<Tz>) -> Option<DateTime<Tz>> {
        let n = u64::from(self.duration);
        match self.interval {
            Interval::Minutes => dt.checked_add_signed(Duration::minutes(n as i64)),
            Interval::Hours => dt.checked_add_signed(Duration::hours(n as i64)),
            Interval::Days => dt.checked_add_days(Days::new(n)),
            Interval::Weeks => dt.checked_add_days(Days::new(n * 7)),
            Interval::Months => dt.checked_add_months(Months::new(self.duration)),
            Interval::Unrecognized(_) => None,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.duration, self.interval)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    proptest! {
        /// Minute and hour periods add exactly their minute count.
        #[test]
        fn elapsed_periods_match_minute_count(n in 0u32..100_000, hours in any::<bool>()) {
            let period = if hours { Period::hours(n) } else { Period::minutes(n) };
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let end = period.add_to(start).unwrap();
            prop_assert_eq!((end - start).num_minutes(), period.to_minutes());
        }
    }
}
