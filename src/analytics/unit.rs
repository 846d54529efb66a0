//! Aggregation granularity

use chrono::{DateTime, Months, NaiveTime, SecondsFormat, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Width of a time bucket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 7] = [
        Self::Seconds,
        Self::Minutes,
        Self::Hours,
        Self::Days,
        Self::Weeks,
        Self::Months,
        Self::Years,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
        }
    }

    /// Zero every UTC field finer than this unit.
    ///
    /// Weeks, months and years stop at day granularity: they zero the time of
    /// day and leave the date alone.
    pub fn truncate(self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let naive = instant.naive_utc();
        let seconds_of_day = i64::from(naive.num_seconds_from_midnight());
        let kept = match self {
            Self::Seconds => seconds_of_day,
            Self::Minutes => seconds_of_day - seconds_of_day % 60,
            Self::Hours => seconds_of_day - seconds_of_day % 3_600,
            Self::Days | Self::Weeks | Self::Months | Self::Years => 0,
        };
        let time = NaiveTime::MIN + TimeDelta::seconds(kept);
        naive.date().and_time(time).and_utc()
    }

    /// Advance by exactly one unit. Months and years are calendar steps and
    /// clamp to the end of shorter months.
    ///
    /// Returns `None` once the result leaves chrono's representable range.
    pub fn step(self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Seconds => instant.checked_add_signed(TimeDelta::seconds(1)),
            Self::Minutes => instant.checked_add_signed(TimeDelta::minutes(1)),
            Self::Hours => instant.checked_add_signed(TimeDelta::hours(1)),
            Self::Days => instant.checked_add_signed(TimeDelta::days(1)),
            Self::Weeks => instant.checked_add_signed(TimeDelta::weeks(1)),
            Self::Months => instant.checked_add_months(Months::new(1)),
            Self::Years => instant.checked_add_months(Months::new(12)),
        }
    }

    /// ISO-8601 key of the bucket containing `instant`.
    pub fn bucket_key(self, instant: DateTime<Utc>) -> String {
        format_bucket_key(self.truncate(instant))
    }
}

/// Bucket keys are millisecond-precision UTC timestamps, e.g.
/// `2024-03-01T10:00:00.000Z`.
pub fn format_bucket_key(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|unit| {
                let plural = unit.as_str();
                normalized == plural || normalized == plural.trim_end_matches('s')
            })
            .ok_or_else(|| Error::UnknownTimeUnit(s.to_string()))
    }
}
