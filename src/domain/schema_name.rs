//! Schema names and the timestamp codec
//!
//! Every pipeline run writes its rows into a dedicated database schema whose
//! name carries the wall-clock start time of the run in Chicago local time:
//!
//! ```text
//! science_turbo_production_pipeline_{month}_{day}_{year}_{hours}_{minutes}_{seconds}
//! ```
//!
//! Decoding validates every field, resolves the local time against the
//! America/Chicago zone (including daylight saving transitions) and yields an
//! absolute UTC instant. Encoding goes the other way and always produces the
//! `science` prefix with zero-padded fields.

use chrono::offset::LocalResult;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TimestampError;

/// Zone every schema name is written in.
pub const SCHEMA_ZONE: Tz = chrono_tz::America::Chicago;

/// IANA name of [`SCHEMA_ZONE`], used in error messages.
pub const SCHEMA_ZONE_NAME: &str = "America/Chicago";

const SCIENCE_PREFIX: &str = "science_turbo_production_pipeline_";
const REFERENCE_PREFIX: &str = "reference_turbo_production_pipeline_";

const MIN_YEAR: i64 = 0;
const MAX_YEAR: i64 = 9999;

/// Which kind of dataset a schema holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Science,
    Reference,
}

impl DatasetKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Science => SCIENCE_PREFIX,
            Self::Reference => REFERENCE_PREFIX,
        }
    }
}

/// Machine whose log server hosts the verbose log of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Machine {
    Tlenaii,
    Popcorn,
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tlenaii => write!(f, "tlenaii"),
            Self::Popcorn => write!(f, "popcorn"),
        }
    }
}

/// A validated schema name together with the instant it encodes.
///
/// The input text is kept verbatim so unpadded names coming from the
/// database survive a display round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaName {
    raw: String,
    kind: DatasetKind,
    instant: DateTime<Utc>,
}

impl SchemaName {
    /// Parse and fully decode a schema name.
    pub fn parse(input: &str) -> Result<Self, TimestampError> {
        let (kind, suffix) = split_prefix(input)?;
        let fields = split_fields(input, suffix)?;
        let instant = decode_fields(&fields)?;

        Ok(Self {
            raw: input.to_string(),
            kind,
            instant,
        })
    }

    /// Build the canonical (`science`, zero-padded) name for an instant.
    pub fn from_instant(instant: DateTime<Utc>) -> Result<Self, TimestampError> {
        let raw = encode(instant)?;
        Ok(Self {
            raw,
            kind: DatasetKind::Science,
            instant: instant.with_nanosecond(0).unwrap_or(instant),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// The six numeric fields exactly as written: month, day, year, hours,
    /// minutes, seconds.
    fn parts(&self) -> [&str; 6] {
        let suffix = &self.raw[self.kind.prefix().len()..];
        let mut parts = [""; 6];
        for (slot, part) in parts.iter_mut().zip(suffix.split('_')) {
            *slot = part;
        }
        parts
    }

    /// Location of the verbose log for this run on the given log server.
    ///
    /// Log directories are ordered year first, with the fields copied
    /// verbatim from the schema name.
    pub fn log_url(&self, server: &str) -> String {
        let [month, day, year, hours, minutes, seconds] = self.parts();
        format!(
            "{}/Light_weight_pipeline_{year}_{month}_{day}_{hours}_{minutes}_{seconds}/verbose_log.txt",
            server.trim_end_matches('/')
        )
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for SchemaName {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SchemaName {
    type Error = TimestampError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SchemaName> for String {
    fn from(name: SchemaName) -> Self {
        name.raw
    }
}

/// Decode a schema name into the UTC instant it represents.
pub fn decode(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    SchemaName::parse(input).map(|name| name.instant)
}

/// Encode an instant as a `science` schema name.
///
/// Sub-second precision is dropped; the fields are zero padded (two digits,
/// three for the year).
pub fn encode(instant: DateTime<Utc>) -> Result<String, TimestampError> {
    let local = instant.with_timezone(&SCHEMA_ZONE);
    let year = local.year();
    if !(MIN_YEAR..=MAX_YEAR).contains(&(year as i64)) {
        return Err(TimestampError::UnsupportedYear { year });
    }

    Ok(format!(
        "{SCIENCE_PREFIX}{:02}_{:02}_{:03}_{:02}_{:02}_{:02}",
        local.month(),
        local.day(),
        year,
        local.hour(),
        local.minute(),
        local.second()
    ))
}

fn split_prefix(input: &str) -> Result<(DatasetKind, &str), TimestampError> {
    [DatasetKind::Science, DatasetKind::Reference]
        .into_iter()
        .find_map(|kind| input.strip_prefix(kind.prefix()).map(|rest| (kind, rest)))
        .ok_or_else(|| TimestampError::Malformed {
            input: input.to_string(),
            reason: "expected a science_ or reference_turbo_production_pipeline_ prefix".to_string(),
        })
}

fn split_fields<'a>(input: &str, suffix: &'a str) -> Result<[&'a str; 6], TimestampError> {
    let parts: Vec<&str> = suffix.split('_').collect();
    if parts.len() != 6 {
        return Err(TimestampError::Malformed {
            input: input.to_string(),
            reason: format!("expected 6 numeric fields, found {}", parts.len()),
        });
    }
    if let Some(position) = parts.iter().position(|p| p.is_empty()) {
        return Err(TimestampError::Malformed {
            input: input.to_string(),
            reason: format!("field {} is empty", position + 1),
        });
    }

    Ok([parts[0], parts[1], parts[2], parts[3], parts[4], parts[5]])
}

fn parse_field(field: &'static str, value: &str, min: i64, max: i64) -> Result<i64, TimestampError> {
    let parsed = value
        .parse::<i64>()
        .map_err(|_| TimestampError::NotAnInteger {
            field,
            value: value.to_string(),
        })?;

    if !(min..=max).contains(&parsed) {
        return Err(TimestampError::OutOfRange {
            field,
            value: parsed,
            min,
            max,
        });
    }

    Ok(parsed)
}

fn decode_fields(fields: &[&str; 6]) -> Result<DateTime<Utc>, TimestampError> {
    let [month, day, year, hours, minutes, seconds] = *fields;

    let year = parse_field("year", year, MIN_YEAR, MAX_YEAR)? as i32;
    let month = parse_field("month", month, 1, 12)? as u32;
    let day = parse_field("day", day, 1, 31)? as u32;
    let hours = parse_field("hours", hours, 0, 23)? as u32;
    let minutes = parse_field("minutes", minutes, 0, 59)? as u32;
    let seconds = parse_field("seconds", seconds, 0, 59)? as u32;

    let nonexistent = || TimestampError::NonexistentLocalTime {
        zone: SCHEMA_ZONE_NAME,
        year,
        month,
        day,
        hours,
        minutes,
        seconds,
    };

    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hours, minutes, seconds))
        .ok_or_else(nonexistent)?;

    // In the repeated hour after the autumn transition the earlier offset wins.
    match SCHEMA_ZONE.from_local_datetime(&naive) {
        LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(nonexistent()),
    }
}
