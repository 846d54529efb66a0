use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::analytics::TimeUnit;

/// Failure to turn a schema name into an instant (or back).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("invalid timestamp: malformed schema name '{input}': {reason}")]
    Malformed { input: String, reason: String },

    #[error("invalid timestamp: {field} '{value}' is not an integer")]
    NotAnInteger { field: &'static str, value: String },

    #[error("invalid timestamp: {field} {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error(
        "invalid timestamp: {year:04}-{month:02}-{day:02} {hours:02}:{minutes:02}:{seconds:02} does not exist in {zone}"
    )]
    NonexistentLocalTime {
        zone: &'static str,
        year: i32,
        month: u32,
        day: u32,
        hours: u32,
        minutes: u32,
        seconds: u32,
    },

    #[error("invalid timestamp: year {year} cannot be encoded (supported 0..=9999)")]
    UnsupportedYear { year: i32 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    InvalidTimestamp(#[from] TimestampError),

    #[error("record for image {image_id} has undecodable source table '{source_table}': {source}")]
    UndecodableRecord {
        image_id: i64,
        source_table: String,
        #[source]
        source: TimestampError,
    },

    #[error(
        "too many {unit} buckets between {from} and {until} (limit {limit}); choose a coarser unit or a shorter range"
    )]
    BucketOverrun {
        unit: TimeUnit,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        limit: usize,
    },

    #[error("unknown time unit: '{0}' (expected seconds, minutes, hours, days, weeks, months or years)")]
    UnknownTimeUnit(String),

    #[error("unknown pipeline step: '{0}'")]
    UnknownPipelineStep(String),

    #[error("invalid file path: '{0}'")]
    InvalidFilePath(String),

    #[error("invalid record for image {image_id}: {reason}")]
    InvalidRecord { image_id: i64, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
