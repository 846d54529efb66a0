//! Pipeline health analytics
//!
//! Turns flat run records into per-bucket success/failure statistics for
//! charting, plus the totals and table projections shown next to the charts.

pub mod engine;
pub mod models;
pub mod unit;

pub use engine::{aggregate, table_rows, totals, BucketMap, TimeSeriesAggregator, DEFAULT_MAX_BUCKETS};
pub use models::*;
pub use unit::{format_bucket_key, TimeUnit};
