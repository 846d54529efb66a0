//! Time-series aggregation of pipeline runs

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::models::{AggregationRequest, BucketAggregate, RunTotals, TableRow};
use super::unit::TimeUnit;
use crate::domain::RunRecord;
use crate::error::{Error, Result};

/// Bucket key (ISO-8601 bucket start) to bucket statistics, ordered by key.
pub type BucketMap = BTreeMap<String, BucketAggregate>;

/// Default cap on generated bucket boundaries per call.
pub const DEFAULT_MAX_BUCKETS: usize = 100_000;

/// Groups run records into fixed-width time buckets
#[derive(Debug, Clone)]
pub struct TimeSeriesAggregator {
    max_buckets: usize,
}

impl Default for TimeSeriesAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSeriesAggregator {
    pub fn new() -> Self {
        Self {
            max_buckets: DEFAULT_MAX_BUCKETS,
        }
    }

    pub fn with_max_buckets(max_buckets: usize) -> Self {
        Self { max_buckets }
    }

    pub fn max_buckets(&self) -> usize {
        self.max_buckets
    }

    /// Aggregate `records` into buckets of `request.unit`.
    ///
    /// Without empty buckets only keys that hold at least one record are
    /// returned. With empty buckets every boundary from the bucket holding
    /// `from` up to `until` gets a key, and populated buckets that are not
    /// boundaries (day-level keys of weeks, months and years, or records
    /// outside the window) are kept alongside them. Every sparse bucket is
    /// therefore also in the dense result.
    pub fn aggregate(&self, records: &[RunRecord], request: &AggregationRequest) -> Result<BucketMap> {
        let unit = request.unit;
        let sparse = self.group(records, unit)?;

        debug!(
            "Grouped {} records into {} {} buckets",
            records.len(),
            sparse.len(),
            unit
        );

        if !request.include_empty_buckets {
            return Ok(sparse);
        }

        let boundaries = if request.from > request.until {
            Vec::new()
        } else {
            self.boundaries(unit, unit.truncate(request.from), request.until)?
        };

        let mut dense: BucketMap = boundaries
            .into_iter()
            .map(|boundary| (unit.bucket_key(boundary), BucketAggregate::empty()))
            .collect();

        let mut off_boundary = 0usize;
        for (key, bucket) in sparse {
            if !dense.contains_key(&key) {
                off_boundary += 1;
            }
            dense.insert(key, bucket);
        }

        if off_boundary > 0 {
            debug!(
                "Kept {} populated {} buckets that are not boundaries between {} and {}",
                off_boundary, unit, request.from, request.until
            );
        }

        Ok(dense)
    }

    /// Sparse grouping: bucket key to the records that fall in it.
    fn group(&self, records: &[RunRecord], unit: TimeUnit) -> Result<BucketMap> {
        let mut groups: BTreeMap<String, Vec<RunRecord>> = BTreeMap::new();

        for record in records {
            let date = record.date().map_err(|source| Error::UndecodableRecord {
                image_id: record.image_id,
                source_table: record.source_table.clone(),
                source,
            })?;
            groups
                .entry(unit.bucket_key(date))
                .or_default()
                .push(record.clone());
        }

        Ok(groups
            .into_iter()
            .map(|(key, entries)| (key, BucketAggregate::from_entries(entries)))
            .collect())
    }

    /// Every instant `from`, `from + unit`, ... up to and including `until`.
    ///
    /// An inverted range yields no boundaries. Exceeding the bucket cap is an
    /// error rather than a silently shortened series.
    pub fn boundaries(
        &self,
        unit: TimeUnit,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>> {
        let mut boundaries = Vec::new();
        let mut cursor = Some(from);

        while let Some(current) = cursor.filter(|instant| *instant <= until) {
            if boundaries.len() == self.max_buckets {
                warn!(
                    "Refusing to generate more than {} {} buckets between {} and {}",
                    self.max_buckets, unit, from, until
                );
                return Err(Error::BucketOverrun {
                    unit,
                    from,
                    until,
                    limit: self.max_buckets,
                });
            }
            boundaries.push(current);
            cursor = unit.step(current);
        }

        Ok(boundaries)
    }
}

/// Aggregate with the default bucket cap.
pub fn aggregate(
    records: &[RunRecord],
    unit: TimeUnit,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
    include_empty_buckets: bool,
) -> Result<BucketMap> {
    TimeSeriesAggregator::new().aggregate(
        records,
        &AggregationRequest {
            unit,
            from,
            until,
            include_empty_buckets,
        },
    )
}

pub fn totals(records: &[RunRecord]) -> RunTotals {
    RunTotals::from_records(records)
}

/// Table rows for the bucket under `key`; an unknown key gives no rows.
pub fn table_rows(buckets: &BucketMap, key: &str) -> Result<Vec<TableRow>> {
    buckets
        .get(key)
        .map(|bucket| bucket.entries.iter().map(TableRow::from_record).collect())
        .unwrap_or_else(|| Ok(Vec::new()))
}
