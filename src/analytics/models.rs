//! Data models for pipeline health analytics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::unit::TimeUnit;
use crate::domain::{PipelineStep, RunRecord};
use crate::error::{Error, Result};

/// Processing-time threshold drawn on run-time charts, in seconds.
pub const DISPLAY_THRESHOLD: f64 = 30.0;

/// What to aggregate and over which window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationRequest {
    pub unit: TimeUnit,
    pub from: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub include_empty_buckets: bool,
}

/// Statistics for one time bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketAggregate {
    pub threshold: f64,
    pub avg_fail_time: f64,
    pub avg_success_time: f64,
    pub number_failed_runs: usize,
    pub number_successful_runs: usize,
    pub entries: Vec<RunRecord>,
}

impl BucketAggregate {
    /// Placeholder for a bucket with no runs.
    pub fn empty() -> Self {
        Self {
            threshold: DISPLAY_THRESHOLD,
            avg_fail_time: 0.0,
            avg_success_time: 0.0,
            number_failed_runs: 0,
            number_successful_runs: 0,
            entries: Vec::new(),
        }
    }

    pub fn from_entries(entries: Vec<RunRecord>) -> Self {
        let (successes, failures): (Vec<&RunRecord>, Vec<&RunRecord>) =
            entries.iter().partition(|record| record.success());

        Self {
            threshold: DISPLAY_THRESHOLD,
            avg_fail_time: mean_processing_time(&failures),
            avg_success_time: mean_processing_time(&successes),
            number_failed_runs: failures.len(),
            number_successful_runs: successes.len(),
            entries,
        }
    }

    pub fn total_runs(&self) -> usize {
        self.number_failed_runs + self.number_successful_runs
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mean of an empty partition is zero.
fn mean_processing_time(records: &[&RunRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: f64 = records.iter().map(|record| record.processing_time).sum();
    total / records.len() as f64
}

/// Overall success/failure counts for a record set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTotals {
    pub failed_runs: usize,
    pub successful_runs: usize,
    /// Percent, 0 when there are no runs.
    pub success_rate: f64,
    /// Percent, 0 when there are no runs.
    pub failure_rate: f64,
    pub total_runs: usize,
}

impl RunTotals {
    pub fn from_records(records: &[RunRecord]) -> Self {
        let total_runs = records.len();
        let successful_runs = records.iter().filter(|record| record.success()).count();
        let failed_runs = total_runs - successful_runs;

        let rate = |count: usize| {
            if total_runs == 0 {
                0.0
            } else {
                count as f64 / total_runs as f64 * 100.0
            }
        };

        Self {
            failed_runs,
            successful_runs,
            success_rate: rate(successful_runs),
            failure_rate: rate(failed_runs),
            total_runs,
        }
    }
}

/// One line of the run table shown for a selected bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub run: DateTime<Utc>,
    pub file: String,
    pub message: String,
    pub schema_name: String,
    pub processing_time: f64,
    pub pipeline_step: String,
}

impl TableRow {
    pub fn from_record(record: &RunRecord) -> Result<Self> {
        let run = record.date().map_err(|source| Error::UndecodableRecord {
            image_id: record.image_id,
            source_table: record.source_table.clone(),
            source,
        })?;

        Ok(Self {
            run,
            file: record.file_path.to_string(),
            message: record.completion.clone(),
            schema_name: record.source_table.clone(),
            processing_time: record.processing_time,
            pipeline_step: record.pipeline_step.to_string(),
        })
    }
}

/// Set of steps to keep. An empty filter keeps every step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepFilter {
    steps: HashSet<PipelineStep>,
}

impl StepFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(steps: impl IntoIterator<Item = PipelineStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    /// Build from short names or step literals.
    pub fn parse<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Result<Self> {
        let steps = names
            .into_iter()
            .map(|name| name.as_ref().parse::<PipelineStep>())
            .collect::<Result<HashSet<_>>>()?;
        Ok(Self { steps })
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn allows(&self, record: &RunRecord) -> bool {
        self.steps.is_empty() || self.steps.contains(&record.step())
    }

    pub fn apply(&self, records: Vec<RunRecord>) -> Vec<RunRecord> {
        records.into_iter().filter(|record| self.allows(record)).collect()
    }
}
