//! Query layer seam
//!
//! The analytics core only needs a flat list of validated run records for a
//! time window. [`RunSource`] is the boundary to whatever produces them; the
//! implementations here read exported fixtures from disk or hold rows in
//! memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::{DatasetKind, RawRunRow, RunRecord, SchemaName};
use crate::error::Result;

/// Records grouped by the schema (run) they were read from.
pub type RunsBySchema = BTreeMap<String, Vec<RunRecord>>;

#[async_trait]
pub trait RunSource: Send + Sync {
    /// Every raw row the source knows about, unvalidated.
    async fn raw_rows(&self) -> Result<Vec<RawRunRow>>;

    /// Validated rows of the science runs that started within `[from, until]`.
    async fn runs_in_range(&self, from: DateTime<Utc>, until: DateTime<Utc>) -> Result<RunsBySchema> {
        let rows = self.raw_rows().await?;
        select_runs(rows, from, until)
    }

    /// Science schema names that started within `[from, until]`, oldest first.
    async fn schema_names_in_range(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<SchemaName>> {
        let rows = self.raw_rows().await?;
        Ok(schema_names_in_range(
            rows.iter().map(|row| row.source_table.as_str()),
            from,
            until,
        ))
    }
}

/// Keep the decodable science schema names whose start lies within
/// `[from, until]`, sorted by start and deduplicated.
///
/// Names that do not decode are not runs and are skipped without error.
pub fn schema_names_in_range<I, S>(names: I, from: DateTime<Utc>, until: DateTime<Utc>) -> Vec<SchemaName>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut selected: Vec<SchemaName> = names
        .into_iter()
        .filter(|name| seen.insert(name.as_ref().to_string()))
        .filter_map(|name| SchemaName::parse(name.as_ref()).ok())
        .filter(|name| name.kind() == DatasetKind::Science)
        .filter(|name| name.instant() >= from && name.instant() <= until)
        .collect();

    selected.sort_by(|a, b| a.instant().cmp(&b.instant()).then_with(|| a.as_str().cmp(b.as_str())));
    selected
}

/// Validate the rows belonging to runs within the window.
pub fn select_runs(rows: Vec<RawRunRow>, from: DateTime<Utc>, until: DateTime<Utc>) -> Result<RunsBySchema> {
    let in_range: HashSet<String> = schema_names_in_range(
        rows.iter().map(|row| row.source_table.as_str()),
        from,
        until,
    )
    .into_iter()
    .map(String::from)
    .collect();

    let mut runs = RunsBySchema::new();
    for name in &in_range {
        runs.insert(name.clone(), Vec::new());
    }

    for row in rows {
        if let Some(records) = runs.get_mut(&row.source_table) {
            records.push(RunRecord::try_from(row)?);
        }
    }

    debug!("Selected {} runs between {} and {}", runs.len(), from, until);
    Ok(runs)
}

/// All records of all runs, in schema-name order.
pub fn flatten(runs: RunsBySchema) -> Vec<RunRecord> {
    runs.into_values().flatten().collect()
}

/// Rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRunSource {
    rows: Vec<RawRunRow>,
}

impl MemoryRunSource {
    pub fn new(rows: Vec<RawRunRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl RunSource for MemoryRunSource {
    async fn raw_rows(&self) -> Result<Vec<RawRunRow>> {
        Ok(self.rows.clone())
    }
}

/// Rows exported to a JSON (array of rows) or CSV file.
///
/// The file is re-read on every query so a refreshed export is picked up.
#[derive(Debug, Clone)]
pub struct FileRunSource {
    path: PathBuf,
}

impl FileRunSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_csv(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    }
}

#[async_trait]
impl RunSource for FileRunSource {
    async fn raw_rows(&self) -> Result<Vec<RawRunRow>> {
        let content = tokio::fs::read_to_string(&self.path).await?;

        let rows = if self.is_csv() {
            csv::Reader::from_reader(content.as_bytes())
                .deserialize()
                .collect::<std::result::Result<Vec<RawRunRow>, _>>()?
        } else {
            serde_json::from_str::<Vec<RawRunRow>>(&content)?
        };

        info!("Loaded {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}
