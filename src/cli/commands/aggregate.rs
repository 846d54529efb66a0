//! Aggregation, totals and run listing commands

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::analytics::{
    table_rows, totals, AggregationRequest, BucketMap, RunTotals, StepFilter, TableRow, TimeUnit,
};
use crate::cli::args::{OutputFormat, WindowArgs};
use crate::config::DashboardConfig;
use crate::domain::RunRecord;
use crate::source::{flatten, FileRunSource, RunSource};

pub struct AggregateOptions {
    pub unit: TimeUnit,
    pub include_empty_buckets: bool,
    pub bucket: Option<String>,
    pub format: OutputFormat,
}

/// `until` defaults to now, `from` to `until` minus the configured lookback.
pub fn resolve_window(
    window: &WindowArgs,
    config: &DashboardConfig,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let until = window.until.unwrap_or_else(Utc::now);
    let from = match window.from {
        Some(from) => from,
        None => {
            let lookback = chrono::Duration::from_std(config.default_lookback)
                .context("Configured lookback is too large")?;
            until
                .checked_sub_signed(lookback)
                .with_context(|| {
                    format!(
                        "Configured lookback of {} reaches before the earliest representable instant",
                        humantime::format_duration(config.default_lookback)
                    )
                })?
        }
    };
    Ok((from, until))
}

fn step_filter(window: &WindowArgs, config: &DashboardConfig) -> Result<StepFilter> {
    let filter = if window.steps.is_empty() {
        config.step_filter()
    } else {
        StepFilter::parse(&window.steps)
    };
    filter.context("Invalid step filter")
}

/// Validated records of the runs in the window, after the step filter.
pub async fn load_records(
    window: &WindowArgs,
    config: &DashboardConfig,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<RunRecord>> {
    let filter = step_filter(window, config)?;
    let source = FileRunSource::new(&window.input);
    let runs = source
        .runs_in_range(from, until)
        .await
        .with_context(|| format!("Failed to load runs from {}", window.input.display()))?;
    Ok(filter.apply(flatten(runs)))
}

pub async fn run_aggregate(
    window: &WindowArgs,
    options: AggregateOptions,
    config: &DashboardConfig,
) -> Result<()> {
    let (from, until) = resolve_window(window, config)?;
    let records = load_records(window, config, from, until).await?;

    let request = AggregationRequest {
        unit: options.unit,
        from,
        until,
        include_empty_buckets: options.include_empty_buckets,
    };
    let buckets = config
        .aggregator()
        .aggregate(&records, &request)
        .context("Failed to aggregate runs")?;

    if let Some(key) = &options.bucket {
        let rows = table_rows(&buckets, key)?;
        match options.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            OutputFormat::Table => print_table_rows(key, &rows),
        }
        return Ok(());
    }

    match options.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&buckets)?),
        OutputFormat::Table => print_buckets(&buckets, from, until),
    }

    Ok(())
}

pub async fn run_totals(window: &WindowArgs, format: OutputFormat, config: &DashboardConfig) -> Result<()> {
    let (from, until) = resolve_window(window, config)?;
    let records = load_records(window, config, from, until).await?;
    let totals = totals(&records);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&totals)?),
        OutputFormat::Table => print_totals(&totals),
    }

    Ok(())
}

pub async fn run_tables(window: &WindowArgs, config: &DashboardConfig) -> Result<()> {
    let (from, until) = resolve_window(window, config)?;
    let names = FileRunSource::new(&window.input)
        .schema_names_in_range(from, until)
        .await
        .with_context(|| format!("Failed to read {}", window.input.display()))?;

    if names.is_empty() {
        println!("No runs between {} and {}", format_instant(from), format_instant(until));
        return Ok(());
    }

    for name in names {
        println!("{}  {}", format_instant(name.instant()), name);
    }

    Ok(())
}

pub fn print_totals(totals: &RunTotals) {
    println!("Total runs:      {}", totals.total_runs);
    println!(
        "Successful runs: {} ({:.1}%)",
        totals.successful_runs, totals.success_rate
    );
    println!(
        "Failed runs:     {} ({:.1}%)",
        totals.failed_runs, totals.failure_rate
    );
}

fn print_buckets(buckets: &BucketMap, from: DateTime<Utc>, until: DateTime<Utc>) {
    if buckets.is_empty() {
        println!("No runs between {} and {}", format_instant(from), format_instant(until));
        return;
    }

    println!(
        "{:<26}{:>8}{:>8}{:>14}{:>14}",
        "BUCKET", "OK", "FAIL", "AVG OK (s)", "AVG FAIL (s)"
    );
    for (key, bucket) in buckets {
        println!(
            "{:<26}{:>8}{:>8}{:>14.2}{:>14.2}",
            key,
            bucket.number_successful_runs,
            bucket.number_failed_runs,
            bucket.avg_success_time,
            bucket.avg_fail_time
        );
    }
}

fn print_table_rows(key: &str, rows: &[TableRow]) {
    if rows.is_empty() {
        println!("No runs in bucket {key}");
        return;
    }

    for row in rows {
        println!(
            "{}  {:>8.2}s  {:<45}  {}  {}",
            format_instant(row.run),
            row.processing_time,
            row.pipeline_step,
            row.file,
            row.message
        );
    }
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
