//! Schema name decoding, encoding and log lookup

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::DashboardConfig;
use crate::domain::{DatasetKind, Machine, SchemaName, SCHEMA_ZONE};

pub fn run_decode(schema_name: &str) -> Result<()> {
    let name = SchemaName::parse(schema_name)
        .with_context(|| format!("Failed to decode schema name '{schema_name}'"))?;
    let instant = name.instant();

    println!("UTC:     {}", instant.to_rfc3339_opts(SecondsFormat::Secs, true));
    println!(
        "Chicago: {}",
        instant
            .with_timezone(&SCHEMA_ZONE)
            .to_rfc3339_opts(SecondsFormat::Secs, false)
    );
    println!(
        "Dataset: {}",
        match name.kind() {
            DatasetKind::Science => "science",
            DatasetKind::Reference => "reference",
        }
    );

    Ok(())
}

pub fn run_encode(timestamp: DateTime<Utc>) -> Result<()> {
    let name = crate::domain::encode(timestamp)
        .with_context(|| format!("Failed to encode {timestamp}"))?;
    println!("{name}");
    Ok(())
}

pub fn run_log_url(schema_name: &str, machine: Machine, config: &DashboardConfig) -> Result<()> {
    let name = SchemaName::parse(schema_name)
        .with_context(|| format!("Failed to decode schema name '{schema_name}'"))?;
    println!("{}", name.log_url(config.log_servers.for_machine(machine)));
    Ok(())
}
