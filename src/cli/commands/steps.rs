//! Pipeline step catalogue commands

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

use crate::domain::PipelineStep;
use crate::source::{FileRunSource, RunSource};

pub fn run_steps_list() -> Result<()> {
    for step in PipelineStep::ALL {
        println!("{}", step.short_name());
        for alias in step.aliases() {
            println!("    \"{alias}\"");
        }
    }
    Ok(())
}

pub async fn run_steps_check(input: &Path) -> Result<()> {
    let rows = FileRunSource::new(input)
        .raw_rows()
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let seen: BTreeSet<&str> = rows.iter().map(|row| row.pipeline_step.as_str()).collect();
    let unhandled: Vec<&str> = seen
        .iter()
        .copied()
        .filter(|literal| PipelineStep::resolve(literal).is_none())
        .collect();

    if unhandled.is_empty() {
        println!("All {} pipeline step names are handled", seen.len());
    } else {
        for literal in &unhandled {
            println!("pipeline step name \"{literal}\" is not handled");
        }
    }

    Ok(())
}
