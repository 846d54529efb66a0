//! CLI argument structures

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::analytics::TimeUnit;
use crate::domain::Machine;

/// Pipeline health for the Turbo Telescope image-processing pipeline
#[derive(Parser, Debug)]
#[command(name = "turbo-health")]
#[command(about = "turbo-health - Pipeline health for the Turbo Telescope image pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Where the rows come from and which window of runs to look at
#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    /// Exported rows (JSON array or CSV)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Start of the window (RFC 3339); defaults to `until` minus the configured lookback
    #[arg(long)]
    pub from: Option<DateTime<Utc>>,

    /// End of the window (RFC 3339); defaults to now
    #[arg(long)]
    pub until: Option<DateTime<Utc>>,

    /// Only keep these steps (short name or literal); repeatable
    #[arg(long = "step", value_name = "STEP")]
    pub steps: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a schema name into the instant it encodes
    Decode {
        /// Schema name, e.g. science_turbo_production_pipeline_3_1_2024_4_15_0
        schema_name: String,
    },

    /// Encode an RFC 3339 instant as a schema name
    Encode {
        /// Instant, e.g. 2024-03-01T10:15:00Z
        timestamp: DateTime<Utc>,
    },

    /// Aggregate runs into time buckets
    Aggregate {
        #[command(flatten)]
        window: WindowArgs,

        /// Bucket width; defaults to the configured unit
        #[arg(short, long, value_enum)]
        unit: Option<TimeUnit>,

        /// Emit a bucket for every unit step in the window, even without runs
        #[arg(long)]
        include_empty_buckets: bool,

        /// Show the runs of one bucket instead of the summary
        #[arg(long, value_name = "BUCKET_KEY")]
        bucket: Option<String>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Success and failure totals for the window
    Totals {
        #[command(flatten)]
        window: WindowArgs,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// List the science runs (schema names) in the window
    Tables {
        #[command(flatten)]
        window: WindowArgs,
    },

    /// Re-query the source periodically and print running totals
    Watch {
        #[command(flatten)]
        window: WindowArgs,

        /// Time between refreshes, e.g. 30s or 5m; defaults to the configured interval
        #[arg(long, value_parser = humantime::parse_duration)]
        refresh: Option<Duration>,

        /// Stop after this many refreshes
        #[arg(long)]
        iterations: Option<u64>,
    },

    /// Inspect the pipeline step catalogue
    Steps {
        #[command(subcommand)]
        command: StepsCommand,
    },

    /// Print the URL of the verbose log of a run
    LogUrl {
        schema_name: String,

        #[arg(long, value_enum, default_value_t = Machine::Tlenaii)]
        machine: Machine,
    },
}

#[derive(Subcommand, Debug)]
pub enum StepsCommand {
    /// List canonical steps and every literal that maps to them
    List,

    /// Report step literals in a data set that the catalogue does not know
    Check {
        /// Exported rows (JSON array or CSV)
        #[arg(short, long)]
        input: PathBuf,
    },
}
