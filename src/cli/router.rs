//! Command routing and execution

use anyhow::Result;

use crate::cli::args::{Commands, StepsCommand};
use crate::cli::commands::*;
use crate::config::DashboardConfig;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Commands, config: &DashboardConfig) -> Result<()> {
    match command {
        Commands::Decode { schema_name } => run_decode(&schema_name),
        Commands::Encode { timestamp } => run_encode(timestamp),
        Commands::Aggregate {
            window,
            unit,
            include_empty_buckets,
            bucket,
            format,
        } => {
            let options = AggregateOptions {
                unit: unit.unwrap_or(config.default_unit),
                include_empty_buckets: include_empty_buckets || config.include_empty_buckets,
                bucket,
                format,
            };
            run_aggregate(&window, options, config).await
        }
        Commands::Totals { window, format } => run_totals(&window, format, config).await,
        Commands::Tables { window } => run_tables(&window, config).await,
        Commands::Watch {
            window,
            refresh,
            iterations,
        } => {
            let refresh = refresh.unwrap_or(config.refresh_interval);
            run_watch(&window, refresh, iterations, config).await
        }
        Commands::Steps { command } => match command {
            StepsCommand::List => run_steps_list(),
            StepsCommand::Check { input } => run_steps_check(&input).await,
        },
        Commands::LogUrl {
            schema_name,
            machine,
        } => run_log_url(&schema_name, machine, config),
    }
}
