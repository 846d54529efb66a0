use clap::Parser;
use tracing::{debug, error, trace};
use tracing_subscriber::EnvFilter;

use turbo_health::cli::{execute_command, Cli};
use turbo_health::config::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .with_line_number(cli.verbose >= 3)
        .init();

    debug!("turbo-health started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = run(cli).await;

    if let Err(e) = result {
        error!("Fatal error: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ConfigLoader::new(cli.config).load().await?;
    debug!(
        "Using unit {} with a cap of {} buckets",
        config.default_unit, config.max_buckets
    );
    execute_command(cli.command, &config).await
}
