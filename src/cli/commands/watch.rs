//! Periodic refresh of run totals

use anyhow::{bail, Result};
use chrono::Utc;
use std::time::Duration;
use tracing::{info, warn};

use super::aggregate::{load_records, print_totals, resolve_window};
use crate::analytics::totals;
use crate::cli::args::WindowArgs;
use crate::config::DashboardConfig;

/// Every `refresh`, reload the window `[from, now]` and print its totals.
/// The window always ends at the time of the refresh, so `--until` is refused.
///
/// A failed refresh is reported and retried on the next tick.
pub async fn run_watch(
    window: &WindowArgs,
    refresh: Duration,
    iterations: Option<u64>,
    config: &DashboardConfig,
) -> Result<()> {
    if refresh.is_zero() {
        bail!("Refresh interval must be greater than zero");
    }
    if window.until.is_some() {
        bail!("--until is not supported by watch; each refresh covers the window up to now");
    }

    let (from, _) = resolve_window(window, config)?;
    let mut interval = tokio::time::interval(refresh);
    let mut completed = 0u64;

    info!("Watching {} every {:?}", window.input.display(), refresh);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch");
                return Ok(());
            }
        }

        let now = Utc::now();
        match load_records(window, config, from, now).await {
            Ok(records) => {
                println!("--- {} ---", now.format("%Y-%m-%d %H:%M:%S UTC"));
                print_totals(&totals(&records));
            }
            Err(e) => warn!("Refresh failed: {e:#}"),
        }

        completed += 1;
        if iterations.is_some_and(|limit| completed >= limit) {
            return Ok(());
        }
    }
}
