use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::analytics::{StepFilter, TimeSeriesAggregator, TimeUnit, DEFAULT_MAX_BUCKETS};
use crate::domain::Machine;
use crate::error::{Error, Result};

pub mod loader;

pub use loader::ConfigLoader;

const ENV_UNIT: &str = "TURBO_HEALTH_UNIT";
const ENV_MAX_BUCKETS: &str = "TURBO_HEALTH_MAX_BUCKETS";
const ENV_INCLUDE_EMPTY: &str = "TURBO_HEALTH_INCLUDE_EMPTY";
const ENV_LOG_SERVER_TLENAII: &str = "TURBO_HEALTH_LOG_SERVER_TLENAII";
const ENV_LOG_SERVER_POPCORN: &str = "TURBO_HEALTH_LOG_SERVER_POPCORN";

/// Default location of `config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("net", "turbotelescope", "turbo-health")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub default_unit: TimeUnit,
    pub include_empty_buckets: bool,
    /// Upper bound on generated bucket boundaries per aggregation.
    pub max_buckets: usize,
    /// How far back `from` reaches when it is not given.
    #[serde(with = "humantime_serde")]
    pub default_lookback: Duration,
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,
    /// Default step filter; empty keeps every step.
    pub steps: Vec<String>,
    pub log_servers: LogServers,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_unit: TimeUnit::Hours,
            include_empty_buckets: false,
            max_buckets: DEFAULT_MAX_BUCKETS,
            default_lookback: Duration::from_secs(72 * 3600),
            refresh_interval: Duration::from_secs(30),
            steps: Vec::new(),
            log_servers: LogServers::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogServers {
    pub tlenaii: String,
    pub popcorn: String,
}

impl Default for LogServers {
    fn default() -> Self {
        Self {
            tlenaii: "http://tlenaii-logs.turbotelescope.net:54322".to_string(),
            popcorn: "http://popcorn-logs.turbotelescope.net:54321".to_string(),
        }
    }
}

impl LogServers {
    pub fn for_machine(&self, machine: Machine) -> &str {
        match machine {
            Machine::Tlenaii => &self.tlenaii,
            Machine::Popcorn => &self.popcorn,
        }
    }
}

impl DashboardConfig {
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup.
    pub fn merge_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(unit) = lookup(ENV_UNIT) {
            self.default_unit = unit
                .parse()
                .map_err(|e: Error| Error::Config(format!("{ENV_UNIT}: {e}")))?;
        }

        if let Some(max_buckets) = lookup(ENV_MAX_BUCKETS) {
            self.max_buckets = max_buckets
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_MAX_BUCKETS} must be a positive integer, got '{max_buckets}'")))?;
        }

        if let Some(include_empty) = lookup(ENV_INCLUDE_EMPTY) {
            self.include_empty_buckets = include_empty
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_INCLUDE_EMPTY} must be true or false, got '{include_empty}'")))?;
        }

        if let Some(server) = lookup(ENV_LOG_SERVER_TLENAII) {
            self.log_servers.tlenaii = server;
        }

        if let Some(server) = lookup(ENV_LOG_SERVER_POPCORN) {
            self.log_servers.popcorn = server;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_buckets == 0 {
            return Err(Error::Config("max_buckets must be greater than zero".to_string()));
        }
        if self.refresh_interval.is_zero() {
            return Err(Error::Config("refresh_interval must be greater than zero".to_string()));
        }
        self.step_filter()?;
        Ok(())
    }

    pub fn step_filter(&self) -> Result<StepFilter> {
        StepFilter::parse(&self.steps)
    }

    pub fn aggregator(&self) -> TimeSeriesAggregator {
        TimeSeriesAggregator::with_max_buckets(self.max_buckets)
    }
}
