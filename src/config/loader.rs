use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::{default_config_path, DashboardConfig};
use crate::error::Result;

/// Resolves and reads the dashboard configuration.
///
/// An explicitly requested file must exist. The default file is optional.
pub struct ConfigLoader {
    explicit: Option<PathBuf>,
    default_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            default_path: default_config_path(),
        }
    }

    /// Use `path` instead of the platform config directory as the optional
    /// fallback.
    pub fn with_default_path(mut self, path: Option<PathBuf>) -> Self {
        self.default_path = path;
        self
    }

    pub async fn load(&self) -> Result<DashboardConfig> {
        let mut config = match (&self.explicit, &self.default_path) {
            (Some(path), _) => Self::read(path).await?,
            (None, Some(path)) if fs::try_exists(path).await.unwrap_or(false) => Self::read(path).await?,
            _ => {
                debug!("No configuration file found, using defaults");
                DashboardConfig::default()
            }
        };

        config.merge_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    async fn read(path: &Path) -> Result<DashboardConfig> {
        let content = fs::read_to_string(path).await?;
        let config: DashboardConfig = toml::from_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
