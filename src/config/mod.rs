//! Configuration management for embedbin

pub mod schema;

pub use schema::{CacheConfig, Config};

use crate::error::{EmbedbinError, EmbedbinResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File name looked up inside the per-user config directory
const CONFIG_FILE: &str = "config.toml";

/// Reads and writes the TOML configuration file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Use `explicit` when given, else `<config_dir>/embedbin/config.toml`
    pub fn locate(explicit: Option<PathBuf>) -> Self {
        let config_path = explicit.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("embedbin")
                .join(CONFIG_FILE)
        });
        Self { config_path }
    }

    /// Parse the config file; a missing file yields the defaults
    pub async fn load(&self) -> EmbedbinResult<Config> {
        let path = &self.config_path;
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(EmbedbinError::io(
                    format!("reading config from {}", path.display()),
                    e,
                ))
            }
        };

        toml::from_str(&content).map_err(|e| EmbedbinError::ConfigInvalid {
            path: path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write `config`, creating the parent directory first
    pub async fn save(&self, config: &Config) -> EmbedbinResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| EmbedbinError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            EmbedbinError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Wrote config to {}", self.config_path.display());
        Ok(())
    }

    /// Whether the config file is already present
    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.config_path).await.unwrap_or(false)
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}
