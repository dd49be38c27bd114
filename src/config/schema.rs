//! Configuration schema for embedbin
//!
//! Configuration is stored at `~/.config/embedbin/config.toml`

use crate::materialize::DEFAULT_MODE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root; binaries live in `<root>/embedbin` (default: platform temp dir)
    pub root: Option<PathBuf>,

    /// Permission bits for materialized binaries
    pub file_mode: u32,
}

impl CacheConfig {
    /// Resolve the cache root, falling back to the platform temp directory
    pub fn cache_root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: None,
            file_mode: DEFAULT_MODE,
        }
    }
}
