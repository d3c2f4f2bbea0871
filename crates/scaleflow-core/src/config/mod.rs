//! Configuration management for scaleflow.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::scale::ResizeConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure for scaleflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pipeline settings
    pub pipeline: PipelineConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Sizes applied when the CLI is given no `--size`
    pub sizes: Vec<ResizeConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            limits: LimitsConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            sizes: vec![ResizeConfig::new(1024, 1024)],
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/dev.scaleflow.scaleflow/config.toml
    /// - Linux: ~/.config/scaleflow/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\scaleflow\config\config.toml
    ///
    /// Falls back to ~/.scaleflow/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "scaleflow", "scaleflow")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".scaleflow").join("config.toml")
            })
    }

    /// Get the resolved output directory (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.output.dir);
        PathBuf::from(expanded.into_owned())
    }

    pub fn resize_timeout(&self) -> Duration {
        Duration::from_millis(self.pipeline.resize_timeout_ms)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
