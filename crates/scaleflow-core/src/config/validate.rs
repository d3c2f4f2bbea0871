//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::scale::validate_config_set;

use super::Config;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.buffer_size must be > 0".into(),
            ));
        }
        if self.pipeline.resize_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.resize_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if !matches!(self.output.format.as_str(), "json" | "jsonl") {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be \"json\" or \"jsonl\", got \"{}\"",
                self.output.format
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
        if !self.sizes.is_empty() {
            validate_config_set(&self.sizes)?;
        }
        Ok(())
    }
}
