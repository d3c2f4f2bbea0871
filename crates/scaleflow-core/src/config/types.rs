//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Pipeline settings for backpressure and per-call limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max outputs buffered between the transform and its consumer
    pub buffer_size: usize,

    /// Timeout for a single resize call in milliseconds
    pub resize_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            buffer_size: 16,
            resize_timeout_ms: 30_000,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum source file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum source image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 20_000,
        }
    }
}

impl LimitsConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Report format: "json" or "jsonl"
    pub format: String,

    /// Pretty-print JSON reports
    pub pretty: bool,

    /// Directory resized images are written to (supports `~`)
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "jsonl".to_string(),
            pretty: false,
            dir: "dist".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
