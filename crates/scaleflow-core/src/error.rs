//! Error types for the scaleflow resize pipeline.
//!
//! Errors are organized by component so that each failure names the stage it
//! came from: configuration, the resize operation, filename derivation, and
//! the streaming transform that reports all of them.

use std::path::PathBuf;
use thiserror::Error;

use crate::file::VirtualFile;

/// Name reported as the origin of every [`TransformError`].
pub const ORIGIN: &str = "scaleflow";

/// Top-level error type for scaleflow operations.
#[derive(Error, Debug)]
pub enum ScaleError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resize operation errors
    #[error("Resize error: {0}")]
    Resize(#[from] ResizeError),

    /// Filename derivation errors
    #[error("Naming error: {0}")]
    Naming(#[from] NamingError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors, both for the settings file and for resize configs.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A config set was given as something other than a list
    #[error("configs must be an array")]
    NotAList,

    /// A config set with no entries
    #[error("configs is empty")]
    Empty,

    /// A resize config that is not a keyed record
    #[error("{} must be an object", location(.index))]
    NotARecord { index: Option<usize> },

    /// A file reached per-file mode without a scale config
    #[error("file has no scale config")]
    MissingScale,

    /// A per-file config with neither dimension
    #[error("{} must set maxWidth or maxHeight", location(.index))]
    MissingDimensions { index: Option<usize> },

    /// A single field of a resize config failed a check
    #[error("{}.{field} {reason}", location(.index))]
    Invalid {
        /// Position in the config set; `None` for a per-file config
        index: Option<usize>,
        field: &'static str,
        reason: String,
    },
}

fn location(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!("configs[{i}]"),
        None => "scale".to_string(),
    }
}

/// Failures of the resize operation or the engine behind it.
#[derive(Error, Debug)]
pub enum ResizeError {
    /// The file has no buffered contents to decode
    #[error("file has no buffered contents")]
    NotBuffered,

    /// Image decoding failed
    #[error("decode failed: {0}")]
    Decode(String),

    /// The requested (or detected) format cannot be encoded
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Encoding the resized image failed
    #[error("encoding {format} failed: {message}")]
    Encode { format: String, message: String },

    /// Image dimensions exceed the configured limit
    #[error("image too large: {width}x{height} > {max_dim}")]
    ImageTooLarge { width: u32, height: u32, max_dim: u32 },

    /// The engine did not finish in time
    #[error("resize timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The blocking engine task panicked or was cancelled
    #[error("resize task failed: {0}")]
    Task(String),
}

/// Filename derivation errors.
#[derive(Error, Debug)]
pub enum NamingError {
    /// The output path has no file name to derive from
    #[error("no file name in {}", .0.display())]
    MissingStem(PathBuf),

    /// Neither a target format nor an original extension is available
    #[error("no format or extension for {}", .0.display())]
    MissingExtension(PathBuf),

    /// Failure reported by a custom namer
    #[error("{0}")]
    Custom(String),
}

/// What went wrong while the transform handled one input item.
#[derive(Error, Debug)]
pub enum TransformErrorKind {
    /// The item does not satisfy the file capability contract
    #[error("invalid file passed: {0}")]
    InvalidFile(String),

    /// The item's contents are a live stream rather than a buffer
    #[error("streaming files are not supported: {}", .0.display())]
    StreamingUnsupported(PathBuf),

    /// The item's own scale config is missing or malformed (per-file mode)
    #[error("invalid scale config for {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// Resizing against one config failed
    #[error("resizing {} with config #{index} failed: {source}", .path.display())]
    Resize {
        path: PathBuf,
        index: usize,
        #[source]
        source: ResizeError,
    },

    /// A produced output could not be named (per-file mode)
    #[error("naming output of {} failed: {source}", .path.display())]
    Naming {
        path: PathBuf,
        #[source]
        source: NamingError,
    },
}

/// An error reported on the transform's error channel.
///
/// Carries the component name as `origin` and, when there is one, the input
/// file that caused it.
#[derive(Error, Debug)]
#[error("[{origin}] {kind}")]
pub struct TransformError {
    pub origin: &'static str,
    pub kind: TransformErrorKind,
    pub file: Option<VirtualFile>,
}

impl TransformError {
    pub(crate) fn new(kind: TransformErrorKind, file: Option<VirtualFile>) -> Self {
        Self {
            origin: ORIGIN,
            kind,
            file,
        }
    }

    /// Whether this error came from a resize engine failure.
    pub fn is_resize(&self) -> bool {
        matches!(self.kind, TransformErrorKind::Resize { .. })
    }
}

/// Convenience type alias for scaleflow results.
pub type Result<T> = std::result::Result<T, ScaleError>;
