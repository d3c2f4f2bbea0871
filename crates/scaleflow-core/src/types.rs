//! Core data types produced by the resize pipeline.
//!
//! A resized output is a [`ScaledFile`]: the new virtual file paired with the
//! [`ResizeInfo`] describing what the engine actually produced. The pairing is
//! explicit so callers read resize metadata from a typed field instead of
//! probing the file for it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::file::VirtualFile;

/// What the engine produced for one config.
///
/// Width and height are the real output dimensions, which differ from the
/// requested box whenever aspect ratio is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeInfo {
    /// Encoded format ("png", "jpeg", "webp", ...)
    pub format: String,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// Encoded size in bytes
    pub size: u64,
}

/// A resized output file and the descriptor of how it was produced.
#[derive(Debug)]
pub struct ScaledFile {
    pub file: VirtualFile,
    pub info: ResizeInfo,
}

impl ScaledFile {
    pub fn new(file: VirtualFile, info: ResizeInfo) -> Self {
        Self { file, info }
    }

    pub fn into_parts(self) -> (VirtualFile, ResizeInfo) {
        (self.file, self.info)
    }
}

/// Metadata read from a source image without resizing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Detected format
    pub format: String,

    /// Width in pixels, as stored (before orientation)
    pub width: u32,

    /// Height in pixels, as stored (before orientation)
    pub height: u32,

    /// Size of the encoded source in bytes
    pub size: u64,

    /// Whether the pixel format carries an alpha channel
    pub has_alpha: bool,

    /// EXIF orientation (1-8) if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<u32>,

    /// Camera manufacturer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_make: Option<String>,

    /// Camera model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_model: Option<String>,

    /// When the photo was captured, as recorded in EXIF
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,
}

/// One line of the CLI report: where an output came from and what it is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleRecord {
    /// Input file path
    pub source: PathBuf,

    /// Path the output was written to
    pub output: PathBuf,

    #[serde(flatten)]
    pub info: ResizeInfo,
}
