//! The image codec and resize engine.
//!
//! The pipeline only needs one capability: given raw image bytes and a
//! [`ResizeConfig`], produce resized bytes plus a [`ResizeInfo`], or fail.
//! [`ResizeEngine`] captures that. [`ImageEngine`] is the production
//! implementation on top of the `image` crate; tests substitute a recording
//! mock.
//!
//! Engine calls are synchronous and CPU-bound. Callers in async code run them
//! on the blocking pool (see [`crate::pipeline::resize`]).

mod exif;
pub mod geometry;
mod image_engine;

pub use self::exif::{ExifReader, ExifSummary};
pub use image_engine::{format_name, ImageEngine};

use crate::error::ResizeError;
use crate::scale::ResizeConfig;
use crate::types::{ResizeInfo, SourceMetadata};

/// Encoded output of one resize call.
#[derive(Debug, Clone)]
pub struct Resized {
    pub data: Vec<u8>,
    pub info: ResizeInfo,
}

/// Decode, scale and re-encode image bytes.
///
/// Implementations must be `Send + Sync` so one engine can be shared across
/// transforms and moved onto the blocking pool.
pub trait ResizeEngine: Send + Sync {
    /// Resize `source` according to `config`.
    fn resize(&self, source: &[u8], config: &ResizeConfig) -> Result<Resized, ResizeError>;

    /// Read format, dimensions and EXIF details without resizing.
    fn read_metadata(&self, source: &[u8]) -> Result<SourceMetadata, ResizeError>;
}
