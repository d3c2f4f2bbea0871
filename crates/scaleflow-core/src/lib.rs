//! scaleflow core - sequential multi-size image resizing for build pipelines.
//!
//! A [`ScaleTransform`] sits inside a larger file-processing pipeline. It
//! receives [`VirtualFile`]s, resizes each one against one or more
//! [`ResizeConfig`]s in order, and emits one [`ScaledFile`] per
//! (input, config) pair. Nothing here touches the filesystem; files arrive
//! with their contents already buffered.
//!
//! ```text
//! InputItem → validate → resize × N (in order) → [rename] → ScaledFile
//!                 ↘ TransformError (error channel)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scaleflow_core::{ImageEngine, ResizeConfig, ScaleTransform, VirtualFile};
//!
//! #[tokio::main]
//! async fn main() -> scaleflow_core::Result<()> {
//!     let engine = Arc::new(ImageEngine::default());
//!     let transform = ScaleTransform::with_configs(
//!         engine,
//!         vec![ResizeConfig::new(500, 500).with_format("png")],
//!     )?;
//!
//!     let (input, handle) = transform.spawn(16);
//!     let bytes = std::fs::read("teacup.jpg")?;
//!     input.send(VirtualFile::new("teacup.jpg", bytes).into()).await.ok();
//!     drop(input);
//!
//!     let collected = handle.collect().await.expect("transform task");
//!     for scaled in &collected.outputs {
//!         println!("{}x{} {}", scaled.info.width, scaled.info.height, scaled.info.format);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod file;
pub mod output;
pub mod pipeline;
pub mod scale;
pub mod types;

pub use config::Config;
pub use engine::{ImageEngine, ResizeEngine};
pub use error::{
    ConfigError, NamingError, ResizeError, Result, ScaleError, TransformError, TransformErrorKind,
};
pub use file::{Contents, InputItem, VirtualFile};
pub use output::{OutputFormat, ReportWriter};
pub use pipeline::{
    derive_name, Collected, DefaultNamer, FileNamer, ScaleTransform, StreamEnd, TransformHandle,
    TransformOptions,
};
pub use scale::{ConfigSet, Fit, ResizeConfig};
pub use types::{ResizeInfo, ScaleRecord, ScaledFile, SourceMetadata};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
