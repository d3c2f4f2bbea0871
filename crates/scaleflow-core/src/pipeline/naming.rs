//! Output filename derivation.
//!
//! Names are `{stem}.{suffix}.{extension}`, e.g. `bar.xyz.500w-500h.png`.
//! The suffix lists the actual output width and height for each dimension the
//! config constrained, so two configs that only differ in format still get
//! distinct names through their extension.

use std::path::PathBuf;

use crate::error::NamingError;
use crate::scale::ResizeConfig;
use crate::types::ScaledFile;

/// Computes the file name for a resized output.
///
/// The returned string is a bare file name; the transform substitutes it into
/// the output path, keeping directory and base.
pub trait FileNamer: Send + Sync {
    fn file_name(&self, scaled: &ScaledFile, config: &ResizeConfig)
        -> Result<String, NamingError>;
}

/// The default naming scheme, see [`derive_name`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNamer;

impl FileNamer for DefaultNamer {
    fn file_name(
        &self,
        scaled: &ScaledFile,
        config: &ResizeConfig,
    ) -> Result<String, NamingError> {
        derive_name(scaled, config)
    }
}

impl<F> FileNamer for F
where
    F: Fn(&ScaledFile, &ResizeConfig) -> Result<String, NamingError> + Send + Sync,
{
    fn file_name(
        &self,
        scaled: &ScaledFile,
        config: &ResizeConfig,
    ) -> Result<String, NamingError> {
        self(scaled, config)
    }
}

/// Derive a deterministic file name for `scaled` produced by `config`.
pub fn derive_name(scaled: &ScaledFile, config: &ResizeConfig) -> Result<String, NamingError> {
    let file = &scaled.file;
    let stem = file
        .stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| NamingError::MissingStem(PathBuf::from(file.path())))?;

    let mut suffix = Vec::with_capacity(2);
    if config.max_width.is_some() {
        suffix.push(format!("{}w", scaled.info.width));
    }
    if config.max_height.is_some() {
        suffix.push(format!("{}h", scaled.info.height));
    }

    let extension = config
        .format
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .or_else(|| file.extname().filter(|e| !e.is_empty()))
        .ok_or_else(|| NamingError::MissingExtension(PathBuf::from(file.path())))?;

    let mut segments = vec![stem.to_string()];
    if !suffix.is_empty() {
        segments.push(suffix.join("-"));
    }
    segments.push(extension.to_string());
    Ok(segments.join("."))
}
