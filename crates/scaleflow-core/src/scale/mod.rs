//! Resize configurations.
//!
//! A [`ResizeConfig`] describes one output: a bounding box, an optional target
//! format, how the source maps into the box ([`Fit`]), and whether upscaling
//! is allowed. A [`ConfigSet`] is the ordered, validated list applied to every
//! input in config-list mode.
//!
//! Keys serialize in camelCase (`maxWidth`, `withoutEnlargement`, ...) and
//! also accept snake_case, so the same record works in JSON scale attributes
//! and in `config.toml`.

mod validate;

pub use validate::{
    config_set_from_value, file_config_from_value, validate_config_set, validate_file_config,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// How the source image maps into the `maxWidth × maxHeight` box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fit {
    /// Preserve aspect ratio, cover the box, crop the overflow (centered)
    Cover,
    /// Preserve aspect ratio, fit within the box, pad to the exact box
    Contain,
    /// Ignore aspect ratio, stretch to the exact box
    Fill,
    /// Preserve aspect ratio, fit within the box
    #[default]
    Inside,
    /// Preserve aspect ratio, cover the box without cropping
    Outside,
}

impl Fit {
    pub const NAMES: [&'static str; 5] = ["cover", "contain", "fill", "inside", "outside"];

    pub fn as_str(self) -> &'static str {
        match self {
            Fit::Cover => "cover",
            Fit::Contain => "contain",
            Fit::Fill => "fill",
            Fit::Inside => "inside",
            Fit::Outside => "outside",
        }
    }
}

impl FromStr for Fit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cover" => Ok(Fit::Cover),
            "contain" => Ok(Fit::Contain),
            "fill" => Ok(Fit::Fill),
            "inside" => Ok(Fit::Inside),
            "outside" => Ok(Fit::Outside),
            other => Err(format!("unknown fit strategy: {other}")),
        }
    }
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for producing one resized output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeConfig {
    /// Bounding box width
    #[serde(default, alias = "max_width", skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,

    /// Bounding box height
    #[serde(default, alias = "max_height", skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,

    /// Target codec ("png", "jpeg", "webp", ...); source format when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Never upscale (the default)
    #[serde(
        default,
        alias = "without_enlargement",
        skip_serializing_if = "Option::is_none"
    )]
    pub without_enlargement: Option<bool>,

    /// Allow upscaling a source smaller than the box
    #[serde(
        default,
        alias = "allow_enlargement",
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_enlargement: Option<bool>,

    /// Fit strategy name; see [`Fit`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<String>,

    /// Encoder options passed through verbatim
    #[serde(default, alias = "format_options", skip_serializing_if = "Option::is_none")]
    pub format_options: Option<Map<String, Value>>,

    /// Keep source metadata (ICC profile) in the output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<bool>,

    /// Rotate according to EXIF orientation before resizing (default on)
    #[serde(default, alias = "auto_orient", skip_serializing_if = "Option::is_none")]
    pub auto_orient: Option<bool>,
}

impl ResizeConfig {
    /// A config bounded in both dimensions.
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width: Some(max_width),
            max_height: Some(max_height),
            ..Self::default()
        }
    }

    /// A config bounded only by width.
    pub fn width(max_width: u32) -> Self {
        Self {
            max_width: Some(max_width),
            ..Self::default()
        }
    }

    /// A config bounded only by height.
    pub fn height(max_height: u32) -> Self {
        Self {
            max_height: Some(max_height),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_fit(mut self, fit: Fit) -> Self {
        self.fit = Some(fit.as_str().to_string());
        self
    }

    pub fn with_enlargement(mut self, allow: bool) -> Self {
        self.allow_enlargement = Some(allow);
        self
    }

    pub fn with_format_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.format_options
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Fit strategy; unrecognized names (rejected by validation) fall back to
    /// the default.
    pub fn fit_strategy(&self) -> Fit {
        self.fit
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Upscaling happens only when explicitly allowed.
    pub fn enlargement_allowed(&self) -> bool {
        self.allow_enlargement == Some(true) || self.without_enlargement == Some(false)
    }

    pub fn preserves_metadata(&self) -> bool {
        self.metadata == Some(true)
    }

    pub fn auto_orients(&self) -> bool {
        self.auto_orient != Some(false)
    }

    /// An encoder option, if set.
    pub fn format_option(&self, key: &str) -> Option<&Value> {
        self.format_options.as_ref().and_then(|opts| opts.get(key))
    }
}

/// An ordered, validated, non-empty list of resize configs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSet(Vec<ResizeConfig>);

impl ConfigSet {
    /// Validate and wrap a list of configs.
    pub fn new(configs: Vec<ResizeConfig>) -> Result<Self, ConfigError> {
        validate_config_set(&configs)?;
        Ok(Self(configs))
    }

    /// Shape-check and validate an untyped config list.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        config_set_from_value(value).map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a validated set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResizeConfig> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ResizeConfig] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ConfigSet {
    type Item = &'a ResizeConfig;
    type IntoIter = std::slice::Iter<'a, ResizeConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
