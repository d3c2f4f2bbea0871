//! CLI value types for the scale command: sizes, fit and report format.

use clap::ValueEnum;
use scaleflow_core::{Fit, OutputFormat as CoreOutputFormat, ResizeConfig};
use std::fmt;
use std::str::FromStr;

/// A bounding box given as `WxH`.
///
/// Sizes on the command line form a config list, where every entry needs
/// both dimensions. Width-only or height-only configs go through `--per-file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSpec {
    pub width: u32,
    pub height: u32,
}

impl SizeSpec {
    pub fn to_config(self) -> ResizeConfig {
        ResizeConfig::new(self.width, self.height)
    }
}

impl FromStr for SizeSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WxH, got \"{s}\""))?;

        if w.is_empty() || h.is_empty() {
            return Err(format!(
                "size \"{s}\" needs both width and height; use --per-file for single-dimension configs"
            ));
        }

        let parse = |part: &str, name: &str| -> Result<u32, String> {
            match part.parse::<u32>() {
                Ok(0) | Err(_) => Err(format!("{name} must be a positive integer, got \"{part}\"")),
                Ok(n) => Ok(n),
            }
        };

        Ok(SizeSpec {
            width: parse(w, "width")?,
            height: parse(h, "height")?,
        })
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Fit strategies selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FitArg {
    /// Crop to cover the box
    Cover,
    /// Letterbox to the exact box
    Contain,
    /// Stretch to the exact box
    Fill,
    /// Fit within the box (default)
    Inside,
    /// Cover the box without cropping
    Outside,
}

impl From<FitArg> for Fit {
    fn from(arg: FitArg) -> Self {
        match arg {
            FitArg::Cover => Fit::Cover,
            FitArg::Contain => Fit::Contain,
            FitArg::Fill => Fit::Fill,
            FitArg::Inside => Fit::Inside,
            FitArg::Outside => Fit::Outside,
        }
    }
}

/// Supported report formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<ReportFormat> for CoreOutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => CoreOutputFormat::Json,
            ReportFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}
