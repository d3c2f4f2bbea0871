//! Resize engine built on the `image` crate.
//!
//! | Step | Implementation |
//! |---|---|
//! | Detect + decode | `ImageReader::with_guessed_format`, content sniffing |
//! | Orientation | EXIF tag via `kamadak-exif`, `DynamicImage::apply_orientation` |
//! | Fit | [`geometry::plan`], `resize_exact` with `Lanczos3` |
//! | Encode | per-format encoders with `formatOptions` |
//! | Metadata | ICC profile carried over when `metadata = true` |

use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::{self, FilterType};
use image::metadata::Orientation;
use image::{ColorType, DynamicImage, GenericImageView, ImageDecoder, ImageEncoder, ImageFormat};
use serde_json::Value;
use std::borrow::Cow;
use std::io::Cursor;
use tracing::{debug, trace};

use super::exif::ExifReader;
use super::geometry::{self, Placement};
use super::{ResizeEngine, Resized};
use crate::config::LimitsConfig;
use crate::error::ResizeError;
use crate::scale::ResizeConfig;
use crate::types::{ResizeInfo, SourceMetadata};

const DEFAULT_JPEG_QUALITY: u8 = 80;
const DEFAULT_AVIF_QUALITY: u8 = 80;
const DEFAULT_AVIF_SPEED: u8 = 6;

/// Production engine with configurable limits.
#[derive(Debug, Clone, Default)]
pub struct ImageEngine {
    limits: LimitsConfig,
}

struct Decoded {
    image: DynamicImage,
    format: ImageFormat,
    icc_profile: Option<Vec<u8>>,
}

impl ImageEngine {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    fn decode(&self, source: &[u8], keep_icc: bool) -> Result<Decoded, ResizeError> {
        let reader = image::ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| ResizeError::Decode(format!("Cannot detect image format: {e}")))?;
        let format = reader
            .format()
            .ok_or_else(|| ResizeError::Decode("Unrecognized image data".to_string()))?;

        let mut decoder = reader
            .into_decoder()
            .map_err(|e| ResizeError::Decode(e.to_string()))?;

        let (width, height) = decoder.dimensions();
        self.check_dimensions(width, height)?;

        let icc_profile = if keep_icc {
            decoder.icc_profile().ok().flatten()
        } else {
            None
        };

        let image =
            DynamicImage::from_decoder(decoder).map_err(|e| ResizeError::Decode(e.to_string()))?;

        Ok(Decoded {
            image,
            format,
            icc_profile,
        })
    }

    fn check_dimensions(&self, width: u32, height: u32) -> Result<(), ResizeError> {
        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(ResizeError::ImageTooLarge {
                width,
                height,
                max_dim,
            });
        }
        Ok(())
    }
}

impl ResizeEngine for ImageEngine {
    fn resize(&self, source: &[u8], config: &ResizeConfig) -> Result<Resized, ResizeError> {
        let decoded = self.decode(source, config.preserves_metadata())?;
        let target = target_format(config.format.as_deref(), decoded.format)?;

        let mut image = decoded.image;
        if config.auto_orients() {
            if let Some(orientation) = ExifReader::orientation(source)
                .and_then(|tag| u8::try_from(tag).ok())
                .and_then(Orientation::from_exif)
            {
                trace!(?orientation, "Applying EXIF orientation");
                image.apply_orientation(orientation);
            }
        }

        let placement = geometry::plan(
            image.dimensions(),
            (config.max_width, config.max_height),
            config.fit_strategy(),
            config.enlargement_allowed(),
        );
        let (peak_width, peak_height) = placement.peak_dimensions(image.dimensions());
        self.check_dimensions(peak_width, peak_height)?;
        let image = apply_placement(image, placement);
        let (width, height) = image.dimensions();

        let icc_profile = if config.preserves_metadata() {
            decoded.icc_profile
        } else {
            None
        };
        let data = encode(&image, target, config, icc_profile)?;

        debug!(
            format = format_name(target),
            width,
            height,
            size = data.len(),
            "Encoded output"
        );

        Ok(Resized {
            info: ResizeInfo {
                format: format_name(target).to_string(),
                width,
                height,
                size: data.len() as u64,
            },
            data,
        })
    }

    fn read_metadata(&self, source: &[u8]) -> Result<SourceMetadata, ResizeError> {
        let reader = image::ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| ResizeError::Decode(format!("Cannot detect image format: {e}")))?;
        let format = reader
            .format()
            .ok_or_else(|| ResizeError::Decode("Unrecognized image data".to_string()))?;
        let decoder = reader
            .into_decoder()
            .map_err(|e| ResizeError::Decode(e.to_string()))?;
        let (width, height) = decoder.dimensions();
        let has_alpha = decoder.color_type().has_alpha();

        let exif = ExifReader::read(source).unwrap_or_default();

        Ok(SourceMetadata {
            format: format_name(format).to_string(),
            width,
            height,
            size: source.len() as u64,
            has_alpha,
            orientation: exif.orientation,
            camera_make: exif.camera_make,
            camera_model: exif.camera_model,
            captured_at: exif.captured_at,
        })
    }
}

/// Convert an ImageFormat to the name used in descriptors.
pub fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Ico => "ico",
        ImageFormat::Pnm => "pnm",
        ImageFormat::Avif => "avif",
        other => other.extensions_str().first().copied().unwrap_or("unknown"),
    }
}

/// The requested codec, or the source's when none was requested.
fn target_format(requested: Option<&str>, source: ImageFormat) -> Result<ImageFormat, ResizeError> {
    let format = match requested {
        Some(name) => ImageFormat::from_extension(name.trim().to_lowercase())
            .ok_or_else(|| ResizeError::UnsupportedFormat(name.to_string()))?,
        None => source,
    };
    if !format.writing_enabled() {
        return Err(ResizeError::UnsupportedFormat(format_name(format).to_string()));
    }
    Ok(format)
}

fn apply_placement(image: DynamicImage, placement: Placement) -> DynamicImage {
    match placement {
        Placement::Keep => image,
        Placement::Scale { width, height } => resample(image, width, height),
        Placement::ScaleCrop {
            width,
            height,
            crop_width,
            crop_height,
        } => {
            let scaled = resample(image, width, height);
            let x = (width - crop_width) / 2;
            let y = (height - crop_height) / 2;
            scaled.crop_imm(x, y, crop_width, crop_height)
        }
        Placement::ScalePad {
            width,
            height,
            canvas_width,
            canvas_height,
        } => {
            let scaled = resample(image, width, height);
            let mut canvas = DynamicImage::new_rgba8(canvas_width, canvas_height);
            let x = i64::from((canvas_width - width) / 2);
            let y = i64::from((canvas_height - height) / 2);
            imageops::overlay(&mut canvas, &scaled, x, y);
            canvas
        }
    }
}

fn resample(image: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if image.dimensions() == (width, height) {
        image
    } else {
        image.resize_exact(width, height, FilterType::Lanczos3)
    }
}

fn encode(
    image: &DynamicImage,
    format: ImageFormat,
    config: &ResizeConfig,
    icc_profile: Option<Vec<u8>>,
) -> Result<Vec<u8>, ResizeError> {
    let name = format_name(format);
    let encode_err = |e: image::ImageError| ResizeError::Encode {
        format: name.to_string(),
        message: e.to_string(),
    };
    let mut buffer = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            ignore_unknown_options(config, name, &["quality"]);
            let quality = option_u8(config, "quality", 1, 100).unwrap_or(DEFAULT_JPEG_QUALITY);
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            attach_icc(&mut encoder, icc_profile, name);
            DynamicImage::ImageRgb8(image.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(encode_err)?;
        }
        ImageFormat::Png => {
            ignore_unknown_options(config, name, &["compression", "filter"]);
            let mut encoder =
                PngEncoder::new_with_quality(&mut buffer, png_compression(config), png_filter(config));
            attach_icc(&mut encoder, icc_profile, name);
            image.write_with_encoder(encoder).map_err(encode_err)?;
        }
        ImageFormat::Avif => {
            ignore_unknown_options(config, name, &["quality", "speed"]);
            let quality = option_u8(config, "quality", 1, 100).unwrap_or(DEFAULT_AVIF_QUALITY);
            let speed = option_u8(config, "speed", 1, 10).unwrap_or(DEFAULT_AVIF_SPEED);
            let mut encoder = AvifEncoder::new_with_speed_quality(&mut buffer, speed, quality);
            attach_icc(&mut encoder, icc_profile, name);
            to_8bit(image)
                .write_with_encoder(encoder)
                .map_err(encode_err)?;
        }
        ImageFormat::WebP => {
            ignore_unknown_options(config, name, &[]);
            let mut encoder = WebPEncoder::new_lossless(&mut buffer);
            attach_icc(&mut encoder, icc_profile, name);
            to_8bit(image)
                .write_with_encoder(encoder)
                .map_err(encode_err)?;
        }
        other => {
            ignore_unknown_options(config, name, &[]);
            if icc_profile.is_some() {
                debug!(format = name, "No ICC support for format, dropping metadata");
            }
            to_8bit(image)
                .write_to(&mut Cursor::new(&mut buffer), other)
                .map_err(encode_err)?;
        }
    }

    Ok(buffer)
}

fn attach_icc<E: ImageEncoder>(encoder: &mut E, icc_profile: Option<Vec<u8>>, format: &str) {
    if let Some(profile) = icc_profile {
        if encoder.set_icc_profile(profile).is_err() {
            debug!(format, "Encoder cannot embed ICC profile, dropping metadata");
        }
    }
}

/// Collapse 16-bit and float buffers to 8 bits per channel.
fn to_8bit(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image.color() {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => Cow::Borrowed(image),
        color if color.has_alpha() => Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8())),
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}

fn ignore_unknown_options(config: &ResizeConfig, format: &str, known: &[&str]) {
    if let Some(options) = &config.format_options {
        for key in options.keys().filter(|k| !known.contains(&k.as_str())) {
            debug!(format, option = %key, "Ignoring unknown encoder option");
        }
    }
}

fn option_u8(config: &ResizeConfig, key: &str, min: u8, max: u8) -> Option<u8> {
    config
        .format_option(key)
        .and_then(Value::as_u64)
        .map(|v| v.clamp(u64::from(min), u64::from(max)) as u8)
}

/// `compression` accepts "fast" | "default" | "best" or a zlib level 0-9.
fn png_compression(config: &ResizeConfig) -> CompressionType {
    match config.format_option("compression") {
        Some(Value::String(s)) => match s.to_lowercase().as_str() {
            "fast" => CompressionType::Fast,
            "best" => CompressionType::Best,
            _ => CompressionType::Default,
        },
        Some(Value::Number(n)) => match n.as_u64() {
            Some(0..=3) => CompressionType::Fast,
            Some(7..=9) => CompressionType::Best,
            _ => CompressionType::Default,
        },
        _ => CompressionType::Default,
    }
}

fn png_filter(config: &ResizeConfig) -> PngFilter {
    match config.format_option("filter").and_then(Value::as_str) {
        Some("none") => PngFilter::NoFilter,
        Some("sub") => PngFilter::Sub,
        Some("up") => PngFilter::Up,
        Some("avg") => PngFilter::Avg,
        Some("paeth") => PngFilter::Paeth,
        _ => PngFilter::Adaptive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::Fit;

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(width, height);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_format_name() {
        assert_eq!(format_name(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_name(ImageFormat::Png), "png");
        assert_eq!(format_name(ImageFormat::WebP), "webp");
    }

    #[test]
    fn test_landscape_to_png_binds_width() {
        let engine = ImageEngine::default();
        let source = encoded(800, 600, ImageFormat::Jpeg);
        let config = ResizeConfig::new(500, 500).with_format("png");

        let out = engine.resize(&source, &config).unwrap();
        assert_eq!(out.info.format, "png");
        assert_eq!(out.info.width, 500);
        assert!(out.info.height <= 500);
        assert_eq!(out.info.size, out.data.len() as u64);
        assert_eq!(
            image::guess_format(&out.data).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn test_keeps_source_format_when_unspecified() {
        let engine = ImageEngine::default();
        let source = encoded(200, 100, ImageFormat::Png);
        let out = engine.resize(&source, &ResizeConfig::width(50)).unwrap();
        assert_eq!(out.info.format, "png");
        assert_eq!((out.info.width, out.info.height), (50, 25));
    }

    #[test]
    fn test_without_enlargement_keeps_small_source() {
        let engine = ImageEngine::default();
        let source = encoded(100, 80, ImageFormat::Png);
        let out = engine.resize(&source, &ResizeConfig::new(500, 500)).unwrap();
        assert_eq!((out.info.width, out.info.height), (100, 80));

        let out = engine
            .resize(&source, &ResizeConfig::new(500, 500).with_enlargement(true))
            .unwrap();
        assert_eq!((out.info.width, out.info.height), (500, 400));
    }

    #[test]
    fn test_cover_and_contain_hit_exact_box() {
        let engine = ImageEngine::default();
        let source = encoded(400, 200, ImageFormat::Png);

        let cover = engine
            .resize(&source, &ResizeConfig::new(100, 100).with_fit(Fit::Cover))
            .unwrap();
        assert_eq!((cover.info.width, cover.info.height), (100, 100));

        let contain = engine
            .resize(&source, &ResizeConfig::new(100, 100).with_fit(Fit::Contain))
            .unwrap();
        assert_eq!((contain.info.width, contain.info.height), (100, 100));
    }

    #[test]
    fn test_jpeg_quality_changes_size() {
        let engine = ImageEngine::default();
        let mut img = image::RgbImage::new(64, 64);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = image::Rgb([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8]);
        }
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        let source = buf.into_inner();

        let low = ResizeConfig::new(64, 64)
            .with_format("jpg")
            .with_format_option("quality", 10);
        let high = ResizeConfig::new(64, 64)
            .with_format("jpg")
            .with_format_option("quality", 95);
        let low = engine.resize(&source, &low).unwrap();
        let high = engine.resize(&source, &high).unwrap();
        assert_eq!(low.info.format, "jpeg");
        assert!(low.info.size < high.info.size);
    }

    #[test]
    fn test_unknown_format_is_unsupported() {
        let engine = ImageEngine::default();
        let source = encoded(10, 10, ImageFormat::Png);
        let err = engine
            .resize(&source, &ResizeConfig::new(5, 5).with_format("bogus"))
            .unwrap_err();
        assert!(matches!(err, ResizeError::UnsupportedFormat(f) if f == "bogus"));
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        let engine = ImageEngine::default();
        let err = engine
            .resize(b"not an image", &ResizeConfig::new(5, 5))
            .unwrap_err();
        assert!(matches!(err, ResizeError::Decode(_)));
    }

    #[test]
    fn test_rejects_oversized_source() {
        let engine = ImageEngine::new(LimitsConfig {
            max_image_dimension: 50,
            ..LimitsConfig::default()
        });
        let source = encoded(100, 10, ImageFormat::Png);
        let err = engine
            .resize(&source, &ResizeConfig::new(5, 5))
            .unwrap_err();
        assert!(matches!(
            err,
            ResizeError::ImageTooLarge {
                width: 100,
                height: 10,
                max_dim: 50
            }
        ));
    }

    #[test]
    fn test_rejects_enlargement_past_dimension_limit() {
        let engine = ImageEngine::default();
        let source = encoded(1, 1, ImageFormat::Png);
        let config = ResizeConfig::new(200_000, 200_000).with_enlargement(true);

        let err = engine.resize(&source, &config).unwrap_err();

        assert!(matches!(
            err,
            ResizeError::ImageTooLarge {
                width: 200_000,
                height: 200_000,
                max_dim: 20_000
            }
        ));
    }

    #[test]
    fn test_contain_pads_small_source_to_box() {
        let engine = ImageEngine::default();
        let source = encoded(100, 80, ImageFormat::Png);
        let out = engine
            .resize(&source, &ResizeConfig::new(500, 500).with_fit(Fit::Contain))
            .unwrap();
        assert_eq!((out.info.width, out.info.height), (500, 500));
    }

    #[test]
    fn test_read_metadata() {
        let engine = ImageEngine::default();
        let source = encoded(120, 90, ImageFormat::Png);
        let meta = engine.read_metadata(&source).unwrap();
        assert_eq!(meta.format, "png");
        assert_eq!((meta.width, meta.height), (120, 90));
        assert_eq!(meta.size, source.len() as u64);
        assert!(!meta.has_alpha);
        assert_eq!(meta.orientation, None);
    }
}
