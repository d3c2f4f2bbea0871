//! EXIF reading from in-memory image bytes.

use exif::{In, Reader, Tag, Value};
use std::io::Cursor;

/// The EXIF fields the engine cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifSummary {
    pub orientation: Option<u32>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub captured_at: Option<String>,
}

/// Reads EXIF metadata from encoded image bytes.
pub struct ExifReader;

impl ExifReader {
    /// Extract EXIF data from encoded image bytes.
    ///
    /// Returns `None` if the image has no EXIF block or it cannot be parsed.
    /// Partial data is returned as-is.
    pub fn read(source: &[u8]) -> Option<ExifSummary> {
        let exif = Reader::new()
            .read_from_container(&mut Cursor::new(source))
            .ok()?;

        Some(ExifSummary {
            orientation: Self::get_u32(&exif, Tag::Orientation),
            camera_make: Self::get_string(&exif, Tag::Make),
            camera_model: Self::get_string(&exif, Tag::Model),
            captured_at: Self::get_datetime(&exif),
        })
    }

    /// Orientation tag only (1-8), if present.
    pub fn orientation(source: &[u8]) -> Option<u32> {
        Self::read(source).and_then(|summary| summary.orientation)
    }

    fn get_string(exif: &exif::Exif, tag: Tag) -> Option<String> {
        exif.get_field(tag, In::PRIMARY).map(|f| {
            let s = f.display_value().to_string();
            s.trim_matches('"').to_string()
        })
    }

    fn get_u32(exif: &exif::Exif, tag: Tag) -> Option<u32> {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| match &f.value {
                Value::Short(v) => v.first().map(|&x| x as u32),
                Value::Long(v) => v.first().copied(),
                _ => None,
            })
    }

    /// Prefers DateTimeOriginal over DateTime.
    fn get_datetime(exif: &exif::Exif) -> Option<String> {
        exif.get_field(Tag::DateTimeOriginal, In::PRIMARY)
            .or_else(|| exif.get_field(Tag::DateTime, In::PRIMARY))
            .map(|f| {
                let s = f.display_value().to_string();
                s.trim_matches('"').to_string()
            })
    }
}
