//! The scale report: one [`ScaleRecord`] per written image.
//!
//! JSON Lines reports are written as records arrive. JSON reports are a
//! single array, so records are held until [`ReportWriter::finish`].

use serde::Serialize;
use std::io::Write;

use crate::error::Result;
use crate::types::ScaleRecord;

/// Report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }

    /// Whether records can be written as they arrive.
    pub fn is_streaming(self) -> bool {
        self == Self::JsonLines
    }
}

/// Writes scale records in the chosen format.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    pending: Vec<ScaleRecord>,
    records: usize,
    bytes: u64,
}

impl<W: Write> ReportWriter<W> {
    /// `pretty` only affects JSON; JSONL is always one compact object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            pending: Vec::new(),
            records: 0,
            bytes: 0,
        }
    }

    /// Add one record, writing it immediately when streaming.
    pub fn record(&mut self, record: ScaleRecord) -> Result<()> {
        if self.format == OutputFormat::JsonLines {
            serde_json::to_writer(&mut self.writer, &record)?;
            writeln!(self.writer)?;
        }
        self.records += 1;
        self.bytes += record.info.size;
        if self.format == OutputFormat::Json {
            self.pending.push(record);
        }
        Ok(())
    }

    /// Records accepted so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Sum of the output sizes of all accepted records.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Write anything held back, flush, and return the inner writer.
    ///
    /// A JSON report with no records is written as `[]`.
    pub fn finish(mut self) -> Result<W> {
        if self.format == OutputFormat::Json {
            write_json(&mut self.writer, &self.pending, self.pretty)?;
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(
    writer: &mut W,
    value: &T,
    pretty: bool,
) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(writer, value)?;
    } else {
        serde_json::to_writer(writer, value)?;
    }
    Ok(())
}
