//! Writing resized outputs to disk, progress and the end-of-run summary.

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use scaleflow_core::{Contents, ScaleRecord, ScaledFile};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Writes each output under `out_dir`, keeping its path relative to its base.
pub struct DiskSink {
    out_dir: PathBuf,
}

impl DiskSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Write one output and describe it for the report.
    pub async fn write(&self, scaled: ScaledFile) -> anyhow::Result<ScaleRecord> {
        let (file, info) = scaled.into_parts();
        let target = self.out_dir.join(file.relative());

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let source = file.original_path().to_path_buf();
        let data = match file.into_contents() {
            Contents::Buffer(bytes) => bytes,
            _ => anyhow::bail!("output for {} has no buffered contents", source.display()),
        };
        tokio::fs::write(&target, &data)
            .await
            .with_context(|| format!("Failed to write {}", target.display()))?;

        tracing::debug!(
            "Wrote {} ({}x{}, {} bytes)",
            target.display(),
            info.width,
            info.height,
            info.size
        );

        Ok(ScaleRecord {
            source,
            output: target,
            info,
        })
    }
}

/// Spinner-style bar; the number of outputs is not known up front.
pub fn create_progress_bar(inputs: u64) -> ProgressBar {
    let pb = ProgressBar::new(inputs);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} outputs {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Counts gathered over one run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    pub inputs: u64,
    pub written: u64,
    pub failed: u64,
    pub skipped: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// Print a formatted summary table after the run.
pub fn print_summary(stats: &RunStats, elapsed: Duration) {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        stats.written as f64 / secs
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Inputs:       {:>8}", stats.inputs);
    eprintln!("    Outputs:      {:>8}", stats.written);
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    if stats.skipped > 0 {
        eprintln!("    Skipped:      {:>8}", stats.skipped);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Read:         {:>7.1} MB", stats.bytes_in as f64 / 1_000_000.0);
    eprintln!("    Written:      {:>7.1} MB", stats.bytes_out as f64 / 1_000_000.0);
    eprintln!("    Duration:     {:>7.1}s", secs);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaleflow_core::{ResizeInfo, VirtualFile};

    fn scaled(path: &Path, base: &Path, name: &str) -> ScaledFile {
        let mut file = VirtualFile::new(path, b"out".to_vec()).with_base(base);
        file.set_basename(name);
        ScaledFile::new(
            file,
            ResizeInfo {
                format: "png".to_string(),
                width: 20,
                height: 10,
                size: 3,
            },
        )
    }

    #[tokio::test]
    async fn test_write_keeps_relative_layout() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let input = src.path().join("nested/photo.jpg");

        let sink = DiskSink::new(out.path());
        let record = sink
            .write(scaled(&input, src.path(), "photo.20w-10h.png"))
            .await
            .unwrap();

        let expected = out.path().join("nested/photo.20w-10h.png");
        assert_eq!(record.output, expected);
        assert_eq!(record.source, input);
        assert_eq!(record.info.width, 20);
        assert_eq!(std::fs::read(&expected).unwrap(), b"out");
    }

    #[tokio::test]
    async fn test_write_rejects_unbuffered_output() {
        let out = tempfile::tempdir().unwrap();
        let file = VirtualFile::directory("some/dir");
        let sink = DiskSink::new(out.path());
        let result = sink
            .write(ScaledFile::new(
                file,
                ResizeInfo {
                    format: "png".to_string(),
                    width: 1,
                    height: 1,
                    size: 0,
                },
            ))
            .await;
        assert!(result.is_err());
    }
}
