//! The `scaleflow scale` command: resize images to one or more sizes.
//!
//! Files are discovered, read and fed into a [`ScaleTransform`] in order.
//! Outputs are written under the output directory as they arrive and each
//! one gets a report record.

mod sink;
mod source;
pub mod types;

use clap::Args;
use scaleflow_core::{
    Config, DefaultNamer, Fit, ImageEngine, OutputFormat, ReportWriter, ResizeConfig,
    ResizeEngine, ScaleTransform, StreamEnd,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use sink::{create_progress_bar, print_summary, DiskSink, RunStats};
use source::{discover, feed, ScaleMap};
use types::{FitArg, ReportFormat, SizeSpec};

/// Arguments for the `scale` command.
#[derive(Args, Debug)]
pub struct ScaleArgs {
    /// Input image files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Target box as WxH; repeat for several outputs per image
    #[arg(short, long = "size", value_name = "SIZE")]
    pub sizes: Vec<SizeSpec>,

    /// Output codec for every size (defaults to the source format)
    #[arg(short, long)]
    pub format: Option<String>,

    /// How the image maps into the size box
    #[arg(long, value_enum)]
    pub fit: Option<FitArg>,

    /// Allow upscaling images smaller than the box
    #[arg(long)]
    pub allow_enlargement: bool,

    /// Encoder quality (1-100) for codecs that support it
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Keep the source color profile in outputs
    #[arg(long)]
    pub keep_metadata: bool,

    /// JSON file mapping paths relative to the input root to their own scale config
    #[arg(long, value_name = "FILE", conflicts_with = "sizes")]
    pub per_file: Option<PathBuf>,

    /// Directory to write resized images to (overrides config)
    #[arg(short = 'd', long)]
    pub out_dir: Option<PathBuf>,

    /// Report file path (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format (overrides config)
    #[arg(long, value_enum)]
    pub report_format: Option<ReportFormat>,

    /// Hide the progress bar and summary
    #[arg(long)]
    pub quiet: bool,
}

impl ScaleArgs {
    /// Resolve the config list for list mode, applying command-line overrides.
    fn configs(&self, config: &Config) -> Vec<ResizeConfig> {
        let base: Vec<ResizeConfig> = if self.sizes.is_empty() {
            config.sizes.clone()
        } else {
            self.sizes.iter().map(|s| s.to_config()).collect()
        };

        base.into_iter()
            .map(|mut resize| {
                if let Some(format) = &self.format {
                    resize.format = Some(format.to_lowercase());
                }
                if let Some(fit) = self.fit {
                    resize = resize.with_fit(Fit::from(fit));
                }
                if self.allow_enlargement {
                    resize = resize.with_enlargement(true);
                }
                if let Some(quality) = self.quality {
                    resize = resize.with_format_option("quality", quality);
                }
                if self.keep_metadata {
                    resize.metadata = Some(true);
                }
                resize
            })
            .collect()
    }

    fn report_format(&self, config: &Config) -> OutputFormat {
        match self.report_format {
            Some(format) => format.into(),
            None => OutputFormat::parse(&config.output.format).unwrap_or(OutputFormat::JsonLines),
        }
    }

    fn out_dir(&self, config: &Config) -> PathBuf {
        match &self.out_dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).into_owned()),
            None => config.output_dir(),
        }
    }
}

/// Execute the scale command.
pub async fn execute(args: ScaleArgs, config: Config) -> anyhow::Result<()> {
    let files = discover(&args.inputs);
    if files.is_empty() {
        anyhow::bail!("No supported images found in {:?}", args.inputs);
    }

    let engine: Arc<dyn ResizeEngine> = Arc::new(ImageEngine::new(config.limits.clone()));

    let (transform, scales, per_input) = match &args.per_file {
        Some(path) => {
            let scales = ScaleMap::load(path)?;
            tracing::info!("Loaded {} per-file scale configs", scales.len());
            (ScaleTransform::per_file(engine), Some(scales), 1)
        }
        None => {
            let configs = args.configs(&config);
            let count = configs.len() as u64;
            let transform =
                ScaleTransform::with_configs(engine, configs)?.with_file_namer(DefaultNamer);
            (transform, None, count)
        }
    };
    let transform = transform.with_options((&config.pipeline).into());

    let sink = DiskSink::new(args.out_dir(&config));
    let format = args.report_format(&config);
    let report: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = ReportWriter::new(report, format, config.output.pretty);

    tracing::info!(
        "Scaling {} images into {}",
        files.len(),
        sink.out_dir().display()
    );

    let mut stats = RunStats {
        inputs: files.len() as u64,
        ..RunStats::default()
    };
    let pb = if args.quiet {
        indicatif::ProgressBar::hidden()
    } else {
        create_progress_bar(stats.inputs * per_input)
    };

    let start = Instant::now();
    let (input, mut handle) = transform.spawn(config.pipeline.buffer_size);
    let feeder = tokio::spawn(feed(files, scales, config.limits.clone(), input));

    loop {
        tokio::select! {
            Some(scaled) = handle.outputs.recv() => {
                match sink.write(scaled).await {
                    Ok(record) => {
                        pb.inc(1);
                        pb.set_message(
                            record
                                .output
                                .file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_default(),
                        );
                        writer.record(record)?;
                    }
                    Err(e) => {
                        tracing::error!("{e:#}");
                        stats.failed += 1;
                    }
                }
            }
            Some(err) = handle.errors.recv() => {
                stats.failed += 1;
                if err.is_resize() {
                    pb.inc(1);
                }
            }
            else => break,
        }
    }

    let end = handle.task.await?;
    let fed = feeder.await?;
    stats.skipped = fed.skipped;
    stats.bytes_in = fed.bytes;

    stats.written = writer.records() as u64;
    stats.bytes_out = writer.bytes();
    writer.finish()?;
    pb.finish_and_clear();

    if !args.quiet {
        print_summary(&stats, start.elapsed());
    }

    match end {
        StreamEnd::Aborted => anyhow::bail!(
            "Stopped after a resize failure; {} of {} inputs were sent",
            fed.sent,
            stats.inputs
        ),
        _ if stats.failed > 0 => anyhow::bail!("{} outputs failed", stats.failed),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ScaleArgs,
    }

    fn parse(argv: &[&str]) -> ScaleArgs {
        let mut full = vec!["scale"];
        full.extend_from_slice(argv);
        TestCli::parse_from(full).args
    }

    #[test]
    fn test_sizes_and_overrides_build_configs() {
        let args = parse(&[
            "photos",
            "-s",
            "500x500",
            "-s",
            "300x120",
            "--format",
            "PNG",
            "--fit",
            "cover",
            "--quality",
            "70",
            "--keep-metadata",
        ]);
        let configs = args.configs(&Config::default());

        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].max_width, Some(500));
        assert_eq!(configs[1].max_width, Some(300));
        assert_eq!(configs[1].max_height, Some(120));
        for config in &configs {
            assert_eq!(config.format.as_deref(), Some("png"));
            assert_eq!(config.fit_strategy(), Fit::Cover);
            assert_eq!(config.format_option("quality"), Some(&serde_json::json!(70)));
            assert!(config.preserves_metadata());
            assert!(!config.enlargement_allowed());
        }
    }

    #[test]
    fn test_config_sizes_used_without_size_flags() {
        let args = parse(&["photos", "--allow-enlargement"]);
        let configs = args.configs(&Config::default());
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].max_width, Some(1024));
        assert!(configs[0].enlargement_allowed());
    }

    #[test]
    fn test_single_dimension_size_rejected_at_parse() {
        let err = TestCli::try_parse_from(["scale", "photos", "-s", "1200x"])
            .err()
            .unwrap();
        assert!(err.to_string().contains("--per-file"), "{err}");
    }

    #[test]
    fn test_cli_sizes_build_a_valid_transform() {
        let args = parse(&["photos", "-s", "1200x1200", "-s", "400x400"]);
        let engine: Arc<dyn ResizeEngine> = Arc::new(ImageEngine::default());
        assert!(ScaleTransform::with_configs(engine, args.configs(&Config::default())).is_ok());
    }

    #[test]
    fn test_per_file_conflicts_with_sizes() {
        let result = TestCli::try_parse_from(["scale", "a.jpg", "--per-file", "s.json", "-s", "10x10"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_report_format_falls_back_to_config() {
        let args = parse(&["a.jpg"]);
        let mut config = Config::default();
        config.output.format = "json".to_string();
        assert_eq!(args.report_format(&config), OutputFormat::Json);

        let args = parse(&["a.jpg", "--report-format", "jsonl"]);
        assert_eq!(args.report_format(&config), OutputFormat::JsonLines);
    }

    #[tokio::test]
    async fn test_execute_writes_outputs() {
        use image::{DynamicImage, ImageFormat};

        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let report = src.path().join("report.jsonl");
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::new_rgb8(200, 100)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        std::fs::write(src.path().join("wide.png"), bytes.into_inner()).unwrap();

        let args = parse(&[
            src.path().join("wide.png").to_str().unwrap(),
            "-s",
            "100x100",
            "-s",
            "50x50",
            "-d",
            out.path().to_str().unwrap(),
            "-o",
            report.to_str().unwrap(),
            "--quiet",
        ]);
        execute(args, Config::default()).await.unwrap();

        assert!(out.path().join("wide.100w-50h.png").exists());
        assert!(out.path().join("wide.50w-25h.png").exists());
        let lines = std::fs::read_to_string(&report).unwrap();
        assert_eq!(lines.lines().count(), 2);
        assert!(lines.contains("\"width\":100"));
    }
}
