//! scaleflow CLI - resize images to several sizes and formats in one pass.
//!
//! Every input image is resized against an ordered list of size
//! configurations; each output is written under the output directory with the
//! size in its file name, and a JSON report describes what was produced.
//!
//! # Usage
//!
//! ```bash
//! # Two sizes of every image in a directory
//! scaleflow scale ./photos -s 1200x1200 -s 400x400 --format webp -d dist/img
//!
//! # Per-image configs from a JSON map
//! scaleflow scale ./photos --per-file scales.json
//!
//! # What the engine sees in a file
//! scaleflow inspect teacup.jpg
//!
//! # View configuration
//! scaleflow config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// scaleflow - resize images to several sizes and formats in one pass.
#[derive(Parser, Debug)]
#[command(name = "scaleflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the platform default
    #[arg(long, global = true, env = "SCALEFLOW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resize images against one or more size configurations
    Scale(cli::scale::ScaleArgs),

    /// Print format, dimensions and EXIF details of images
    Inspect(cli::inspect::InspectArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(scaleflow_core::Config::default_path);

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let loaded = if config_path.exists() {
        scaleflow_core::Config::load_from(&config_path)
    } else {
        Ok(scaleflow_core::Config::default())
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config from {}: {e}\n  \
                 Using default configuration. Check your config file with `scaleflow config path`.",
                config_path.display()
            );
            scaleflow_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("scaleflow v{}", scaleflow_core::VERSION);

    match cli.command {
        Commands::Scale(args) => cli::scale::execute(args, config).await,
        Commands::Inspect(args) => cli::inspect::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, config_path).await,
    }
}
