//! The `scaleflow inspect` command: print what the engine sees in an image.

use anyhow::Context;
use clap::Args;
use scaleflow_core::pipeline::read_metadata;
use scaleflow_core::{Config, ImageEngine, ResizeEngine, VirtualFile};
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Image files to inspect
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print compact single-line JSON
    #[arg(long)]
    pub compact: bool,
}

/// Execute the inspect command.
pub async fn execute(args: InspectArgs, config: Config) -> anyhow::Result<()> {
    let engine: Arc<dyn ResizeEngine> = Arc::new(ImageEngine::new(config.limits.clone()));

    for path in &args.files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file = VirtualFile::new(path, bytes);
        let metadata = read_metadata(&engine, &file, config.resize_timeout())
            .await
            .with_context(|| format!("Failed to inspect {}", path.display()))?;

        let json = if args.compact {
            serde_json::to_string(&metadata)?
        } else {
            serde_json::to_string_pretty(&metadata)?
        };
        println!("{json}");
    }

    Ok(())
}
