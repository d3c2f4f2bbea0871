//! The resize operation: one file, one config, one output.

use bytes::Bytes;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::trace;

use crate::engine::ResizeEngine;
use crate::error::ResizeError;
use crate::file::VirtualFile;
use crate::scale::ResizeConfig;
use crate::types::{ScaledFile, SourceMetadata};

/// Resize `file` against `config`.
///
/// The engine call runs on the blocking pool under `limit`. On success the
/// output is a clone of `file` carrying the encoded bytes, paired with the
/// engine's descriptor. `file` itself is never modified.
pub async fn resize(
    engine: &Arc<dyn ResizeEngine>,
    file: &VirtualFile,
    config: &ResizeConfig,
    limit: Duration,
) -> Result<ScaledFile, ResizeError> {
    let source = file.buffer().cloned().ok_or(ResizeError::NotBuffered)?;
    let engine = Arc::clone(engine);
    let config = config.clone();
    let start = Instant::now();

    let result = timeout(
        limit,
        tokio::task::spawn_blocking(move || engine.resize(&source, &config)),
    )
    .await;

    match result {
        Ok(Ok(Ok(resized))) => {
            trace!(
                path = %file.path().display(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Resize complete"
            );
            let output = file.clone_with_contents(Bytes::from(resized.data));
            Ok(ScaledFile::new(output, resized.info))
        }
        Ok(Ok(Err(e))) => Err(e),
        Ok(Err(e)) => Err(ResizeError::Task(e.to_string())),
        Err(_) => Err(ResizeError::Timeout {
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}

/// Read source metadata for `file` without resizing it.
pub async fn read_metadata(
    engine: &Arc<dyn ResizeEngine>,
    file: &VirtualFile,
    limit: Duration,
) -> Result<SourceMetadata, ResizeError> {
    let source = file.buffer().cloned().ok_or(ResizeError::NotBuffered)?;
    let engine = Arc::clone(engine);

    match timeout(
        limit,
        tokio::task::spawn_blocking(move || engine.read_metadata(&source)),
    )
    .await
    {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(ResizeError::Task(e.to_string())),
        Err(_) => Err(ResizeError::Timeout {
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}
