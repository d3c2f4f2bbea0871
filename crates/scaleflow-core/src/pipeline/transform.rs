//! The streaming resize transform.
//!
//! A [`ScaleTransform`] reads [`InputItem`]s from a channel and writes one
//! [`ScaledFile`] per (input, config) pair to a bounded output channel. Errors
//! go to a separate unbounded channel so a consumer that drains outputs first
//! never stalls the transform.
//!
//! Two operating modes:
//! - **config list**: a fixed, eagerly validated [`ConfigSet`] applies to every
//!   input. The first resize failure tears the whole stream down.
//! - **per file**: each input carries its own config in `scale`, validated when
//!   the item arrives. Failures only affect that item, and outputs are renamed
//!   through a [`FileNamer`].
//!
//! Items are handled strictly one at a time, and each item's configs strictly
//! in order.

use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::channel::bounded_channel;
use super::naming::{DefaultNamer, FileNamer};
use super::resize::resize;
use crate::config::PipelineConfig;
use crate::engine::ResizeEngine;
use crate::error::{ConfigError, TransformError, TransformErrorKind};
use crate::file::{InputItem, VirtualFile};
use crate::scale::{validate_file_config, ConfigSet, ResizeConfig};
use crate::types::ScaledFile;

/// Runtime knobs for a transform.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Upper bound on a single engine call
    pub resize_timeout: Duration,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for TransformOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            resize_timeout: Duration::from_millis(config.resize_timeout_ms),
        }
    }
}

/// How a transform's stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Input closed and every item was handled
    Finished,
    /// A resize failed in config-list mode; remaining input was not read
    Aborted,
    /// The output receiver went away
    Closed,
}

enum Mode {
    Configs(ConfigSet),
    PerFile,
}

enum ItemOutcome {
    Continue,
    Abort,
    Closed,
}

/// Sequential multi-config resize transform.
pub struct ScaleTransform {
    engine: Arc<dyn ResizeEngine>,
    mode: Mode,
    namer: Option<Arc<dyn FileNamer>>,
    options: TransformOptions,
}

impl ScaleTransform {
    /// Config-list mode. Fails if `configs` is not a valid, non-empty set.
    pub fn with_configs(
        engine: Arc<dyn ResizeEngine>,
        configs: Vec<ResizeConfig>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::with_config_set(engine, ConfigSet::new(configs)?))
    }

    /// Config-list mode from an already validated set.
    pub fn with_config_set(engine: Arc<dyn ResizeEngine>, configs: ConfigSet) -> Self {
        Self {
            engine,
            mode: Mode::Configs(configs),
            namer: None,
            options: TransformOptions::default(),
        }
    }

    /// Config-list mode from untyped JSON, shape-checked before conversion.
    pub fn from_config_value(
        engine: Arc<dyn ResizeEngine>,
        value: &Value,
    ) -> Result<Self, ConfigError> {
        Ok(Self::with_config_set(engine, ConfigSet::from_value(value)?))
    }

    /// Per-file mode: each input's `scale` config drives its single output,
    /// which is renamed with [`DefaultNamer`] unless another namer is set.
    pub fn per_file(engine: Arc<dyn ResizeEngine>) -> Self {
        Self {
            engine,
            mode: Mode::PerFile,
            namer: Some(Arc::new(DefaultNamer)),
            options: TransformOptions::default(),
        }
    }

    /// Rename every output through `namer`.
    ///
    /// Config-list outputs keep the input's path unless a namer is set.
    pub fn with_file_namer(mut self, namer: impl FileNamer + 'static) -> Self {
        self.namer = Some(Arc::new(namer));
        self
    }

    pub fn with_options(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_per_file(&self) -> bool {
        matches!(self.mode, Mode::PerFile)
    }

    /// Drive the transform until input ends, a config-list resize fails, or
    /// the output receiver is dropped.
    pub async fn run(
        &self,
        mut input: mpsc::Receiver<InputItem>,
        outputs: mpsc::Sender<ScaledFile>,
        errors: mpsc::UnboundedSender<TransformError>,
    ) -> StreamEnd {
        let mut items = 0u64;
        while let Some(item) = input.recv().await {
            items += 1;
            match self.process_item(item, &outputs, &errors).await {
                ItemOutcome::Continue => {}
                ItemOutcome::Abort => {
                    error!(items, "Resize failed, aborting stream");
                    return StreamEnd::Aborted;
                }
                ItemOutcome::Closed => {
                    debug!(items, "Output receiver dropped, stopping");
                    return StreamEnd::Closed;
                }
            }
        }
        debug!(items, "Input closed");
        StreamEnd::Finished
    }

    /// Run on a new task with fresh channels.
    ///
    /// Send items into the returned sender and drop it to end the stream.
    pub fn spawn(self, buffer: usize) -> (mpsc::Sender<InputItem>, TransformHandle) {
        let pipeline = PipelineConfig {
            buffer_size: buffer.max(1),
            ..PipelineConfig::default()
        };
        let (input_tx, input_rx) = bounded_channel(&pipeline);
        let (output_tx, output_rx) = bounded_channel(&pipeline);
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move { self.run(input_rx, output_tx, error_tx).await });

        (
            input_tx,
            TransformHandle {
                outputs: output_rx,
                errors: error_rx,
                task,
            },
        )
    }

    async fn process_item(
        &self,
        item: InputItem,
        outputs: &mpsc::Sender<ScaledFile>,
        errors: &mpsc::UnboundedSender<TransformError>,
    ) -> ItemOutcome {
        let file = match item {
            InputItem::File(file) => file,
            InputItem::Unrecognized(description) => {
                report(errors, TransformErrorKind::InvalidFile(description), None);
                return ItemOutcome::Continue;
            }
        };

        if file.is_stream() {
            let kind = TransformErrorKind::StreamingUnsupported(file.path().to_path_buf());
            report(errors, kind, Some(file.report_copy()));
            return ItemOutcome::Continue;
        }
        if file.is_directory() {
            debug!(path = %file.path().display(), "Skipping directory");
            return ItemOutcome::Continue;
        }

        let configs = match self.configs_for(&file) {
            Ok(configs) => configs,
            Err(source) => {
                let kind = TransformErrorKind::Config {
                    path: file.path().to_path_buf(),
                    source,
                };
                report(errors, kind, Some(file.report_copy()));
                return ItemOutcome::Continue;
            }
        };

        for (index, config) in configs.iter().enumerate() {
            debug!(
                path = %file.path().display(),
                index,
                max_width = ?config.max_width,
                max_height = ?config.max_height,
                format = config.format.as_deref().unwrap_or("source"),
                "Resizing"
            );

            let mut scaled =
                match resize(&self.engine, &file, config, self.options.resize_timeout).await {
                    Ok(scaled) => scaled,
                    Err(source) => {
                        let kind = TransformErrorKind::Resize {
                            path: file.path().to_path_buf(),
                            index,
                            source,
                        };
                        report(errors, kind, Some(file.report_copy()));
                        return if self.is_per_file() {
                            ItemOutcome::Continue
                        } else {
                            ItemOutcome::Abort
                        };
                    }
                };

            if let Some(namer) = &self.namer {
                match namer.file_name(&scaled, config) {
                    Ok(name) => scaled.file.set_basename(&name),
                    Err(source) => {
                        let kind = TransformErrorKind::Naming {
                            path: file.path().to_path_buf(),
                            source,
                        };
                        report(errors, kind, Some(file.report_copy()));
                        return ItemOutcome::Continue;
                    }
                }
            }

            if outputs.send(scaled).await.is_err() {
                return ItemOutcome::Closed;
            }
        }

        ItemOutcome::Continue
    }

    fn configs_for<'a>(
        &'a self,
        file: &'a VirtualFile,
    ) -> Result<Cow<'a, [ResizeConfig]>, ConfigError> {
        match &self.mode {
            Mode::Configs(set) => Ok(Cow::Borrowed(set.as_slice())),
            Mode::PerFile => {
                let config = file.scale().ok_or(ConfigError::MissingScale)?;
                validate_file_config(config)?;
                Ok(Cow::Borrowed(std::slice::from_ref(config)))
            }
        }
    }
}

fn report(
    errors: &mpsc::UnboundedSender<TransformError>,
    kind: TransformErrorKind,
    file: Option<VirtualFile>,
) {
    let err = TransformError::new(kind, file);
    warn!("{err}");
    if errors.send(err).is_err() {
        debug!("Error receiver dropped");
    }
}

/// Receiving side of a spawned transform.
pub struct TransformHandle {
    pub outputs: mpsc::Receiver<ScaledFile>,
    pub errors: mpsc::UnboundedReceiver<TransformError>,
    pub task: JoinHandle<StreamEnd>,
}

/// Everything a spawned transform produced.
#[derive(Debug)]
pub struct Collected {
    pub outputs: Vec<ScaledFile>,
    pub errors: Vec<TransformError>,
    pub end: StreamEnd,
}

impl TransformHandle {
    /// Drain outputs, then errors, then wait for the task.
    pub async fn collect(mut self) -> Result<Collected, tokio::task::JoinError> {
        let mut outputs = Vec::new();
        while let Some(scaled) = self.outputs.recv().await {
            outputs.push(scaled);
        }
        let end = self.task.await?;
        let mut errors = Vec::new();
        while let Some(err) = self.errors.recv().await {
            errors.push(err);
        }
        Ok(Collected {
            outputs,
            errors,
            end,
        })
    }
}
