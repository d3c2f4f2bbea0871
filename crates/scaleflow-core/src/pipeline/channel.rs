//! Bounded channels for backpressure between the transform and its ends.

use tokio::sync::mpsc;

use crate::config::PipelineConfig;

/// Create a bounded channel pair with the configured buffer size.
///
/// When the buffer is full the sender waits, so a slow consumer holds the
/// transform back instead of letting encoded outputs pile up in memory.
pub fn bounded_channel<T>(config: &PipelineConfig) -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(config.buffer_size.max(1))
}
