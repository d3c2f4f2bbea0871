//! The resize pipeline.
//!
//! - **resize**: one file against one config, via the engine
//! - **naming**: output filename derivation
//! - **transform**: the streaming, sequential multi-config transform
//! - **channel**: bounded channels for backpressure

pub mod channel;
pub mod naming;
pub mod resize;
pub mod transform;

pub use naming::{derive_name, DefaultNamer, FileNamer};
pub use resize::{read_metadata, resize};
pub use transform::{Collected, ScaleTransform, StreamEnd, TransformHandle, TransformOptions};
