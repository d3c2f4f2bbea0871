//! Virtual files flowing through the pipeline.
//!
//! A [`VirtualFile`] is a path plus in-memory contents, in the shape build
//! pipelines use for their stream items: a working directory, a base that
//! relative paths are computed against, and the file's own path. Contents are
//! held in [`Bytes`], so cloning a file for an error report or deriving a new
//! file from an old one never copies the payload.

use bytes::Bytes;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;

use crate::scale::ResizeConfig;

/// Contents of a virtual file.
pub enum Contents {
    /// Fully buffered contents
    Buffer(Bytes),
    /// A live reader; the pipeline rejects these
    Stream(Box<dyn AsyncRead + Send + Sync + Unpin>),
    /// No contents (directories, placeholders)
    Null,
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contents::Buffer(b) => write!(f, "Buffer({} bytes)", b.len()),
            Contents::Stream(_) => f.write_str("Stream"),
            Contents::Null => f.write_str("Null"),
        }
    }
}

impl From<Bytes> for Contents {
    fn from(bytes: Bytes) -> Self {
        Contents::Buffer(bytes)
    }
}

impl From<Vec<u8>> for Contents {
    fn from(bytes: Vec<u8>) -> Self {
        Contents::Buffer(Bytes::from(bytes))
    }
}

/// One unit of content flowing through the pipeline.
#[derive(Debug)]
pub struct VirtualFile {
    cwd: PathBuf,
    base: PathBuf,
    path: PathBuf,
    contents: Contents,
    directory: bool,
    scale: Option<ResizeConfig>,
    history: Vec<PathBuf>,
}

impl VirtualFile {
    /// Create a file at `path` with the given contents.
    ///
    /// The working directory and base both default to `.`.
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Contents>) -> Self {
        Self {
            cwd: PathBuf::from("."),
            base: PathBuf::from("."),
            path: path.into(),
            contents: contents.into(),
            directory: false,
            scale: None,
            history: Vec::new(),
        }
    }

    /// Create a directory placeholder.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            directory: true,
            ..Self::new(path, Contents::Null)
        }
    }

    /// Set the base directory relative paths are computed against.
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = base.into();
        self
    }

    /// Set the working directory.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Attach a per-file resize config.
    pub fn with_scale(mut self, scale: ResizeConfig) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn contents(&self) -> &Contents {
        &self.contents
    }

    /// The per-file resize config, if one is attached.
    pub fn scale(&self) -> Option<&ResizeConfig> {
        self.scale.as_ref()
    }

    /// Buffered contents, if the file has them.
    pub fn buffer(&self) -> Option<&Bytes> {
        match &self.contents {
            Contents::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self.contents, Contents::Buffer(_))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.contents, Contents::Stream(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self.contents, Contents::Null)
    }

    pub fn is_directory(&self) -> bool {
        self.directory && self.is_null()
    }

    /// Path relative to the base, or the full path if it lies outside it.
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }

    /// Final path component.
    pub fn basename(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Final path component without its last extension.
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|n| n.to_str())
    }

    /// Last extension, without the leading dot.
    pub fn extname(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    /// Directory containing the file.
    pub fn dirname(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Replace the final path component, keeping the directory.
    ///
    /// The previous path is appended to [`history`](Self::history).
    pub fn set_basename(&mut self, name: &str) {
        let renamed = self.dirname().join(name);
        let previous = std::mem::replace(&mut self.path, renamed);
        self.history.push(previous);
    }

    /// Earlier paths of this file, oldest first.
    pub fn history(&self) -> &[PathBuf] {
        &self.history
    }

    /// The path the file had before any rename.
    pub fn original_path(&self) -> &Path {
        self.history.first().unwrap_or(&self.path)
    }

    /// New file with the same path metadata and scale config but fresh contents.
    pub fn clone_with_contents(&self, contents: impl Into<Contents>) -> VirtualFile {
        VirtualFile {
            cwd: self.cwd.clone(),
            base: self.base.clone(),
            path: self.path.clone(),
            contents: contents.into(),
            directory: false,
            scale: self.scale.clone(),
            history: self.history.clone(),
        }
    }

    /// Copy suitable for error reports: buffered contents are shared, live
    /// streams are not carried over.
    pub(crate) fn report_copy(&self) -> VirtualFile {
        let contents = match &self.contents {
            Contents::Buffer(bytes) => Contents::Buffer(bytes.clone()),
            Contents::Stream(_) | Contents::Null => Contents::Null,
        };
        VirtualFile {
            directory: self.directory,
            ..self.clone_with_contents(contents)
        }
    }

    /// Consume the file, returning its contents.
    pub fn into_contents(self) -> Contents {
        self.contents
    }
}

/// An item delivered on the transform's input channel.
#[derive(Debug)]
pub enum InputItem {
    /// A virtual file
    File(VirtualFile),
    /// A value that does not satisfy the file capability contract,
    /// described by a label for diagnostics
    Unrecognized(String),
}

impl From<VirtualFile> for InputItem {
    fn from(file: VirtualFile) -> Self {
        InputItem::File(file)
    }
}
