//! Input discovery and loading.
//!
//! Inputs are files or directories. Each discovered image remembers the root
//! it was found under, which becomes the [`VirtualFile`] base so outputs keep
//! their layout relative to it.

use anyhow::Context;
use scaleflow_core::config::LimitsConfig;
use scaleflow_core::scale::file_config_from_value;
use scaleflow_core::{InputItem, ResizeConfig, VirtualFile};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use walkdir::WalkDir;

/// Extensions the image engine can decode.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "tif", "tiff", "bmp", "ico", "pnm", "tga", "qoi",
];

/// An image found on disk.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Directory the file's relative path is computed against
    pub root: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl SourceFile {
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.root).unwrap_or(&self.path)
    }
}

/// Find all supported images under the given inputs.
///
/// A file input is its own root's only member; a directory is walked
/// recursively. Results are sorted per input for deterministic ordering.
pub fn discover(inputs: &[PathBuf]) -> Vec<SourceFile> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            if is_supported(input) {
                if let Ok(meta) = std::fs::metadata(input) {
                    files.push(SourceFile {
                        path: input.clone(),
                        root: input
                            .parent()
                            .map(Path::to_path_buf)
                            .unwrap_or_default(),
                        size: meta.len(),
                    });
                }
            } else {
                tracing::warn!("Skipping unsupported file {:?}", input);
            }
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(input)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if entry_path.is_file() && is_supported(entry_path) {
                if let Ok(meta) = entry.metadata() {
                    found.push(SourceFile {
                        path: entry_path.to_path_buf(),
                        root: input.clone(),
                        size: meta.len(),
                    });
                }
            }
        }
        found.sort_by(|a, b| a.path.cmp(&b.path));
        files.extend(found);
    }

    files
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Per-file scale configs keyed by path relative to the input root.
#[derive(Debug, Default)]
pub struct ScaleMap(HashMap<PathBuf, ResizeConfig>);

impl ScaleMap {
    /// Load a JSON object of `"relative/path.jpg": { maxWidth, ... }` entries.
    ///
    /// Every entry is validated up front; the first invalid one fails the load.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scale map {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scale map {}", path.display()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> anyhow::Result<Self> {
        let entries = value
            .as_object()
            .context("scale map must be a JSON object keyed by relative path")?;

        let mut map = HashMap::with_capacity(entries.len());
        for (key, entry) in entries {
            let config = file_config_from_value(entry)
                .with_context(|| format!("Invalid scale config for \"{key}\""))?;
            map.insert(PathBuf::from(key), config);
        }
        Ok(Self(map))
    }

    pub fn get(&self, relative: &Path) -> Option<&ResizeConfig> {
        self.0.get(relative)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Counters kept while feeding the transform.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeedStats {
    pub sent: u64,
    pub skipped: u64,
    pub bytes: u64,
}

/// Read each file and send it to the transform, in order.
///
/// Files over the size limit or that cannot be read are skipped with a
/// warning. Stops early if the transform stops accepting input.
pub async fn feed(
    files: Vec<SourceFile>,
    scales: Option<ScaleMap>,
    limits: LimitsConfig,
    input: mpsc::Sender<InputItem>,
) -> FeedStats {
    let cwd = std::env::current_dir().unwrap_or_default();
    let max_bytes = limits.max_file_size_bytes();
    let mut stats = FeedStats::default();

    for source in files {
        if source.size > max_bytes {
            tracing::warn!(
                "Skipping {:?}: {} bytes exceeds limit of {} MB",
                source.path,
                source.size,
                limits.max_file_size_mb
            );
            stats.skipped += 1;
            continue;
        }

        let bytes = match tokio::fs::read(&source.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {e}", source.path);
                stats.skipped += 1;
                continue;
            }
        };

        let mut file = VirtualFile::new(&source.path, bytes)
            .with_base(&source.root)
            .with_cwd(&cwd);
        if let Some(config) = scales.as_ref().and_then(|m| m.get(source.relative())) {
            file = file.with_scale(config.clone());
        }

        stats.bytes += source.size;
        if input.send(file.into()).await.is_err() {
            tracing::debug!("Transform stopped accepting input");
            break;
        }
        stats.sent += 1;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        assert!(is_supported(Path::new("test.jpg")));
        assert!(is_supported(Path::new("test.JPG")));
        assert!(is_supported(Path::new("test.webp")));
        assert!(!is_supported(Path::new("test.txt")));
        assert!(!is_supported(Path::new("noext")));
    }

    #[test]
    fn test_discover_directory_sorted_with_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.png"), b"x").unwrap();
        std::fs::write(dir.path().join("nested/a.jpg"), b"xy").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"skip").unwrap();

        let files = discover(&[dir.path().to_path_buf()]);

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].relative(), Path::new("b.png"));
        assert_eq!(files[1].relative(), Path::new("nested/a.jpg"));
        assert_eq!(files[1].size, 2);
    }

    #[test]
    fn test_discover_single_file_uses_parent_as_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.png");
        std::fs::write(&path, b"x").unwrap();

        let files = discover(&[path]);

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative(), Path::new("one.png"));
    }

    #[test]
    fn test_scale_map_validates_entries() {
        let value = serde_json::json!({
            "a.jpg": {"maxWidth": 300},
            "sub/b.png": {"maxHeight": 80, "format": "webp"}
        });
        let map = ScaleMap::from_value(&value).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(Path::new("a.jpg")), Some(&ResizeConfig::width(300)));

        let bad = serde_json::json!({"a.jpg": {"format": "png"}});
        let err = ScaleMap::from_value(&bad).unwrap_err();
        assert!(format!("{err:#}").contains("maxWidth or maxHeight"));

        assert!(ScaleMap::from_value(&serde_json::json!([1, 2])).is_err());
    }

    #[tokio::test]
    async fn test_feed_skips_oversized_and_attaches_scale() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("small.png");
        std::fs::write(&small, b"tiny").unwrap();

        let files = vec![
            SourceFile {
                path: small.clone(),
                root: dir.path().to_path_buf(),
                size: 4,
            },
            SourceFile {
                path: dir.path().join("huge.png"),
                root: dir.path().to_path_buf(),
                size: u64::MAX,
            },
        ];
        let scales =
            ScaleMap::from_value(&serde_json::json!({"small.png": {"maxWidth": 10}})).unwrap();

        let (tx, mut rx) = mpsc::channel(4);
        let stats = feed(files, Some(scales), LimitsConfig::default(), tx).await;

        assert_eq!(stats.sent, 1);
        assert_eq!(stats.skipped, 1);
        match rx.recv().await {
            Some(InputItem::File(file)) => {
                assert_eq!(file.path(), small.as_path());
                assert_eq!(file.relative(), Path::new("small.png"));
                assert_eq!(file.scale(), Some(&ResizeConfig::width(10)));
            }
            other => panic!("unexpected item: {other:?}"),
        }
        assert!(rx.recv().await.is_none());
    }
}
