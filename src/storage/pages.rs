//! On-disk page files
//!
//! Pages live at the path the URL maps to under the output directory. Because
//! the mapping is deterministic, the output directory of an earlier crawl
//! doubles as a cache.

use crate::storage::{StorageError, StorageResult};
use crate::url::map_url;
use std::path::{Path, PathBuf};
use url::Url;

/// Reads and writes page files under an output directory
#[derive(Debug, Clone)]
pub struct PageCache {
    root: PathBuf,
}

impl PageCache {
    /// Creates a cache rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of the page file for `url`
    pub fn path_for(&self, url: &Url) -> PathBuf {
        map_url(url).under(&self.root)
    }

    /// Returns the cached page at `path` if it exists and is non-empty
    ///
    /// Unreadable files are treated as absent so the page gets fetched again.
    pub fn read(&self, path: &Path) -> Option<String> {
        if !path.is_file() {
            return None;
        }

        match std::fs::read(path) {
            Ok(bytes) if bytes.is_empty() => {
                tracing::debug!("Cached file {} is empty, refetching", path.display());
                None
            }
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                tracing::warn!("Failed to read cached file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Writes a page, creating parent directories as needed
    pub fn write(&self, path: &Path, content: &str) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, content).map_err(|source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Counts `.html` files below the output directory
    pub fn count_pages(&self) -> StorageResult<u64> {
        count_html_files(&self.root)
    }
}

fn count_html_files(dir: &Path) -> StorageResult<u64> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let entries = std::fs::read_dir(dir).map_err(|source| StorageError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut count = 0;
    for entry in entries {
        let path = entry
            .map_err(|source| StorageError::Read {
                path: dir.to_path_buf(),
                source,
            })?
            .path();

        if path.is_dir() {
            count += count_html_files(&path)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            count += 1;
        }
    }

    Ok(count)
}
