//! Storage module for persisting crawl progress and pages
//!
//! This module handles everything the crawler keeps on disk:
//! - The frontier snapshot (`site_metadata.json`) recording fetched content
//!   hashes and still-unfetched URLs
//! - Page files, one per distinct content hash, at URL-derived paths
//! - The content hash used as the deduplication key

mod frontier;
mod pages;

pub use frontier::{FetchedRecord, FrontierStore, QueuedUrl, SNAPSHOT_FILENAME};
pub use pages::PageCache;

use sha2::{Digest, Sha256};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed snapshot {}: {source}", .path.display())]
    Snapshot {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Computes the deduplication key for page content
///
/// Returns the hex-encoded SHA-256 digest of `content`.
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
