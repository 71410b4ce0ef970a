//! Frontier store: persisted crawl progress
//!
//! The store records which content hashes have been fetched (with the URL and
//! file that produced them) and which discovered URLs are still unfetched.
//! Both survive restarts through a JSON snapshot:
//!
//! ```json
//! {"fetched": {"<hash>": {"filepath": "...", "url": "..."}}, "unfetched": ["..."]}
//! ```
//!
//! On top of the persisted state the store keeps an in-memory work queue that
//! fixes the visiting order, and the set of URLs already settled in this run.

use crate::config::Traversal;
use crate::storage::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// Name of the snapshot file inside the output directory
pub const SNAPSHOT_FILENAME: &str = "site_metadata.json";

/// Depth assigned to URLs restored from a snapshot
const RESTORED_DEPTH: u32 = 1;

/// Where a content hash was first fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedRecord {
    pub filepath: String,
    pub url: String,
}

/// A URL waiting in the work queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    pub url: String,

    /// Link hops from the seed
    pub depth: u32,
}

#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    fetched: BTreeMap<String, FetchedRecord>,
    #[serde(default)]
    unfetched: Vec<String>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    fetched: &'a BTreeMap<String, FetchedRecord>,
    unfetched: Vec<&'a str>,
}

/// Persistent record of crawl progress
///
/// Invariants:
/// - a URL recorded as the `url` of some fetched hash is never in `unfetched`
/// - every live queue entry is in `unfetched`
#[derive(Debug)]
pub struct FrontierStore {
    path: PathBuf,
    traversal: Traversal,
    fetched: BTreeMap<String, FetchedRecord>,
    fetched_urls: HashSet<String>,
    unfetched: HashSet<String>,
    queue: VecDeque<QueuedUrl>,
    settled: HashSet<String>,
}

impl FrontierStore {
    /// Opens the snapshot inside `output_dir`
    pub fn open(output_dir: &Path, traversal: Traversal) -> StorageResult<Self> {
        Self::load(output_dir.join(SNAPSHOT_FILENAME), traversal)
    }

    /// Loads the store from `path`, starting empty if the file does not exist
    pub fn load(path: impl Into<PathBuf>, traversal: Traversal) -> StorageResult<Self> {
        let path = path.into();

        let snapshot = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| StorageError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| StorageError::Snapshot {
                path: path.clone(),
                source,
            })?
        } else {
            Snapshot::default()
        };

        let fetched_urls: HashSet<String> =
            snapshot.fetched.values().map(|r| r.url.clone()).collect();

        let mut unfetched = HashSet::new();
        let mut queue = VecDeque::new();
        for url in snapshot.unfetched {
            if fetched_urls.contains(&url) {
                continue;
            }
            if unfetched.insert(url.clone()) {
                queue.push_back(QueuedUrl {
                    url,
                    depth: RESTORED_DEPTH,
                });
            }
        }

        tracing::debug!(
            "Loaded frontier from {}: {} fetched, {} unfetched",
            path.display(),
            snapshot.fetched.len(),
            unfetched.len()
        );

        Ok(Self {
            path,
            traversal,
            fetched: snapshot.fetched,
            fetched_urls,
            unfetched,
            queue,
            settled: HashSet::new(),
        })
    }

    /// Records a newly discovered URL
    ///
    /// The URL is queued unless it is already fetched, already unfetched, or
    /// was settled earlier in this run. Returns `true` if it was queued.
    pub fn add_discovered(&mut self, url: &str, depth: u32) -> bool {
        if self.is_fetched_url(url) || self.settled.contains(url) {
            return false;
        }
        if !self.unfetched.insert(url.to_string()) {
            self.lower_queued_depth(url, depth);
            return false;
        }

        tracing::trace!("Queued {} at depth {}", url, depth);
        self.queue.push_back(QueuedUrl {
            url: url.to_string(),
            depth,
        });
        true
    }

    /// Drops a URL that returned 404; it is not retried
    pub fn remove_not_found(&mut self, url: &str) {
        self.unfetched.remove(url);
        self.settled.insert(url.to_string());
    }

    /// Marks a URL as fetched
    ///
    /// With both `filepath` and `content_hash`, the hash is recorded unless it
    /// is already known, in which case the content is a duplicate and `false`
    /// is returned: the caller must not write a file. With either argument
    /// missing the URL is only taken off the frontier (the page was read back
    /// from an existing file) and `true` is returned.
    pub fn mark_fetched(
        &mut self,
        url: &str,
        filepath: Option<&str>,
        content_hash: Option<&str>,
    ) -> bool {
        self.unfetched.remove(url);
        self.settled.insert(url.to_string());

        let (Some(filepath), Some(content_hash)) = (filepath, content_hash) else {
            return true;
        };

        if let Some(existing) = self.fetched.get(content_hash) {
            tracing::info!(
                "Content of {} ({}) already downloaded from {}, skipping",
                url,
                filepath,
                existing.url
            );
            return false;
        }

        self.fetched.insert(
            content_hash.to_string(),
            FetchedRecord {
                filepath: filepath.to_string(),
                url: url.to_string(),
            },
        );
        self.fetched_urls.insert(url.to_string());
        true
    }

    /// Removes and returns the next URL to process
    ///
    /// Breadth-first traversal takes the oldest entry, depth-first the newest.
    pub fn pop_unfetched(&mut self) -> Option<QueuedUrl> {
        loop {
            let next = match self.traversal {
                Traversal::BreadthFirst => self.queue.pop_front(),
                Traversal::DepthFirst => self.queue.pop_back(),
            }?;

            // entries settled since they were queued are stale
            if self.unfetched.remove(&next.url) {
                return Some(next);
            }
        }
    }

    /// Puts a transiently failed URL back on the frontier behind the other work
    ///
    /// A URL that is still queued, for example one restored from the snapshot,
    /// keeps its place and takes the smaller of the two depths.
    pub fn retry_later(&mut self, entry: QueuedUrl) {
        if self.is_fetched_url(&entry.url) {
            return;
        }
        if !self.unfetched.insert(entry.url.clone()) {
            self.lower_queued_depth(&entry.url, entry.depth);
            return;
        }
        match self.traversal {
            Traversal::BreadthFirst => self.queue.push_back(entry),
            Traversal::DepthFirst => self.queue.push_front(entry),
        }
    }

    /// Keeps a URL in the persisted frontier without visiting it again this run
    pub fn park(&mut self, url: &str) {
        if !self.is_fetched_url(url) {
            self.unfetched.insert(url.to_string());
        }
        self.settled.insert(url.to_string());
    }

    fn lower_queued_depth(&mut self, url: &str, depth: u32) {
        for entry in self.queue.iter_mut().filter(|e| e.url == url) {
            if depth < entry.depth {
                tracing::trace!("Lowered depth of {} to {}", url, depth);
                entry.depth = depth;
            }
        }
    }

    /// Writes the snapshot, replacing the previous one atomically
    pub fn save(&self) -> StorageResult<()> {
        let mut unfetched: Vec<&str> = self.unfetched.iter().map(String::as_str).collect();
        unfetched.sort_unstable();

        let snapshot = SnapshotRef {
            fetched: &self.fetched,
            unfetched,
        };
        let json = serde_json::to_string(&snapshot).map_err(|source| StorageError::Snapshot {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json).map_err(|source| StorageError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::trace!(
            "Saved frontier: {} fetched, {} unfetched",
            self.fetched.len(),
            self.unfetched.len()
        );
        Ok(())
    }

    /// Snapshot file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetched records keyed by content hash
    pub fn fetched(&self) -> &BTreeMap<String, FetchedRecord> {
        &self.fetched
    }

    /// Discovered URLs not yet fetched, including parked ones
    pub fn unfetched(&self) -> &HashSet<String> {
        &self.unfetched
    }

    /// Returns true if `url` produced a recorded content hash
    pub fn is_fetched_url(&self, url: &str) -> bool {
        self.fetched_urls.contains(url)
    }

    /// Number of URLs still waiting to be visited in this run
    pub fn pending(&self) -> usize {
        self.queue
            .iter()
            .filter(|entry| self.unfetched.contains(&entry.url))
            .count()
    }
}
