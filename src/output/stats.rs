//! Crawl statistics
//!
//! This module collects per-run counters while the crawler works, and
//! summarizes an existing output directory from its snapshot.

use crate::config::Traversal;
use crate::state::{PageOutcome, StopReason};
use crate::storage::{FrontierStore, PageCache, StorageResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Counters for a single crawl run
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,

    /// Count of processed URLs by outcome
    pub outcomes: HashMap<PageOutcome, u64>,

    /// Transient failures put back on the frontier
    pub retries: u64,

    /// URLs kept for a future run after exhausting their retries
    pub parked: u64,

    /// In-scope links newly added to the frontier
    pub links_discovered: u64,

    /// URLs still queued when the run ended
    pub pending: usize,

    /// Why the run ended
    pub stop_reason: Option<StopReason>,
}

impl CrawlStats {
    /// Creates empty statistics starting now
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
            outcomes: HashMap::new(),
            retries: 0,
            parked: 0,
            links_discovered: 0,
            pending: 0,
            stop_reason: None,
        }
    }

    /// Records the outcome of one processed URL
    pub fn record(&mut self, outcome: PageOutcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    /// Number of URLs that ended with `outcome`
    pub fn count(&self, outcome: PageOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Number of successful network fetches, duplicates included
    pub fn network_fetches(&self) -> u64 {
        PageOutcome::all()
            .iter()
            .filter(|o| o.is_network_fetch())
            .map(|o| self.count(*o))
            .sum()
    }

    /// Total processed URLs
    pub fn processed(&self) -> u64 {
        self.outcomes.values().sum()
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of an output directory's persisted state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStatistics {
    /// Distinct content hashes recorded as fetched
    pub fetched: u64,

    /// URLs discovered but not yet fetched
    pub unfetched: u64,

    /// `.html` files present under the output directory
    pub pages_on_disk: u64,
}

/// Loads statistics for an output directory
///
/// # Arguments
///
/// * `output_dir` - Directory holding `site_metadata.json` and the page files
///
/// # Returns
///
/// * `Ok(SnapshotStatistics)` - Counts read from the snapshot and the directory
/// * `Err(StorageError)` - The snapshot or directory could not be read
pub fn load_statistics(output_dir: &Path) -> StorageResult<SnapshotStatistics> {
    let frontier = FrontierStore::open(output_dir, Traversal::default())?;
    let pages = PageCache::new(output_dir);

    Ok(SnapshotStatistics {
        fetched: frontier.fetched().len() as u64,
        unfetched: frontier.unfetched().len() as u64,
        pages_on_disk: pages.count_pages()?,
    })
}

/// Prints run statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    println!("  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    if let Some(reason) = stats.stop_reason {
        println!("  Stopped: {}", reason);
    }
    println!();

    println!("Pages by Outcome:");
    let processed = stats.processed();
    for outcome in PageOutcome::all() {
        let count = stats.count(outcome);
        if count == 0 {
            continue;
        }
        let percentage = (count as f64 / processed as f64) * 100.0;
        println!("  {}: {} ({:.1}%)", outcome, count, percentage);
    }
    println!();

    println!("Frontier:");
    println!("  Links discovered: {}", stats.links_discovered);
    println!("  Retries: {}", stats.retries);
    println!("  Parked for next run: {}", stats.parked);
    println!("  Still queued: {}", stats.pending);
    println!();

    let rate = if stats.elapsed.as_secs_f64() > 0.0 {
        stats.network_fetches() as f64 / stats.elapsed.as_secs_f64()
    } else {
        0.0
    };
    println!(
        "Network fetches: {} ({:.2} pages/sec)",
        stats.network_fetches(),
        rate
    );
}

/// Prints output directory statistics to stdout
pub fn print_snapshot_statistics(stats: &SnapshotStatistics) {
    println!("=== Snapshot Statistics ===\n");
    println!("  Fetched content hashes: {}", stats.fetched);
    println!("  Unfetched URLs: {}", stats.unfetched);
    println!("  Page files on disk: {}", stats.pages_on_disk);
}
