//! Output module for crawl reporting
//!
//! This module handles:
//! - Collecting per-run crawl statistics
//! - Summarizing an output directory from its frontier snapshot

pub mod stats;

pub use stats::{
    load_statistics, print_snapshot_statistics, print_statistics, CrawlStats,
    SnapshotStatistics,
};
