//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with per-request timeouts
//! - HTML parsing and same-site link extraction
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use parser::{parse_html, ParsedPage};

use crate::config::Config;
use crate::output::CrawlStats;
use crate::SitegrabError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Load the frontier snapshot from the output directory, if any
/// 2. Build the HTTP client
/// 3. Process the seed URL, then drain the frontier
/// 4. Stop when the frontier is empty or a page or time limit is reached
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl finished; the stats say why it stopped
/// * `Err(SitegrabError)` - Crawl failed
pub async fn crawl(config: Config) -> Result<CrawlStats, SitegrabError> {
    run_crawl(config, false).await
}
