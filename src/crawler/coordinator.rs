//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Loading the frontier snapshot from the output directory
//! - Reusing page files already on disk instead of fetching them
//! - Fetching, deduplicating and writing new pages
//! - Extracting links and persisting the frontier after each page
//! - Enforcing page, time and depth limits

use crate::config::Config;
use crate::crawler::parser::parse_html;
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::output::CrawlStats;
use crate::state::{CrawlPhase, PageOutcome, StopReason};
use crate::storage::{content_hash, FrontierStore, PageCache, QueuedUrl, SNAPSHOT_FILENAME};
use crate::url::SiteScope;
use crate::SitegrabError;
use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use url::Url;

/// Main crawler coordinator structure
///
/// The coordinator owns the frontier store exclusively; every mutation of
/// crawl state goes through it, one URL at a time.
pub struct Coordinator {
    config: Config,
    scope: SiteScope,
    frontier: FrontierStore,
    pages: PageCache,
    client: Client,
    attempts: HashMap<String, u32>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fresh` - Whether to discard the existing frontier snapshot first
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SitegrabError)` - Invalid seed, unreadable snapshot, or client failure
    pub fn new(config: Config, fresh: bool) -> Result<Self, SitegrabError> {
        let scope = SiteScope::new(&config.crawl.url)?;
        let output_dir = PathBuf::from(&config.crawl.output_dir);

        if fresh {
            let snapshot = output_dir.join(SNAPSHOT_FILENAME);
            if snapshot.exists() {
                tracing::info!("Discarding previous snapshot {}", snapshot.display());
                std::fs::remove_file(&snapshot)?;
            }
        }

        let frontier = FrontierStore::open(&output_dir, config.crawl.traversal)?;
        if !frontier.unfetched().is_empty() || !frontier.fetched().is_empty() {
            tracing::info!(
                "Resuming from snapshot: {} fetched, {} unfetched",
                frontier.fetched().len(),
                frontier.unfetched().len()
            );
        }

        if config.crawl.js {
            tracing::warn!("JavaScript rendering is not supported; pages are fetched as raw HTML");
        }

        let client = build_http_client(&config.fetch)?;

        Ok(Self {
            config,
            scope,
            frontier,
            pages: PageCache::new(output_dir),
            client,
            attempts: HashMap::new(),
        })
    }

    /// Frontier store backing this crawl
    pub fn frontier(&self) -> &FrontierStore {
        &self.frontier
    }

    /// Runs the crawl until the frontier is drained or a limit trips
    ///
    /// The seed URL is always processed first, whatever the snapshot says.
    /// Limits are checked between URLs; an in-flight fetch is bounded only by
    /// the per-request timeout.
    pub async fn run(&mut self) -> Result<CrawlStats, SitegrabError> {
        tracing::info!(
            "Starting crawl of {} into {}",
            self.scope.seed(),
            self.pages.root().display()
        );

        let mut stats = CrawlStats::new();
        let start_time = Instant::now();
        let mut phase = CrawlPhase::Seed;

        while !phase.is_terminal() {
            match phase {
                CrawlPhase::Seed => {
                    let seed = QueuedUrl {
                        url: self.scope.seed().to_string(),
                        depth: 0,
                    };
                    self.process_one(seed, &mut stats).await?;
                    phase = phase.seeded();
                }
                CrawlPhase::Running => {
                    if let Some(reason) = self.should_stop(&stats, start_time.elapsed()) {
                        phase = phase.stop(reason);
                        continue;
                    }

                    let Some(next) = self.frontier.pop_unfetched() else {
                        phase = phase.stop(StopReason::FrontierExhausted);
                        continue;
                    };

                    self.process_one(next, &mut stats).await?;

                    let processed = stats.processed();
                    if processed % 10 == 0 {
                        let elapsed = start_time.elapsed();
                        let rate = stats.network_fetches() as f64 / elapsed.as_secs_f64();
                        tracing::info!(
                            "Progress: {} URLs processed, {} fetched, {} in frontier, {:.2} pages/sec",
                            processed,
                            stats.network_fetches(),
                            self.frontier.pending(),
                            rate
                        );
                    }
                }
                CrawlPhase::Done(_) => {}
            }
        }

        // Persist 404 removals and parked URLs from the tail of the run
        self.frontier.save()?;

        stats.elapsed = start_time.elapsed();
        stats.stop_reason = phase.stop_reason();
        stats.pending = self.frontier.pending();

        tracing::info!(
            "Crawl finished ({}): {} URLs processed, {} fetched in {:?}",
            stats
                .stop_reason
                .map(|r| r.to_string())
                .unwrap_or_default(),
            stats.processed(),
            stats.network_fetches(),
            stats.elapsed
        );

        Ok(stats)
    }

    /// Returns the reason to stop, if a limit has been reached
    fn should_stop(&self, stats: &CrawlStats, elapsed: Duration) -> Option<StopReason> {
        let crawl = &self.config.crawl;

        if crawl.max_pages > 0 && stats.network_fetches() >= u64::from(crawl.max_pages) {
            return Some(StopReason::MaxPages);
        }
        if crawl.max_time > 0 && elapsed >= Duration::from_secs(crawl.max_time) {
            return Some(StopReason::MaxTime);
        }
        None
    }

    /// Processes a single URL
    ///
    /// This method:
    /// 1. Resolves content from the page cache or the network
    /// 2. Stops here if there is no content
    /// 3. Extracts links and adds in-scope ones to the frontier
    /// 4. Saves the frontier snapshot
    async fn process_one(
        &mut self,
        queued: QueuedUrl,
        stats: &mut CrawlStats,
    ) -> Result<(), SitegrabError> {
        tracing::debug!("Processing URL: {} (depth {})", queued.url, queued.depth);

        let url = match Url::parse(&queued.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Dropping malformed URL {}: {}", queued.url, e);
                self.frontier.remove_not_found(&queued.url);
                stats.record(PageOutcome::Malformed);
                return Ok(());
            }
        };

        let (outcome, content) = self.fetch_or_cache(&queued, &url, stats).await?;
        stats.record(outcome);

        let Some(content) = content else {
            return Ok(());
        };

        let parsed = parse_html(&content, &self.scope);
        if let Some(title) = &parsed.title {
            tracing::debug!("{} has title {:?}", queued.url, title);
        }

        let child_depth = queued.depth + 1;
        if self.within_depth(child_depth) {
            for link in &parsed.links {
                if self.frontier.add_discovered(link, child_depth) {
                    stats.links_discovered += 1;
                }
            }
        } else if !parsed.links.is_empty() {
            tracing::debug!(
                "Not following {} links from {}: depth limit {} reached",
                parsed.links.len(),
                queued.url,
                self.config.crawl.depth
            );
        }

        self.frontier.save()?;
        Ok(())
    }

    fn within_depth(&self, depth: u32) -> bool {
        self.config.crawl.depth == 0 || depth <= self.config.crawl.depth
    }

    /// Returns page content from disk if present, otherwise fetches it
    ///
    /// A non-empty file at the URL's mapped path short-circuits the network.
    /// Fetched pages are written only when their content hash is new.
    async fn fetch_or_cache(
        &mut self,
        queued: &QueuedUrl,
        url: &Url,
        stats: &mut CrawlStats,
    ) -> Result<(PageOutcome, Option<String>), SitegrabError> {
        let filepath = self.pages.path_for(url);

        if let Some(content) = self.pages.read(&filepath) {
            self.frontier.mark_fetched(&queued.url, None, None);
            tracing::info!(
                "{} already downloaded, read from {}",
                queued.url,
                filepath.display()
            );
            return Ok((PageOutcome::Cached, Some(content)));
        }

        match fetch_url(&self.client, &queued.url).await {
            FetchResult::Success { body, .. } => {
                let hash = content_hash(body.as_bytes());
                let filepath_str = filepath.to_string_lossy();

                let outcome = if self.frontier.mark_fetched(
                    &queued.url,
                    Some(&*filepath_str),
                    Some(hash.as_str()),
                ) {
                    self.pages.write(&filepath, &body)?;
                    PageOutcome::Fetched
                } else {
                    PageOutcome::Duplicate
                };

                tracing::info!("Successfully crawled {}", queued.url);
                Ok((outcome, Some(body)))
            }
            result if result.is_not_found() => {
                tracing::warn!("Failed to crawl {}: not found", queued.url);
                self.frontier.remove_not_found(&queued.url);
                Ok((PageOutcome::NotFound, None))
            }
            FetchResult::HttpError { status_code } => {
                self.retry_or_park(queued, &format!("status code {}", status_code), stats);
                Ok((PageOutcome::Failed, None))
            }
            FetchResult::NetworkError { error } => {
                self.retry_or_park(queued, &error, stats);
                Ok((PageOutcome::Failed, None))
            }
        }
    }

    /// Re-queues a transiently failed URL, or parks it once retries run out
    fn retry_or_park(&mut self, queued: &QueuedUrl, reason: &str, stats: &mut CrawlStats) {
        let attempts = {
            let count = self.attempts.entry(queued.url.clone()).or_insert(0);
            *count += 1;
            *count
        };
        let max_retries = self.config.fetch.max_retries;

        if attempts <= max_retries {
            tracing::warn!(
                "Failed to crawl {} ({}), retry {}/{}",
                queued.url,
                reason,
                attempts,
                max_retries
            );
            self.frontier.retry_later(queued.clone());
            stats.retries += 1;
        } else {
            tracing::warn!(
                "Failed to crawl {} ({}), keeping it for a later run",
                queued.url,
                reason
            );
            self.frontier.park(&queued.url);
            stats.parked += 1;
        }
    }
}

/// Runs a complete crawl with the given configuration
///
/// # Example
///
/// ```no_run
/// use sitegrab::config::load_config;
/// use sitegrab::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("sitegrab.toml"))?;
/// let stats = run_crawl(config, false).await?;
/// println!("fetched {} pages", stats.network_fetches());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, fresh: bool) -> Result<CrawlStats, SitegrabError> {
    let mut coordinator = Coordinator::new(config, fresh)?;
    coordinator.run().await
}
