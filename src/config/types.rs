use serde::Deserialize;

/// Main configuration structure for Sitegrab
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Config {
    /// Builds a configuration for `url` with every other setting at its default
    pub fn for_site(url: impl Into<String>, output_dir: impl Into<String>) -> Self {
        Self {
            crawl: CrawlConfig {
                url: url.into(),
                output_dir: output_dir.into(),
                js: false,
                depth: default_depth(),
                max_pages: default_max_pages(),
                max_time: default_max_time(),
                traversal: Traversal::default(),
            },
            fetch: FetchConfig::default(),
        }
    }
}

/// What to crawl and when to stop
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Seed URL; also defines the same-site prefix
    pub url: String,

    /// Directory receiving page files and `site_metadata.json`
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: String,

    /// Accepted for compatibility; pages are never rendered
    #[serde(default)]
    pub js: bool,

    /// Maximum link depth from the seed (0 = unlimited)
    #[serde(default = "default_depth")]
    pub depth: u32,

    /// Maximum network fetches per run (0 = unlimited)
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Maximum run time in seconds (0 = unlimited)
    #[serde(rename = "max-time", default = "default_max_time")]
    pub max_time: u64,

    /// Order in which discovered URLs are visited
    #[serde(default)]
    pub traversal: Traversal,
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// How many times a transiently failing URL is re-queued within one run
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Frontier traversal order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Traversal {
    /// FIFO work queue
    #[default]
    BreadthFirst,
    /// LIFO work queue
    DepthFirst,
}

fn default_output_dir() -> String {
    "out".to_string()
}

fn default_depth() -> u32 {
    1
}

fn default_max_pages() -> u32 {
    100
}

fn default_max_time() -> u64 {
    60
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}
