//! Configuration module for Sitegrab
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitegrab::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitegrab.toml")).unwrap();
//! println!("Crawling {} into {}", config.crawl.url, config.crawl.output_dir);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, FetchConfig, Traversal};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
