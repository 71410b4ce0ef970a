//! URL handling module for Sitegrab
//!
//! This module maps URLs to stable on-disk page paths and decides which
//! discovered links belong to the site being crawled.

mod path_map;
mod scope;
mod slug;

// Re-export main functions
pub use path_map::{map_url, PagePath, INDEX_FILENAME};
pub use scope::SiteScope;
pub use slug::slugify;
