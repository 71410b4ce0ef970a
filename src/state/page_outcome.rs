/// Page outcome definitions for per-URL crawl results
///
/// This module defines what can happen to a single URL when the crawler processes it.
use std::fmt;

/// Represents the result of processing one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    // ===== Content Available =====
    /// Page was fetched from the network and written to disk
    Fetched,

    /// Page was read back from an existing file; no request was made
    Cached,

    /// Page was fetched but its content matched an already stored page
    Duplicate,

    // ===== No Content =====
    /// Server answered 404; the URL is dropped for good
    NotFound,

    /// Non-200 status or network error; the URL may be retried
    Failed,

    /// URL could not be parsed; dropped without a request
    Malformed,
}

impl PageOutcome {
    /// Returns true if a network request returned the page body
    pub fn is_network_fetch(&self) -> bool {
        matches!(self, Self::Fetched | Self::Duplicate)
    }

    /// Short lowercase label used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetched => "fetched",
            Self::Cached => "cached",
            Self::Duplicate => "duplicate",
            Self::NotFound => "not_found",
            Self::Failed => "failed",
            Self::Malformed => "malformed",
        }
    }

    /// Returns all possible outcomes
    pub fn all() -> [Self; 6] {
        [
            Self::Fetched,
            Self::Cached,
            Self::Duplicate,
            Self::NotFound,
            Self::Failed,
            Self::Malformed,
        ]
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
