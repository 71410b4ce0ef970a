//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: The orchestrator state machine (seed, running, done)
//! - `StopReason`: Why a crawl reached its terminal phase
//! - `PageOutcome`: What happened to a single processed URL

mod crawl_phase;
mod page_outcome;

// Re-export main types
pub use crawl_phase::{CrawlPhase, StopReason};
pub use page_outcome::PageOutcome;
