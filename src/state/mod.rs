//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UrlState`: lifecycle of a URL identity in the frontier (queued, visited)
//! - `PageOutcome`: what a single crawl step produced (written or skipped)
//! - `SkipReason`: why a page was skipped

mod page_state;
mod url_state;

// Re-export main types
pub use page_state::{PageOutcome, SkipReason};
pub use url_state::UrlState;
