//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching for pages and images
//! - HTML parsing and link discovery
//! - The depth-first frontier and its visited set
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{crawl, Coordinator};
pub use fetcher::{
    build_http_client, fetch_bytes, fetch_url, FetchFailure, FetchResult, FetchedBytes,
};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{parse_html, ParsedPage};

pub use crate::output::CrawlReport;
