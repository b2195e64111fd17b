//! Configuration module for Anchor-Crawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All keys are optional; an absent file means the built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use anchor_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Request timeout: {}s", config.crawler.request_timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, load_or_default, parse_config};
pub use validation::validate;
