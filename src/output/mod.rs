//! Output module for the markdown mirror
//!
//! This module handles:
//! - Mapping URL identities to paths under the output root
//! - Writing documents atomically
//! - Generating the per-directory `_summary.md` anchors
//! - Recording crawl statistics

mod mirror;
pub mod stats;
mod summary;

pub use mirror::{mirror_path, write_atomic, MirrorWriter, OutputDocument, SUMMARY_FILE_NAME};
pub use stats::{print_report, CrawlReport};
pub use summary::{document_title, generate_summaries, SummaryReport};
