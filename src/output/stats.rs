//! Crawl statistics
//!
//! Tallies the outcome of every crawl step and prints the end-of-run report.

use crate::output::SummaryReport;
use crate::state::{PageOutcome, SkipReason};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages written to the mirror
    pub pages_written: usize,

    /// Skipped pages, by reason
    pub skipped: BTreeMap<SkipReason, usize>,

    /// Images embedded as data URIs
    pub images_inlined: usize,

    /// Images dropped from their documents
    pub images_dropped: usize,

    /// Distinct cross-domain links seen and not followed
    pub cross_domain_links: usize,

    /// Entries left on the frontier when a page limit stopped the crawl
    pub pages_remaining: usize,

    /// Summary anchors written
    pub summaries_written: usize,

    /// Stale summary anchors removed
    pub summaries_removed: usize,

    /// Summary anchors that could not be written or removed
    pub summaries_failed: usize,

    /// Written documents, in the order they were written
    pub written_paths: Vec<PathBuf>,
}

impl CrawlReport {
    /// Records the outcome of one crawl step
    pub fn record(&mut self, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Written(path) => {
                self.pages_written += 1;
                self.written_paths.push(path.clone());
            }
            PageOutcome::Skipped(reason) => {
                *self.skipped.entry(*reason).or_insert(0) += 1;
            }
        }
    }

    /// Records the result of the summary pass
    pub fn record_summaries(&mut self, summaries: &SummaryReport) {
        self.summaries_written = summaries.written;
        self.summaries_removed = summaries.removed;
        self.summaries_failed = summaries.failed;
    }

    /// Total skipped pages
    pub fn pages_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Pages that completed a crawl step, written or skipped
    pub fn pages_visited(&self) -> usize {
        self.pages_written + self.pages_skipped()
    }

    /// Skips recorded for one reason
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Pages:");
    println!("  Visited: {}", report.pages_visited());
    println!("  Written: {}", report.pages_written);
    println!("  Skipped: {}", report.pages_skipped());
    for reason in SkipReason::all() {
        let count = report.skipped_for(reason);
        if count > 0 {
            println!("    {}: {}", reason, count);
        }
    }
    if report.pages_remaining > 0 {
        println!("  Left in frontier: {}", report.pages_remaining);
    }
    println!();

    println!("Images:");
    println!("  Inlined: {}", report.images_inlined);
    println!("  Dropped: {}", report.images_dropped);
    println!();

    println!("Cross-domain links not followed: {}", report.cross_domain_links);
    println!(
        "Summary anchors: {} written, {} removed",
        report.summaries_written, report.summaries_removed
    );
    if report.summaries_failed > 0 {
        println!("  Failed: {}", report.summaries_failed);
    }
}
