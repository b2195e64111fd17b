//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives every page through the
//! pipeline:
//! - Popping the next identity from the depth-first frontier
//! - Fetching the page and discovering its links
//! - Extracting the content region and inlining its images
//! - Converting to markdown and writing the mirrored document
//! - Generating the summary anchors once the frontier is drained

use crate::config::{self, Config};
use crate::convert::{convert, ImageInliner};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::parse_html;
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::extract::ContentExtractor;
use crate::output::{generate_summaries, CrawlReport, MirrorWriter, OutputDocument};
use crate::state::{PageOutcome, SkipReason};
use crate::url::{normalize_url, SiteScope};
use crate::{MirrorError, UrlError};
use reqwest::Client;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use url::Url;

/// Main crawler coordinator structure
///
/// One coordinator runs one crawl. All crawl state (frontier, image cache,
/// tallies) lives here, so independent crawls never interfere.
pub struct Coordinator {
    config: Config,
    client: Client,
    seed: Url,
    scope: SiteScope,
    frontier: Frontier,
    extractor: ContentExtractor,
    inliner: ImageInliner,
    writer: MirrorWriter,
    report: CrawlReport,
    cross_domain: HashSet<String>,
    last_request: Option<Instant>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `start_url` - The seed URL; it defines the crawl's site scope
    /// * `output_dir` - Root of the markdown mirror, created if missing
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(MirrorError)` - Invalid seed or config, or unusable output root
    pub fn new(
        start_url: &str,
        output_dir: impl Into<PathBuf>,
        config: Config,
    ) -> Result<Self, MirrorError> {
        config::validate(&config)?;

        let seed = normalize_url(start_url)?;
        let scope = SiteScope::from_url(&seed).ok_or(UrlError::MissingHost)?;
        let client = build_http_client(&config.crawler, &config.user_agent)?;
        let writer = MirrorWriter::create(output_dir)?;

        let frontier = Frontier::with_limits(
            seed.clone(),
            config.crawler.max_depth,
            config.crawler.max_pages,
        );
        let inliner = ImageInliner::new(client.clone(), config.output.inline_images);

        Ok(Self {
            config,
            client,
            seed,
            scope,
            frontier,
            extractor: ContentExtractor::default(),
            inliner,
            writer,
            report: CrawlReport::default(),
            cross_domain: HashSet::new(),
            last_request: None,
        })
    }

    /// Runs the crawl to completion
    ///
    /// Pages are processed one at a time until the frontier is empty or a
    /// page limit is reached. A failing page is skipped and reported; only
    /// an unreachable seed aborts the crawl.
    pub async fn run(mut self) -> Result<CrawlReport, MirrorError> {
        tracing::info!(
            "Crawling {} into {}",
            self.seed,
            self.writer.root().display()
        );

        let start_time = Instant::now();

        while let Some(entry) = self.frontier.pop() {
            self.wait_for_delay().await;

            tracing::debug!("Processing {} (depth {})", entry.url, entry.depth);
            let outcome = self.process_entry(&entry).await?;
            self.frontier.mark_visited(&entry.url);

            match &outcome {
                PageOutcome::Written(path) => {
                    tracing::info!("{} -> {}", entry.url, path.display())
                }
                PageOutcome::Skipped(reason) => {
                    tracing::warn!("Skipped {}: {}", entry.url, reason)
                }
            }
            self.report.record(&outcome);

            let visited = self.report.pages_visited();
            if visited % 10 == 0 {
                let rate = visited as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages visited, {} in frontier, {:.2} pages/sec",
                    visited,
                    self.frontier.len(),
                    rate
                );
            }
        }

        self.report.pages_remaining = self.frontier.len();
        if self.report.pages_remaining > 0 {
            tracing::info!(
                "Page limit reached with {} URLs left in the frontier",
                self.report.pages_remaining
            );
        }

        self.report.images_inlined = self.inliner.inlined_count();
        self.report.images_dropped = self.inliner.dropped_count();
        self.report.cross_domain_links = self.cross_domain.len();

        if self.config.output.summaries {
            match generate_summaries(self.writer.root()) {
                Ok(summaries) => self.report.record_summaries(&summaries),
                Err(e) => tracing::warn!("Summary pass failed: {}", e),
            }
        }

        tracing::info!(
            "Crawl completed: {} written, {} skipped in {:?}",
            self.report.pages_written,
            self.report.pages_skipped(),
            start_time.elapsed()
        );

        Ok(self.report)
    }

    /// Runs one crawl step
    ///
    /// Every failure past the fetch stage becomes a skip. The error path is
    /// reserved for the seed failing to fetch.
    async fn process_entry(&mut self, entry: &FrontierEntry) -> Result<PageOutcome, MirrorError> {
        let (final_url, body) = match fetch_url(&self.client, &entry.url).await {
            FetchResult::Success { final_url, body } => (final_url, body),
            failure => {
                let reason = failure
                    .failure_reason()
                    .unwrap_or_else(|| "unknown failure".to_string());

                if entry.url == self.seed {
                    return Err(MirrorError::SeedUnavailable {
                        url: entry.url.to_string(),
                        reason,
                    });
                }

                tracing::warn!("Failed to fetch {}: {}", entry.url, reason);
                let skip = match failure {
                    FetchResult::ContentMismatch { .. } => SkipReason::NotHtml,
                    _ => SkipReason::FetchFailed,
                };
                return Ok(PageOutcome::Skipped(skip));
            }
        };

        self.note_redirect(&entry.url, &final_url);
        self.handle_discovered_links(&body, &final_url, entry.depth);

        let Some(region) = self.extractor.extract(&body) else {
            tracing::debug!("No content region in {}", entry.url);
            return Ok(PageOutcome::Skipped(SkipReason::ExtractionEmpty));
        };

        let images = self.inliner.inline_all(&final_url, &region.images).await;
        let markdown = convert(&region, &images, &final_url);
        if markdown.is_empty() {
            return Ok(PageOutcome::Skipped(SkipReason::ConversionEmpty));
        }

        let document = OutputDocument::new(entry.url.clone(), markdown);
        match self.writer.write(&document) {
            Ok(_) => Ok(PageOutcome::Written(document.relative_path)),
            Err(e) => {
                tracing::warn!("{}", e);
                Ok(PageOutcome::Skipped(SkipReason::WriteFailed))
            }
        }
    }

    /// Marks an in-scope redirect target visited so it is not fetched again
    fn note_redirect(&mut self, requested: &Url, final_url: &Url) {
        if final_url == requested {
            return;
        }

        match normalize_url(final_url.as_str()) {
            Ok(target) if &target != requested && self.scope.contains(&target) => {
                tracing::debug!("{} redirected to {}", requested, target);
                self.frontier.mark_redirect_target(&target);
            }
            _ => {}
        }
    }

    /// Pushes a page's same-site links onto the frontier
    ///
    /// Links resolve against the URL that actually answered, so relative
    /// links on a redirected page point where the browser would take them.
    fn handle_discovered_links(&mut self, body: &str, base_url: &Url, depth: u32) {
        let parsed = parse_html(body, base_url, &self.scope);

        for url in parsed.cross_domain {
            self.cross_domain.insert(url.to_string());
        }

        let queued = self.frontier.push_discovered(parsed.links, depth + 1);
        if queued > 0 {
            tracing::debug!("Queued {} new URLs from {}", queued, base_url);
        }
    }

    /// Sleeps until the configured delay since the previous request has passed
    async fn wait_for_delay(&mut self) {
        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < delay {
                tokio::time::sleep(delay - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// Crawls a site into a markdown mirror
///
/// This is the main entry point. It will:
/// 1. Normalize the seed and fix the site scope
/// 2. Walk the site depth-first, one page at a time
/// 3. Write one markdown document per page with a usable content region
/// 4. Generate `_summary.md` anchors (unless disabled)
///
/// # Errors
///
/// Fails before crawling on an invalid seed, invalid config or unusable
/// output root, and during the crawl only if the seed cannot be fetched.
pub async fn crawl(
    start_url: &str,
    output_dir: impl Into<PathBuf>,
    config: Config,
) -> Result<CrawlReport, MirrorError> {
    Coordinator::new(start_url, output_dir, config)?.run().await
}
