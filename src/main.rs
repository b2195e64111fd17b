//! Anchor-Crawl main entry point
//!
//! This is the command-line interface for the site-to-markdown mirror.

use anchor_crawl::config::{load_or_default, Config};
use anchor_crawl::crawler::crawl;
use anchor_crawl::output::{generate_summaries, print_report};
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Anchor-Crawl: mirror a website as markdown for hierarchical retrieval
///
/// Anchor-Crawl walks a single site depth-first, keeps the main content of
/// every page as markdown with images embedded, mirrors the URL hierarchy
/// on disk, and writes a `_summary.md` anchor in every directory.
#[derive(Parser, Debug)]
#[command(name = "crawl")]
#[command(version)]
#[command(about = "Mirror a website as markdown", long_about = None)]
struct Cli {
    /// URL to start crawling from; only pages on its host are followed
    #[arg(value_name = "START_URL", required_unless_present = "summarize")]
    start_url: Option<String>,

    /// Directory the markdown mirror is written to
    #[arg(value_name = "OUTPUT_DIR", required_unless_present = "summarize")]
    output_dir: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many pages
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Do not follow links deeper than this from the start URL
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Skip generating `_summary.md` anchors after the crawl
    #[arg(long)]
    no_summaries: bool,

    /// Regenerate `_summary.md` anchors for an existing tree and exit
    #[arg(long, value_name = "DIR", conflicts_with_all = ["start_url", "output_dir"])]
    summarize: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(dir) = &cli.summarize {
        return handle_summarize(dir);
    }

    let config = build_config(&cli)?;

    // Both are required unless --summarize is given
    let (Some(start_url), Some(output_dir)) = (cli.start_url, cli.output_dir) else {
        anyhow::bail!("START_URL and OUTPUT_DIR are required");
    };

    handle_crawl(&start_url, output_dir, config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("anchor_crawl=info,warn"),
            1 => EnvFilter::new("anchor_crawl=debug,info"),
            2 => EnvFilter::new("anchor_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (or defaults) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }

    let mut config = load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = Some(max_pages);
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = Some(max_depth);
    }
    if cli.no_summaries {
        config.output.summaries = false;
    }

    Ok(config)
}

/// Handles the --summarize mode: rebuilds anchors for an existing tree
fn handle_summarize(dir: &Path) -> anyhow::Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }

    let report = generate_summaries(dir)
        .with_context(|| format!("Failed to summarise {}", dir.display()))?;

    println!(
        "✓ {} summary anchors written, {} removed in {}",
        report.written,
        report.removed,
        dir.display()
    );
    if report.failed > 0 {
        anyhow::bail!("{} summary anchors could not be written", report.failed);
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    start_url: &str,
    output_dir: PathBuf,
    config: Config,
    quiet: bool,
) -> anyhow::Result<()> {
    tracing::info!("User agent: {}", config.user_agent.header_value());

    let report = match crawl(start_url, &output_dir, config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if !quiet {
        print_report(&report);
        println!("\n✓ Mirror written to: {}", output_dir.display());
    }

    Ok(())
}
