//! Content extraction
//!
//! Locates the content region of a page by trying an ordered list of
//! [`RegionStrategy`] values (main, then article, then body; first usable match
//! wins) and collects the images found strictly inside that region.
//!
//! The region is returned as owned markup so the parsed document does not have
//! to outlive the extraction step.

mod strategy;

pub use strategy::{default_strategies, is_usable, LandmarkStrategy, RegionStrategy};

use scraper::{Html, Selector};

/// An image reference found inside a content region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Raw `src` attribute, unresolved
    pub src: String,

    /// `alt` text, if any
    pub alt: Option<String>,
}

/// The selected content region of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRegion {
    /// Name of the strategy that selected the region
    pub strategy: String,

    /// Outer HTML of the region element
    pub html: String,

    /// Images inside the region, in document order
    pub images: Vec<ImageRef>,
}

/// Content extractor holding its fallback strategies
pub struct ContentExtractor {
    strategies: Vec<Box<dyn RegionStrategy>>,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::with_strategies(default_strategies())
    }
}

impl ContentExtractor {
    /// Creates an extractor that tries `strategies` in order
    pub fn with_strategies(strategies: Vec<Box<dyn RegionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Selects the content region of `markup`
    ///
    /// Returns `None` when no strategy finds a usable region; the caller skips
    /// the page.
    pub fn extract(&self, markup: &str) -> Option<ContentRegion> {
        let document = Html::parse_document(markup);

        for strategy in &self.strategies {
            if let Some(element) = strategy.select(&document) {
                tracing::trace!("Content region selected by '{}'", strategy.name());
                return Some(ContentRegion {
                    strategy: strategy.name().to_string(),
                    html: element.html(),
                    images: collect_images(&element),
                });
            }
        }

        None
    }
}

/// Extracts the content region with the default main → article → body policy
///
/// # Example
///
/// ```
/// use anchor_crawl::extract::extract;
///
/// let html = r#"<html><body><nav><img src="logo.png"></nav>
///     <main><h1>Hello</h1><img src="/a.png" alt="A"></main></body></html>"#;
/// let region = extract(html).unwrap();
/// assert_eq!(region.strategy, "main");
/// assert_eq!(region.images.len(), 1);
/// assert_eq!(region.images[0].src, "/a.png");
/// ```
pub fn extract(markup: &str) -> Option<ContentRegion> {
    ContentExtractor::default().extract(markup)
}

fn collect_images(region: &scraper::ElementRef<'_>) -> Vec<ImageRef> {
    let Ok(selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    region
        .select(&selector)
        .filter_map(|img| {
            let src = img.value().attr("src")?.trim();
            if src.is_empty() {
                return None;
            }
            Some(ImageRef {
                src: src.to_string(),
                alt: img.value().attr("alt").map(str::to_string),
            })
        })
        .collect()
}
