//! Content region selection strategies

use scraper::{ElementRef, Html, Selector};

/// One way of locating a page's content region
pub trait RegionStrategy {
    /// Name reported in logs when this strategy wins
    fn name(&self) -> &str;

    /// Returns the region this strategy selects, if any
    fn select<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>>;
}

/// Selects the first usable element matching a CSS selector
#[derive(Debug)]
pub struct LandmarkStrategy {
    name: String,
    selector: Selector,
}

impl LandmarkStrategy {
    /// Creates a strategy from a CSS selector; `None` if the selector is invalid
    pub fn new(name: impl Into<String>, css: &str) -> Option<Self> {
        let selector = Selector::parse(css).ok()?;
        Some(Self {
            name: name.into(),
            selector,
        })
    }
}

impl RegionStrategy for LandmarkStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn select<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.selector).find(is_usable)
    }
}

/// The main → article → body fallback order
pub fn default_strategies() -> Vec<Box<dyn RegionStrategy>> {
    [("main", "main"), ("article", "article"), ("body", "body")]
        .into_iter()
        .filter_map(|(name, css)| LandmarkStrategy::new(name, css))
        .map(|s| Box::new(s) as Box<dyn RegionStrategy>)
        .collect()
}

/// A region is usable if it holds visible text or at least one image
///
/// The HTML parser always synthesizes a `<body>`, so an empty one must not
/// count as content.
pub fn is_usable(element: &ElementRef<'_>) -> bool {
    if element.text().any(|t| !t.trim().is_empty()) {
        return true;
    }

    Selector::parse("img[src]")
        .map(|img| element.select(&img).next().is_some())
        .unwrap_or(false)
}
