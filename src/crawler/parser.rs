//! HTML parser for link discovery
//!
//! This module handles parsing page markup to extract:
//! - Outbound links to follow, in document order
//! - Cross-domain links (counted, never followed)

use crate::url::{classify_link, LinkClass, SiteScope};
use scraper::{Html, Selector};
use url::Url;

/// Link information extracted from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Same-site identities in document order, duplicates removed
    pub links: Vec<Url>,

    /// Cross-domain links that were not followed
    pub cross_domain: Vec<Url>,
}

/// Parses page markup and discovers its outbound links
///
/// Links are taken from every `<a href>` in the document, not only the
/// content region, so navigation menus still lead the crawl to every page.
///
/// **Excluded:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Fragment-only links (same page anchors)
/// - Links to another host (reported in `cross_domain`)
///
/// # Example
///
/// ```
/// use anchor_crawl::crawler::parse_html;
/// use anchor_crawl::url::SiteScope;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let scope = SiteScope::from_url(&base_url).unwrap();
/// let parsed = parse_html(html, &base_url, &scope);
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// ```
pub fn parse_html(html: &str, base_url: &Url, scope: &SiteScope) -> ParsedPage {
    let document = Html::parse_document(html);

    let (links, cross_domain) = extract_links(&document, base_url, scope);

    ParsedPage {
        links,
        cross_domain,
    }
}

/// Extracts followable and cross-domain links from the HTML document
fn extract_links(document: &Html, base_url: &Url, scope: &SiteScope) -> (Vec<Url>, Vec<Url>) {
    let mut links: Vec<Url> = Vec::new();
    let mut cross_domain: Vec<Url> = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return (links, cross_domain);
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        match classify_link(base_url, href, scope) {
            LinkClass::Followable(url) => {
                if !links.contains(&url) {
                    links.push(url);
                }
            }
            LinkClass::CrossDomain(url) => {
                tracing::debug!("Not following cross-domain link {}", url);
                if !cross_domain.contains(&url) {
                    cross_domain.push(url);
                }
            }
            LinkClass::Ignored => {}
        }
    }

    (links, cross_domain)
}
