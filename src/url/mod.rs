//! URL handling module for Anchor-Crawl
//!
//! This module provides URL normalization, the site scope test, and the link
//! normalizer that turns a raw `href` into a crawl identity.

mod domain;
mod normalize;

use url::Url;

// Re-export main functions
pub use domain::SiteScope;
pub use normalize::normalize_url;

/// How a discovered hyperlink relates to the crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkClass {
    /// Same-site link; carries its normalized identity
    Followable(Url),
    /// Valid HTTP(S) link to another host; recorded as not followed
    CrossDomain(Url),
    /// Not a navigable link (mailto:, javascript:, fragment-only, malformed...)
    Ignored,
}

impl LinkClass {
    /// Returns the identity if the link should be followed
    pub fn followable(self) -> Option<Url> {
        match self {
            Self::Followable(url) => Some(url),
            _ => None,
        }
    }
}

/// Schemes that never name a crawlable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Classifies an `href` found on the page at `base`
///
/// Relative references are resolved against `base`, then normalized with
/// [`normalize_url`]. In-scope links are rewritten to the scope's scheme so
/// that `http://` and `https://` links to the same page share one identity.
pub fn classify_link(base: &Url, href: &str, scope: &SiteScope) -> LinkClass {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return LinkClass::Ignored;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        return LinkClass::Ignored;
    }

    let absolute = match base.join(href) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!("Could not resolve {} against {}: {}", href, base, e);
            return LinkClass::Ignored;
        }
    };

    let mut normalized = match normalize_url(absolute.as_str()) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!("Ignoring link {}: {}", absolute, e);
            return LinkClass::Ignored;
        }
    };

    if !scope.contains(&normalized) {
        return LinkClass::CrossDomain(normalized);
    }

    if normalized.scheme() != scope.scheme() && normalized.set_scheme(scope.scheme()).is_err() {
        return LinkClass::Ignored;
    }

    LinkClass::Followable(normalized)
}

/// Link normalizer: resolves `href` against `base` into a followable identity
///
/// Returns `None` for non-HTTP(S) schemes, mailto/javascript links, fragment-only
/// links, and links whose host differs from the scope's host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use anchor_crawl::url::{normalize_link, SiteScope};
///
/// let base = Url::parse("https://example.com/blog/").unwrap();
/// let scope = SiteScope::from_url(&base).unwrap();
///
/// let link = normalize_link(&base, "post1#comments", &scope).unwrap();
/// assert_eq!(link.as_str(), "https://example.com/blog/post1");
/// assert!(normalize_link(&base, "https://other.org/", &scope).is_none());
/// ```
pub fn normalize_link(base: &Url, href: &str, scope: &SiteScope) -> Option<Url> {
    classify_link(base, href, scope).followable()
}
