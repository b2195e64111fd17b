use url::Url;

/// The crawl boundary derived from the start URL
///
/// A URL is in scope when its host and explicit port match the start URL's.
/// The scheme is not part of the test: an `http://` link to the site's own
/// host is still the same site, and is rewritten to the seed's scheme by the
/// link normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteScope {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl SiteScope {
    /// Builds the scope from a start URL
    ///
    /// Returns `None` if the URL has no host.
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use anchor_crawl::url::SiteScope;
    ///
    /// let scope = SiteScope::from_url(&Url::parse("https://Example.com/docs").unwrap()).unwrap();
    /// assert_eq!(scope.host(), "example.com");
    /// assert!(scope.contains(&Url::parse("https://example.com/other").unwrap()));
    /// assert!(!scope.contains(&Url::parse("https://blog.example.com/").unwrap()));
    /// ```
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_lowercase();
        Some(Self {
            scheme: url.scheme().to_string(),
            host,
            port: url.port(),
        })
    }

    /// The scope's host, lowercased
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The start URL's scheme
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns true if `url` belongs to the crawled site
    pub fn contains(&self, url: &Url) -> bool {
        url.host_str()
            .map(|h| h.eq_ignore_ascii_case(&self.host))
            .unwrap_or(false)
            && url.port() == self.port
    }
}
