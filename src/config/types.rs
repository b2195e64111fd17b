use serde::Deserialize;

/// Main configuration structure for Anchor-Crawl
///
/// Every section is optional in the TOML file; missing sections fall back to
/// [`Default`] so the crawler can run without any configuration file at all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages to fetch (unbounded when absent)
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u32>,

    /// Maximum link depth from the start URL (unbounded when absent)
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Pause between consecutive page fetches (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Maximum number of redirect hops followed per request
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: None,
            max_depth: None,
            request_delay_ms: 0,
            request_timeout_secs: 10,
            connect_timeout_secs: 5,
            max_redirects: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Whether to generate `_summary.md` anchors after the crawl
    pub summaries: bool,

    /// Whether to fetch and inline images; when false, images are dropped
    #[serde(rename = "inline-images")]
    pub inline_images: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summaries: true,
            inline_images: true,
        }
    }
}
