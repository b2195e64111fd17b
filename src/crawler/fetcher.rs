//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with user agent, timeouts and redirect policy
//! - GET requests for page markup, with a Content-Type check
//! - GET requests for raw image bytes
//! - Error classification
//!
//! Retries are not attempted; a failed fetch is reported and the crawl moves on.

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client, Response};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body decode, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Short description of a failed fetch, for logs and seed errors
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::ContentMismatch { content_type } => {
                Some(format!("expected HTML, got {}", content_type))
            }
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Raw bytes fetched for an image
#[derive(Debug, Clone)]
pub struct FetchedBytes {
    /// Response body
    pub bytes: Vec<u8>,
    /// Content-Type header value, without parameters
    pub content_type: Option<String>,
}

/// Failure to fetch a non-page resource
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("request timeout")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```
/// use anchor_crawl::config::Config;
/// use anchor_crawl::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.crawler, &config.user_agent).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .redirect(Policy::limited(crawler.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page's markup
///
/// # Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with HTML or missing Content-Type | `Success` |
/// | 2xx with another Content-Type | `ContentMismatch` |
/// | any other status | `HttpError` |
/// | transport or body error | `NetworkError` |
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                error: classify_error(&e).to_string(),
            }
        }
    };

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    if let Some(content_type) = content_type(&response) {
        if !is_html(&content_type) {
            return FetchResult::ContentMismatch { content_type };
        }
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

/// Fetches the raw bytes of a resource such as an image
pub async fn fetch_bytes(client: &Client, url: &Url) -> Result<FetchedBytes, FetchFailure> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(&e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchFailure::Status(status.as_u16()));
    }

    let content_type = content_type(&response);
    let bytes = response.bytes().await.map_err(|e| classify_error(&e))?;

    Ok(FetchedBytes {
        bytes: bytes.to_vec(),
        content_type,
    })
}

/// Returns the response's media type, lowercased and without parameters
fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

fn is_html(content_type: &str) -> bool {
    content_type == "text/html" || content_type == "application/xhtml+xml"
}

/// Maps a reqwest error onto the crawler's failure kinds
fn classify_error(e: &reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else if e.is_connect() {
        FetchFailure::Connect(e.to_string())
    } else {
        FetchFailure::Other(e.to_string())
    }
}
