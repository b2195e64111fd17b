//! Image inlining
//!
//! Every image inside a content region is fetched once, base64-encoded and
//! carried as a `data:` URI. A failed fetch yields `None` for that image, and
//! the converter drops it; the page itself still converts.

use crate::crawler::fetch_bytes;
use crate::extract::ImageRef;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use std::collections::HashMap;
use url::Url;

/// Media type assumed when neither the response nor the file name tells
const FALLBACK_MEDIA_TYPE: &str = "image/png";

/// A self-contained image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinedImage {
    /// Declared media type, e.g. `image/png`
    pub media_type: String,

    /// Complete `data:` URI
    pub data_uri: String,
}

impl InlinedImage {
    /// Encodes raw bytes as a base64 data URI
    ///
    /// # Example
    ///
    /// ```
    /// use anchor_crawl::convert::InlinedImage;
    ///
    /// let image = InlinedImage::from_bytes(b"GIF89a", "image/gif");
    /// assert_eq!(image.data_uri, "data:image/gif;base64,R0lGODlh");
    /// ```
    pub fn from_bytes(bytes: &[u8], media_type: &str) -> Self {
        Self {
            media_type: media_type.to_string(),
            data_uri: format!("data:{};base64,{}", media_type, STANDARD.encode(bytes)),
        }
    }

    /// Wraps a `src` that is already a data URI
    ///
    /// Returns `None` if `src` is not a `data:` URI.
    pub fn from_data_uri(src: &str) -> Option<Self> {
        let rest = src.strip_prefix("data:")?;
        let header_end = rest.find(',')?;
        let media_type = rest[..header_end]
            .split(';')
            .next()
            .filter(|m| !m.is_empty())
            .unwrap_or("text/plain")
            .to_string();
        Some(Self {
            media_type,
            data_uri: src.to_string(),
        })
    }
}

/// Chooses the media type for fetched image bytes
///
/// A declared `image/*` type wins. Any other declared type means the server
/// did not return an image, which is a failure. With no declared type the file
/// extension is consulted, then [`FALLBACK_MEDIA_TYPE`].
pub fn resolve_media_type(declared: Option<&str>, url: &Url) -> Option<String> {
    match declared {
        Some(media_type) if media_type.starts_with("image/") => Some(media_type.to_string()),
        Some(_) => None,
        None => Some(
            mime_guess::from_path(url.path())
                .first()
                .filter(|m| m.type_() == mime_guess::mime::IMAGE)
                .map(|m| m.essence_str().to_string())
                .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string()),
        ),
    }
}

/// Fetches and encodes images, memoising results for the whole crawl
pub struct ImageInliner {
    client: Client,
    enabled: bool,
    cache: HashMap<String, Option<InlinedImage>>,
    inlined: usize,
    dropped: usize,
}

impl ImageInliner {
    /// Creates an inliner that fetches with `client`
    ///
    /// When `enabled` is false no request is made and every image that is not
    /// already a data URI is dropped.
    pub fn new(client: Client, enabled: bool) -> Self {
        Self {
            client,
            enabled,
            cache: HashMap::new(),
            inlined: 0,
            dropped: 0,
        }
    }

    /// Inlines every image of a region
    ///
    /// The result is aligned with `images`: `None` marks an image to drop.
    pub async fn inline_all(
        &mut self,
        page_url: &Url,
        images: &[ImageRef],
    ) -> Vec<Option<InlinedImage>> {
        let mut inlined = Vec::with_capacity(images.len());
        for image in images {
            let result = self.inline_one(page_url, &image.src).await;
            if result.is_some() {
                self.inlined += 1;
            } else {
                self.dropped += 1;
            }
            inlined.push(result);
        }
        inlined
    }

    async fn inline_one(&mut self, page_url: &Url, src: &str) -> Option<InlinedImage> {
        if let Some(existing) = InlinedImage::from_data_uri(src) {
            return Some(existing);
        }

        if !self.enabled {
            return None;
        }

        let url = match page_url.join(src) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => url,
            _ => {
                tracing::warn!("Dropping image with unusable src '{}' on {}", src, page_url);
                return None;
            }
        };

        if let Some(cached) = self.cache.get(url.as_str()) {
            return cached.clone();
        }

        let result = self.fetch(&url).await;
        self.cache.insert(url.as_str().to_string(), result.clone());
        result
    }

    async fn fetch(&self, url: &Url) -> Option<InlinedImage> {
        let fetched = match fetch_bytes(&self.client, url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!("Could not embed image {}: {}", url, e);
                return None;
            }
        };

        if fetched.bytes.is_empty() {
            tracing::warn!("Could not embed image {}: empty body", url);
            return None;
        }

        match resolve_media_type(fetched.content_type.as_deref(), url) {
            Some(media_type) => Some(InlinedImage::from_bytes(&fetched.bytes, &media_type)),
            None => {
                tracing::warn!(
                    "Could not embed image {}: served as {}",
                    url,
                    fetched.content_type.as_deref().unwrap_or("unknown")
                );
                None
            }
        }
    }

    /// Images embedded so far (including images that were already data URIs)
    pub fn inlined_count(&self) -> usize {
        self.inlined
    }

    /// Images dropped so far
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }
}
