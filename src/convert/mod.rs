//! Document conversion
//!
//! Turns a [`ContentRegion`] into markdown. The region is re-serialised to a
//! clean HTML fragment first:
//! - scripts, styles and embedded frames are removed
//! - `<img>` sources are replaced by their data URI, or the image is removed
//! - `srcset` and `<source>` are removed so no external image reference survives
//! - link targets are made absolute against the page URL
//!
//! The fragment is then converted with `html2md` and the whitespace is
//! normalised. The same region and images always give the same bytes.

mod inline;

pub use inline::{resolve_media_type, ImageInliner, InlinedImage};

use crate::extract::ContentRegion;
use scraper::{ElementRef, Html};
use std::collections::HashMap;
use url::Url;

/// Elements removed together with their content
const DROPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "source", "iframe", "object", "embed",
];

/// Elements without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "hr", "img", "input", "link", "meta", "track", "wbr",
];

/// Attributes carried into the clean fragment
const KEPT_ATTRIBUTES: &[&str] = &["href", "title", "alt", "class", "colspan", "rowspan", "start"];

/// Converts a content region into markdown
///
/// `images` is aligned with `region.images`; `None` entries are dropped.
/// Returns an empty string when the region has no convertible content.
pub fn convert(region: &ContentRegion, images: &[Option<InlinedImage>], page_url: &Url) -> String {
    let lookup: HashMap<&str, Option<&InlinedImage>> = region
        .images
        .iter()
        .zip(images.iter().map(Option::as_ref).chain(std::iter::repeat(None)))
        .map(|(image_ref, inlined)| (image_ref.src.as_str(), inlined))
        .collect();

    let fragment = Html::parse_fragment(&region.html);
    let mut serializer = Serializer {
        images: &lookup,
        base: page_url,
        out: String::with_capacity(region.html.len()),
    };
    serializer.children(fragment.root_element());

    let markdown = html2md::parse_html(&serializer.out);
    tidy(&markdown)
}

/// Writes a cleaned copy of the region as HTML
struct Serializer<'a> {
    images: &'a HashMap<&'a str, Option<&'a InlinedImage>>,
    base: &'a Url,
    out: String,
}

impl Serializer<'_> {
    fn children(&mut self, parent: ElementRef<'_>) {
        for child in parent.children() {
            if let Some(text) = child.value().as_text() {
                self.out.push_str(&escape_text(text));
            } else if let Some(element) = ElementRef::wrap(child) {
                self.element(element);
            }
        }
    }

    fn element(&mut self, node: ElementRef<'_>) {
        let element = node.value();
        let name = element.name();

        if DROPPED_ELEMENTS.contains(&name) {
            return;
        }

        if name == "img" {
            self.image(element);
            return;
        }

        self.out.push('<');
        self.out.push_str(name);
        for (attr, value) in element.attrs() {
            if !KEPT_ATTRIBUTES.contains(&attr) {
                continue;
            }
            let value = if attr == "href" {
                self.absolute(value)
            } else {
                value.to_string()
            };
            self.push_attr(attr, &value);
        }
        self.out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }

        self.children(node);
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn image(&mut self, element: &scraper::node::Element) {
        let Some(src) = element.attr("src").map(str::trim).filter(|s| !s.is_empty()) else {
            return;
        };

        let images = self.images;
        let Some(Some(inlined)) = images.get(src) else {
            return;
        };

        self.out.push_str("<img");
        self.push_attr("src", &inlined.data_uri);
        if let Some(alt) = element.attr("alt") {
            self.push_attr("alt", alt);
        }
        if let Some(title) = element.attr("title") {
            self.push_attr("title", title);
        }
        self.out.push('>');
    }

    fn push_attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        self.out.push_str(&escape_attr(value));
        self.out.push('"');
    }

    fn absolute(&self, href: &str) -> String {
        if href.starts_with('#') {
            return href.to_string();
        }
        self.base
            .join(href.trim())
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string())
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Normalises converter output
///
/// Runs of blank lines collapse to one, whitespace-only lines become empty,
/// leading and trailing blank lines are removed, and the text ends with a
/// single newline.
fn tidy(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut blank_run = 0;

    for line in markdown.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() && blank_run > 0 {
            out.push('\n');
        }
        blank_run = 0;
        out.push_str(line);
        out.push('\n');
    }

    out
}
