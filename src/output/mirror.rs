//! Site mirror writer
//!
//! Maps each crawled URL identity to a markdown path that mirrors the URL's
//! path hierarchy, and writes documents there atomically.

use crate::MirrorError;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

/// Name of the per-directory summary anchor
pub const SUMMARY_FILE_NAME: &str = "_summary.md";

/// File stem used for the site root and for directory-style URLs
const INDEX_STEM: &str = "index";

/// Page suffixes replaced by `.md`
const PAGE_EXTENSIONS: &[&str] = &[".html", ".htm", ".php"];

/// Hex digits of the query hash appended to the file stem
const QUERY_HASH_LEN: usize = 12;

/// A converted page ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    /// Identity the document was crawled from
    pub url: Url,

    /// Destination relative to the output root
    pub relative_path: PathBuf,

    /// Markdown body
    pub markdown: String,
}

impl OutputDocument {
    /// Creates a document at the mirrored path of `url`
    pub fn new(url: Url, markdown: String) -> Self {
        let relative_path = mirror_path(&url);
        Self {
            url,
            relative_path,
            markdown,
        }
    }
}

/// Derives the output path of a URL identity, relative to the output root
///
/// The mapping depends on nothing but the URL, so re-crawling an identity
/// always lands on the same file.
///
/// | URL path | Output path |
/// |----------|-------------|
/// | `/` | `index.md` |
/// | `/about` | `about.md` |
/// | `/blog/post1` | `blog/post1.md` |
/// | `/blog/post1.html` | `blog/post1.md` |
/// | `/search?q=x` | `search-<12 hex digits>.md` |
/// | `/_summary` | `_summary-page.md` |
///
/// # Example
///
/// ```
/// use anchor_crawl::output::mirror_path;
/// use std::path::PathBuf;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/blog/post1").unwrap();
/// assert_eq!(mirror_path(&url), PathBuf::from("blog/post1.md"));
/// ```
pub fn mirror_path(url: &Url) -> PathBuf {
    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(sanitize_segment)
                .collect()
        })
        .unwrap_or_default();

    let mut path = PathBuf::new();
    let stem = match segments.split_last() {
        Some((last, dirs)) => {
            for dir in dirs {
                path.push(dir);
            }
            page_stem(last)
        }
        None => INDEX_STEM.to_string(),
    };

    let stem = match url.query() {
        Some(query) => format!("{}-{}", stem, query_hash(query)),
        None => stem,
    };

    path.push(format!("{}.md", stem));
    path
}

/// Strips a page extension and keeps the stem clear of the summary name
fn page_stem(segment: &str) -> String {
    let lowered = segment.to_ascii_lowercase();
    let stem = PAGE_EXTENSIONS
        .iter()
        .find(|ext| lowered.ends_with(*ext))
        .map(|ext| &segment[..segment.len() - ext.len()])
        .unwrap_or(segment);

    let summary_stem = SUMMARY_FILE_NAME.trim_end_matches(".md");
    match stem {
        "" => INDEX_STEM.to_string(),
        s if s == summary_stem => format!("{}-page", s),
        s => s.to_string(),
    }
}

/// Replaces characters that are unsafe in file names
fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "._~+=-".contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Leading dots would hide the file or directory
    if cleaned.starts_with('.') {
        format!("_{}", cleaned)
    } else {
        cleaned
    }
}

fn query_hash(query: &str) -> String {
    let digest = Sha256::digest(query.as_bytes());
    hex::encode(digest)[..QUERY_HASH_LEN].to_string()
}

/// Writes `contents` to `path` through a temporary file in the same directory
///
/// Readers see either the previous file or the complete new one, never a
/// partial write.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), MirrorError> {
    let write_error = |source: std::io::Error| MirrorError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(write_error)?;

    let mut file = tempfile::NamedTempFile::new_in(parent).map_err(write_error)?;
    file.write_all(contents.as_bytes()).map_err(write_error)?;
    file.flush().map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;

    Ok(())
}

/// Writes output documents under a root directory
#[derive(Debug, Clone)]
pub struct MirrorWriter {
    root: PathBuf,
}

impl MirrorWriter {
    /// Establishes the output root, creating it if needed
    ///
    /// Failing here fails the crawl: there is nowhere to write.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, MirrorError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| MirrorError::OutputRoot {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// The output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a document, replacing any previous file at its path
    ///
    /// Returns the absolute destination path.
    pub fn write(&self, document: &OutputDocument) -> Result<PathBuf, MirrorError> {
        let destination = self.root.join(&document.relative_path);
        write_atomic(&destination, &document.markdown)?;
        tracing::debug!("Wrote {} ({} bytes)", destination.display(), document.markdown.len());
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn path_of(url: &str) -> PathBuf {
        mirror_path(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_root_is_index() {
        assert_eq!(path_of("https://example.com/"), PathBuf::from("index.md"));
    }

    #[test]
    fn test_nested_path() {
        assert_eq!(
            path_of("https://example.com/blog/post1"),
            PathBuf::from("blog/post1.md")
        );
        assert_eq!(path_of("https://example.com/about"), PathBuf::from("about.md"));
    }

    #[test]
    fn test_page_extensions_replaced() {
        assert_eq!(
            path_of("https://example.com/docs/intro.html"),
            PathBuf::from("docs/intro.md")
        );
        assert_eq!(path_of("https://example.com/a.HTM"), PathBuf::from("a.md"));
        assert_eq!(path_of("https://example.com/x.php"), PathBuf::from("x.md"));
        assert_eq!(
            path_of("https://example.com/paper.pdf"),
            PathBuf::from("paper.pdf.md")
        );
    }

    #[test]
    fn test_query_gets_stable_suffix() {
        let a = path_of("https://example.com/search?q=rust");
        let b = path_of("https://example.com/search?q=rust");
        let c = path_of("https://example.com/search?q=go");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let name = a.to_string_lossy().to_string();
        assert!(name.starts_with("search-"));
        assert!(name.ends_with(".md"));
        assert_eq!(name.len(), "search-".len() + QUERY_HASH_LEN + ".md".len());
    }

    #[test]
    fn test_summary_name_never_shadowed() {
        assert_eq!(
            path_of("https://example.com/_summary"),
            PathBuf::from("_summary-page.md")
        );
        assert_eq!(
            path_of("https://example.com/docs/_summary.html"),
            PathBuf::from("docs/_summary-page.md")
        );
    }

    #[test]
    fn test_unsafe_characters_replaced() {
        assert_eq!(sanitize_segment("a:b*c"), "a_b_c");
        assert_eq!(sanitize_segment(".well-known"), "_.well-known");
        assert_eq!(sanitize_segment("caf%C3%A9"), "caf_C3_A9");
    }

    #[test]
    fn test_percent_escapes_not_kept_in_names() {
        // Anchor links use file names verbatim, so names never hold `%`
        assert_eq!(
            path_of("https://example.com/docs/caf%C3%A9"),
            PathBuf::from("docs/caf_C3_A9.md")
        );
        assert_eq!(
            path_of("https://example.com/100%25/done"),
            PathBuf::from("100_25/done.md")
        );
    }

    #[test]
    fn test_writer_creates_parents_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let writer = MirrorWriter::create(dir.path().join("out")).unwrap();

        let url = Url::parse("https://example.com/blog/post1").unwrap();
        let first = OutputDocument::new(url.clone(), "# First\n".to_string());
        let path = writer.write(&first).unwrap();
        assert_eq!(path, dir.path().join("out/blog/post1.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# First\n");

        let second = OutputDocument::new(url, "# Second\n".to_string());
        writer.write(&second).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Second\n");

        // Only the document itself remains; no temp files left behind
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("out/blog"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_output_root_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = MirrorWriter::create(blocker.join("out"));
        assert!(matches!(result, Err(MirrorError::OutputRoot { .. })));
    }
}
