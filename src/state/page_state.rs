/// Page outcome definitions for tallying a crawl
///
/// Every crawl step ends in exactly one outcome: the page's markdown was
/// written, or the page was skipped for a recorded reason.
use std::fmt;
use std::path::PathBuf;

/// Why a page produced no output document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    /// Network error or non-success HTTP status
    FetchFailed,

    /// Response Content-Type is not HTML
    NotHtml,

    /// No usable main/article/body region
    ExtractionEmpty,

    /// Conversion produced no markdown text
    ConversionEmpty,

    /// The document could not be written to disk
    WriteFailed,
}

impl SkipReason {
    /// Stable identifier used in logs and the final report
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchFailed => "fetch_failed",
            Self::NotHtml => "not_html",
            Self::ExtractionEmpty => "extraction_empty",
            Self::ConversionEmpty => "conversion_empty",
            Self::WriteFailed => "write_failed",
        }
    }

    /// Returns all skip reasons in report order
    pub fn all() -> [Self; 5] {
        [
            Self::FetchFailed,
            Self::NotHtml,
            Self::ExtractionEmpty,
            Self::ConversionEmpty,
            Self::WriteFailed,
        ]
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a single crawl step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Markdown written at this path (relative to the output root)
    Written(PathBuf),

    /// Page skipped; no file was written
    Skipped(SkipReason),
}

impl PageOutcome {
    /// Returns true if a document was written
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }

    /// Returns the skip reason, if any
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Skipped(reason) => Some(*reason),
            Self::Written(_) => None,
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Written(path) => write!(f, "written to {}", path.display()),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_outcome() {
        let outcome = PageOutcome::Written(PathBuf::from("blog/post1.md"));
        assert!(outcome.is_written());
        assert_eq!(outcome.skip_reason(), None);
        assert_eq!(outcome.to_string(), "written to blog/post1.md");
    }

    #[test]
    fn test_skipped_outcome() {
        let outcome = PageOutcome::Skipped(SkipReason::ExtractionEmpty);
        assert!(!outcome.is_written());
        assert_eq!(outcome.skip_reason(), Some(SkipReason::ExtractionEmpty));
        assert_eq!(outcome.to_string(), "skipped (extraction_empty)");
    }

    #[test]
    fn test_skip_reason_identifiers_unique() {
        let mut names: Vec<_> = SkipReason::all().iter().map(|r| r.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), SkipReason::all().len());
    }
}
