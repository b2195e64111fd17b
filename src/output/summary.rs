//! Summary anchor generation
//!
//! A second pass over the finished output tree. Every directory that holds at
//! least one document, or a subdirectory that got an anchor, receives a
//! `_summary.md` listing its direct document children (by title) and its
//! child directories (linking to their own anchors).
//!
//! Anchors are always rebuilt from what is on disk; existing anchors are
//! overwritten and are never read back as documents.

use crate::output::mirror::{write_atomic, SUMMARY_FILE_NAME};
use crate::MirrorError;
use std::path::Path;

/// Counts from one summary pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryReport {
    /// Anchors written or rewritten
    pub written: usize,

    /// Stale anchors removed from directories that no longer hold content
    pub removed: usize,

    /// Anchors that could not be written or removed
    pub failed: usize,
}

/// A document listed in an anchor
#[derive(Debug, Clone, PartialEq, Eq)]
struct DocumentEntry {
    file_name: String,
    title: String,
}

/// Generates `_summary.md` for every directory under `root`, leaves first
///
/// Hidden directories (names starting with `.`) and symlinks are skipped.
/// An unreadable subdirectory is logged and left out of its parent's anchor,
/// and an anchor that cannot be written or removed is logged and counted in
/// [`SummaryReport::failed`]. Only an unreadable root is an error.
pub fn generate_summaries(root: &Path) -> Result<SummaryReport, MirrorError> {
    let mut report = SummaryReport::default();
    summarize_dir(root, root, &mut report)?;
    tracing::info!(
        "Summary anchors: {} written, {} removed, {} failed",
        report.written,
        report.removed,
        report.failed
    );
    Ok(report)
}

/// Summarises `dir` after its subdirectories; returns true if it got an anchor
fn summarize_dir(root: &Path, dir: &Path, report: &mut SummaryReport) -> Result<bool, MirrorError> {
    let mut documents: Vec<DocumentEntry> = Vec::new();
    let mut subdirs: Vec<String> = Vec::new();
    let mut child_dirs: Vec<String> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!("Skipping non UTF-8 entry in {}", dir.display());
            continue;
        };

        if file_type.is_dir() {
            if !name.starts_with('.') {
                child_dirs.push(name);
            }
        } else if file_type.is_file() && is_document(&name) {
            let title = read_title(&entry.path()).unwrap_or_else(|| stem(&name).to_string());
            documents.push(DocumentEntry {
                file_name: name,
                title,
            });
        }
    }

    child_dirs.sort();
    for name in child_dirs {
        match summarize_dir(root, &dir.join(&name), report) {
            Ok(true) => subdirs.push(name),
            Ok(false) => {}
            Err(e) => tracing::warn!("Could not summarise {}: {}", dir.join(&name).display(), e),
        }
    }

    documents.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    let summary_path = dir.join(SUMMARY_FILE_NAME);
    if documents.is_empty() && subdirs.is_empty() {
        if summary_path.is_file() {
            match std::fs::remove_file(&summary_path) {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    tracing::warn!("Could not remove stale {}: {}", summary_path.display(), e);
                    report.failed += 1;
                }
            }
        }
        return Ok(false);
    }

    let relative = display_path(root, dir);
    let content = format_summary(&relative, &documents, &subdirs);
    if let Err(e) = write_atomic(&summary_path, &content) {
        tracing::warn!("{}", e);
        report.failed += 1;
        return Ok(false);
    }
    report.written += 1;
    tracing::debug!("Wrote {}", summary_path.display());

    Ok(true)
}

/// A markdown file that is not itself an anchor
fn is_document(name: &str) -> bool {
    name.ends_with(".md") && name != SUMMARY_FILE_NAME
}

fn stem(name: &str) -> &str {
    name.strip_suffix(".md").unwrap_or(name)
}

fn read_title(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(markdown) => document_title(&markdown),
        Err(e) => {
            tracing::warn!("Could not read {}: {}", path.display(), e);
            None
        }
    }
}

/// `/` for the root, `/a/b` below it
fn display_path(root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", parts.join("/"))
}

/// Finds the first heading of a markdown document
///
/// Both ATX (`# Title`) and setext (`Title` underlined with `=` or `-`)
/// headings are recognised. Fenced code blocks are ignored.
///
/// # Example
///
/// ```
/// use anchor_crawl::output::document_title;
///
/// assert_eq!(document_title("intro\n\n## Install ##\n"), Some("Install".to_string()));
/// assert_eq!(document_title("Guide\n=====\n"), Some("Guide".to_string()));
/// assert_eq!(document_title("no heading here\n"), None);
/// ```
pub fn document_title(markdown: &str) -> Option<String> {
    let mut in_fence = false;
    let mut previous: Option<&str> = None;

    for line in markdown.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            previous = None;
            continue;
        }
        if in_fence {
            continue;
        }

        if let Some(title) = atx_heading(trimmed) {
            return Some(title);
        }

        if let Some(text) = previous {
            if is_setext_underline(trimmed) {
                return Some(text.to_string());
            }
        }

        previous = if trimmed.is_empty() || trimmed.starts_with(['-', '*', '>', '|']) {
            None
        } else {
            Some(trimmed)
        };
    }

    None
}

fn atx_heading(line: &str) -> Option<String> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }

    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }

    let text = rest.trim().trim_end_matches('#').trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn is_setext_underline(line: &str) -> bool {
    line.len() >= 2 && (line.chars().all(|c| c == '=') || line.chars().all(|c| c == '-'))
}

fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

fn format_summary(relative: &str, documents: &[DocumentEntry], subdirs: &[String]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Summary of {}\n\n", relative));
    md.push_str(&format!("Path: `{}`\n", relative));

    if !documents.is_empty() {
        md.push_str("\n## Documents\n\n");
        for doc in documents {
            md.push_str(&format!(
                "- [{}]({})\n",
                escape_link_text(&doc.title),
                doc.file_name
            ));
        }
    }

    if !subdirs.is_empty() {
        md.push_str("\n## Directories\n\n");
        for name in subdirs {
            md.push_str(&format!("- [{}/]({}/{})\n", name, name, SUMMARY_FILE_NAME));
        }
    }

    md
}
