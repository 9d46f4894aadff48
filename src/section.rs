// src/section.rs
//! Heuristic section detection and modification marking.
//!
//! A heading is either a Markdown heading (`#` to `###`) or a standalone line
//! of uppercase letters and spaces at least three characters long. Each
//! heading opens a section that runs until the line before the next heading.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::document::DocumentText;
use crate::models::{DiffSpan, DiffTag, Section};

static MARKDOWN_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,3})\s+(.+)$").expect("valid regex"));
static UPPERCASE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z ]{2,}$").expect("valid regex"));

/// A detected heading line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: usize,
    pub title: String,
}

/// Classify a single line. Surrounding whitespace is ignored.
pub fn detect_heading(line: &str) -> Option<Heading> {
    let line = line.trim();

    if let Some(caps) = MARKDOWN_HEADING.captures(line) {
        let title = caps[2].trim();
        if !title.is_empty() {
            return Some(Heading {
                level: caps[1].len(),
                title: title.to_string(),
            });
        }
    }

    if UPPERCASE_HEADING.is_match(line) {
        return Some(Heading {
            level: 1,
            title: line.to_string(),
        });
    }

    None
}

/// Partition a document into sections. Lines before the first heading
/// belong to no section.
pub fn extract_sections(document: &DocumentText) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut last_line = 0;

    for (idx, line) in document.lines().enumerate() {
        last_line = idx;
        let Some(heading) = detect_heading(line) else {
            continue;
        };

        if let Some(previous) = sections.last_mut() {
            previous.end_line = idx.saturating_sub(1).max(previous.start_line);
        }

        let ordinal = seen.entry(heading.title.clone()).or_insert(0);
        sections.push(Section {
            title: heading.title,
            level: heading.level,
            start_line: idx,
            end_line: idx,
            ordinal: *ordinal,
            modified: false,
        });
        *ordinal += 1;
    }

    if let Some(last) = sections.last_mut() {
        last.end_line = last_line.max(last.start_line);
    }

    log::debug!("Extracted {} sections", sections.len());
    sections
}

/// Mark sections touched by a line-level diff.
///
/// Running line cursors are kept for both documents. Removed spans are tested
/// against the original sections, added spans against the customized ones,
/// with an inclusive overlap on line ranges. A span that crosses a section
/// boundary marks every section it touches.
pub fn mark_modified(line_spans: &[DiffSpan], original: &mut [Section], customized: &mut [Section]) {
    let mut original_line = 0;
    let mut customized_line = 0;

    for span in line_spans {
        let lines = span.line_count();
        if lines == 0 {
            continue;
        }
        match span.tag {
            DiffTag::Unchanged => {
                original_line += lines;
                customized_line += lines;
            }
            DiffTag::Removed => {
                mark_range(original, original_line, original_line + lines - 1);
                original_line += lines;
            }
            DiffTag::Added => {
                mark_range(customized, customized_line, customized_line + lines - 1);
                customized_line += lines;
            }
        }
    }
}

fn mark_range(sections: &mut [Section], start: usize, end: usize) {
    for section in sections.iter_mut().filter(|s| s.overlaps(start, end)) {
        section.modified = true;
    }
}

/// De-duplicated titles of modified sections, original first, in order of
/// first appearance.
pub fn modified_titles(original: &[Section], customized: &[Section]) -> Vec<String> {
    let mut seen = HashSet::new();
    original
        .iter()
        .chain(customized.iter())
        .filter(|s| s.modified)
        .filter(|s| seen.insert(s.title.as_str()))
        .map(|s| s.title.clone())
        .collect()
}
