// src/diff_engine.rs
// Computes tagged diff spans between the original and customized resume.
// Uses the `similar` crate for the underlying text diffing.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices_deadline, Algorithm, ChangeTag, DiffOp, TextDiff, TextDiffConfig};

use crate::error::Result;
use crate::models::{DiffSpan, DiffTag, Pane};

/// Unchanged gaps shorter than this (bytes) are folded into the surrounding
/// change when grouping spans into hunks.
pub const COALESCE_THRESHOLD: usize = 50;

/// The diff surface the comparison engine consumes.
///
/// Implementations must return spans that reconstruct both inputs: the
/// non-removed values concatenate to `new`, the non-added ones to `old`.
pub trait DiffPrimitive {
    fn diff_lines(&self, old: &str, new: &str) -> Result<Vec<DiffSpan>>;
    fn diff_words(&self, old: &str, new: &str) -> Result<Vec<DiffSpan>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    #[default]
    Myers,
    Patience,
    Lcs,
}

impl From<DiffAlgorithm> for Algorithm {
    fn from(algorithm: DiffAlgorithm) -> Self {
        match algorithm {
            DiffAlgorithm::Myers => Algorithm::Myers,
            DiffAlgorithm::Patience => Algorithm::Patience,
            DiffAlgorithm::Lcs => Algorithm::Lcs,
        }
    }
}

/// Granularity of the inline (highlighting) diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffGranularity {
    Line,
    #[default]
    Word,
    /// Line diff first, then word diff inside each changed block
    Hybrid,
}

/// [`DiffPrimitive`] backed by `similar`
#[derive(Debug, Clone, Default)]
pub struct SimilarDiff {
    algorithm: DiffAlgorithm,
    /// Deadline after which `similar` falls back to a coarser diff
    timeout: Option<Duration>,
}

impl SimilarDiff {
    pub fn new(algorithm: DiffAlgorithm, timeout: Option<Duration>) -> Self {
        Self { algorithm, timeout }
    }

    fn configure(&self) -> TextDiffConfig {
        let mut config = TextDiff::configure();
        config.algorithm(self.algorithm.into());
        if let Some(timeout) = self.timeout {
            config.timeout(timeout);
        }
        config
    }
}

impl DiffPrimitive for SimilarDiff {
    fn diff_lines(&self, old: &str, new: &str) -> Result<Vec<DiffSpan>> {
        let diff = self.configure().diff_lines(old, new);
        Ok(collect_spans(&diff))
    }

    fn diff_words(&self, old: &str, new: &str) -> Result<Vec<DiffSpan>> {
        let old_tokens = tokenize_words(old);
        let new_tokens = tokenize_words(new);
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let ops = capture_diff_slices_deadline(
            self.algorithm.into(),
            &old_tokens,
            &new_tokens,
            deadline,
        );

        let mut spans = Vec::new();
        for op in ops {
            match op {
                DiffOp::Equal { old_index, len, .. } => {
                    push_tokens(&mut spans, DiffTag::Unchanged, &old_tokens[old_index..old_index + len]);
                }
                DiffOp::Delete { old_index, old_len, .. } => {
                    push_tokens(&mut spans, DiffTag::Removed, &old_tokens[old_index..old_index + old_len]);
                }
                DiffOp::Insert { new_index, new_len, .. } => {
                    push_tokens(&mut spans, DiffTag::Added, &new_tokens[new_index..new_index + new_len]);
                }
                DiffOp::Replace {
                    old_index,
                    old_len,
                    new_index,
                    new_len,
                } => {
                    push_tokens(&mut spans, DiffTag::Removed, &old_tokens[old_index..old_index + old_len]);
                    push_tokens(&mut spans, DiffTag::Added, &new_tokens[new_index..new_index + new_len]);
                }
            }
        }
        Ok(spans)
    }
}

/// Split text into word, whitespace and punctuation tokens.
///
/// Runs of alphanumerics (plus `_`) form one token, runs of whitespace form
/// one token, and every other character stands alone, so "Java," diffs
/// against "Java, Go" as an unchanged "Java" followed by ", Go".
pub fn tokenize_words(text: &str) -> Vec<&str> {
    #[derive(PartialEq)]
    enum Class {
        Word,
        Space,
        Other,
    }
    fn class_of(c: char) -> Class {
        if c.is_alphanumeric() || c == '_' {
            Class::Word
        } else if c.is_whitespace() {
            Class::Space
        } else {
            Class::Other
        }
    }

    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<Class> = None;

    for (idx, c) in text.char_indices() {
        let class = class_of(c);
        let continues = match &current {
            Some(prev) => *prev == class && class != Class::Other,
            None => true,
        };
        if !continues {
            tokens.push(&text[start..idx]);
            start = idx;
        }
        current = Some(class);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

fn push_tokens(spans: &mut Vec<DiffSpan>, tag: DiffTag, tokens: &[&str]) {
    for token in tokens {
        push_span(spans, tag, token);
    }
}

/// Flatten a `similar` diff into spans, merging adjacent changes that share a tag
fn collect_spans<'a>(diff: &TextDiff<'a, 'a, 'a, str>) -> Vec<DiffSpan> {
    let mut spans = Vec::new();
    for change in diff.iter_all_changes() {
        let tag = match change.tag() {
            ChangeTag::Equal => DiffTag::Unchanged,
            ChangeTag::Insert => DiffTag::Added,
            ChangeTag::Delete => DiffTag::Removed,
        };
        push_span(&mut spans, tag, change.value());
    }
    spans
}

fn push_span(spans: &mut Vec<DiffSpan>, tag: DiffTag, value: &str) {
    if value.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.tag == tag => last.value.push_str(value),
        _ => spans.push(DiffSpan::new(tag, value)),
    }
}

/// Run the inline diff at the requested granularity
pub fn diff_inline(
    primitive: &dyn DiffPrimitive,
    old: &str,
    new: &str,
    granularity: DiffGranularity,
) -> Result<Vec<DiffSpan>> {
    match granularity {
        DiffGranularity::Line => primitive.diff_lines(old, new),
        DiffGranularity::Word => primitive.diff_words(old, new),
        DiffGranularity::Hybrid => diff_hybrid(primitive, old, new),
    }
}

/// Hybrid line-word diff
/// 1. Identifies changed blocks using the line diff.
/// 2. Word-diffs the removed and added text of each block.
pub fn diff_hybrid(primitive: &dyn DiffPrimitive, old: &str, new: &str) -> Result<Vec<DiffSpan>> {
    let line_spans = primitive.diff_lines(old, new)?;
    let mut spans = Vec::new();

    // Buffers for the current changed block
    let mut pending_removed = String::new();
    let mut pending_added = String::new();

    for span in line_spans {
        match span.tag {
            DiffTag::Unchanged => {
                flush_block(primitive, &mut spans, &pending_removed, &pending_added)?;
                pending_removed.clear();
                pending_added.clear();
                push_span(&mut spans, DiffTag::Unchanged, &span.value);
            }
            DiffTag::Removed => pending_removed.push_str(&span.value),
            DiffTag::Added => pending_added.push_str(&span.value),
        }
    }

    flush_block(primitive, &mut spans, &pending_removed, &pending_added)?;
    Ok(spans)
}

fn flush_block(
    primitive: &dyn DiffPrimitive,
    spans: &mut Vec<DiffSpan>,
    removed: &str,
    added: &str,
) -> Result<()> {
    if removed.is_empty() && added.is_empty() {
        return Ok(());
    }
    // Pure insertions and deletions have nothing to refine
    if removed.is_empty() || added.is_empty() {
        push_span(spans, DiffTag::Removed, removed);
        push_span(spans, DiffTag::Added, added);
        return Ok(());
    }
    for span in primitive.diff_words(removed, added)? {
        push_span(spans, span.tag, &span.value);
    }
    Ok(())
}

/// Spans rendered in `pane`: unchanged plus that pane's own changes
pub fn spans_for(spans: &[DiffSpan], pane: Pane) -> impl Iterator<Item = &DiffSpan> {
    spans.iter().filter(move |span| span.tag.visible_in(pane))
}

pub fn reconstruct(spans: &[DiffSpan], pane: Pane) -> String {
    spans_for(spans, pane).map(|span| span.value.as_str()).collect()
}

pub fn reconstruct_original(spans: &[DiffSpan]) -> String {
    reconstruct(spans, Pane::Original)
}

pub fn reconstruct_customized(spans: &[DiffSpan]) -> String {
    reconstruct(spans, Pane::Customized)
}

/// A group of nearby changes, shown as one entry in change listings
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChangeHunk {
    /// Starting byte offset in the original document
    pub original_start: usize,
    /// Ending byte offset in the original document (exclusive)
    pub original_end: usize,
    /// 1-based line of the original document the hunk starts on
    pub display_line: usize,
    pub original_text: String,
    pub customized_text: String,
    /// Removed, added and unchanged gap parts in order
    pub parts: Vec<DiffSpan>,
}

/// Group spans into hunks, coalescing changes separated by short unchanged gaps
pub fn group_hunks(spans: &[DiffSpan]) -> Vec<ChangeHunk> {
    let mut hunks: Vec<ChangeHunk> = Vec::new();
    let mut current: Option<ChangeHunk> = None;
    // Unchanged text seen since the last change, held until we know whether
    // the next change is close enough to join
    let mut gap: Option<&str> = None;
    let mut original_cursor = 0;
    let mut original_lines = 1;

    for span in spans {
        match span.tag {
            DiffTag::Unchanged => {
                if current.is_some() {
                    if span.value.len() < COALESCE_THRESHOLD {
                        gap = Some(&span.value);
                    } else {
                        hunks.extend(current.take());
                        gap = None;
                    }
                }
                original_cursor += span.value.len();
                original_lines += span.value.matches('\n').count();
            }
            DiffTag::Removed | DiffTag::Added => {
                let hunk = current.get_or_insert_with(|| ChangeHunk {
                    original_start: original_cursor,
                    original_end: original_cursor,
                    display_line: original_lines,
                    original_text: String::new(),
                    customized_text: String::new(),
                    parts: Vec::new(),
                });
                if let Some(gap_text) = gap.take() {
                    hunk.original_text.push_str(gap_text);
                    hunk.customized_text.push_str(gap_text);
                    hunk.parts.push(DiffSpan::unchanged(gap_text));
                }
                if span.tag == DiffTag::Removed {
                    hunk.original_text.push_str(&span.value);
                    original_cursor += span.value.len();
                    original_lines += span.value.matches('\n').count();
                } else {
                    hunk.customized_text.push_str(&span.value);
                }
                hunk.original_end = original_cursor;
                hunk.parts.push(span.clone());
            }
        }
    }

    hunks.extend(current);
    hunks
}

/// Totals shown by the change counter
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ChangeSummary {
    pub added_spans: usize,
    pub removed_spans: usize,
    pub added_chars: usize,
    pub removed_chars: usize,
    pub hunks: usize,
    /// Share of both documents that is unchanged, in `0.0..=1.0`
    pub similarity: f32,
}

impl ChangeSummary {
    pub fn from_spans(spans: &[DiffSpan]) -> Self {
        let mut summary = ChangeSummary::default();
        let mut unchanged_chars = 0;

        for span in spans {
            let chars = span.value.chars().count();
            match span.tag {
                DiffTag::Unchanged => unchanged_chars += chars,
                DiffTag::Added => {
                    summary.added_spans += 1;
                    summary.added_chars += chars;
                }
                DiffTag::Removed => {
                    summary.removed_spans += 1;
                    summary.removed_chars += chars;
                }
            }
        }

        let total = 2 * unchanged_chars + summary.added_chars + summary.removed_chars;
        summary.similarity = if total == 0 {
            1.0
        } else {
            (2 * unchanged_chars) as f32 / total as f32
        };
        summary.hunks = group_hunks(spans).len();
        summary
    }

    pub fn total_changes(&self) -> usize {
        self.added_spans + self.removed_spans
    }
}
