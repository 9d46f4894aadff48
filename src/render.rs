// src/render.rs
//! Presentation of a comparison session: dual-pane HTML, a terminal listing
//! and a serializable report.

use std::fmt::Write;

use serde::Serialize;

use crate::alignment::{PairKind, SectionAlignment};
use crate::diff_engine::{ChangeHunk, ChangeSummary};
use crate::models::{DiffTag, Pane, SearchScope, Section};
use crate::outline::{Block, PaneView, Segment, ViewMode};
use crate::search::SearchMatch;
use crate::session::ComparisonSession;

/// A search match projected onto one block
struct Highlight {
    start: usize,
    end: usize,
    index: usize,
    current: bool,
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render both panes side by side
pub fn render_html(session: &ComparisonSession) -> String {
    let comparison = session.comparison();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "<div class=\"resume-comparison\" data-session=\"{}\" data-view-mode=\"{}\">",
        session.id(),
        match session.mode() {
            ViewMode::Full => "full",
            ViewMode::DiffOnly => "diff-only",
        }
    );
    let _ = writeln!(
        out,
        "<div class=\"change-summary\">{}</div>",
        escape_html(&summary_line(&comparison.summary))
    );
    if !comparison.highlighted() {
        out.push_str("<div class=\"diff-unavailable\">Diff highlighting unavailable</div>\n");
    }

    for pane in [Pane::Original, Pane::Customized] {
        render_pane(&mut out, session.view(pane), session.search().matches(), session.search().current_index());
    }

    out.push_str("</div>\n");
    out
}

fn render_pane(out: &mut String, view: &PaneView, matches: &[SearchMatch], current: Option<usize>) {
    let _ = writeln!(
        out,
        "<div id=\"{}\" class=\"resume-pane resume-pane-{}\">",
        view.pane.container_id(),
        view.pane.id_prefix()
    );

    for (idx, block) in view.blocks.iter().enumerate() {
        let highlights: Vec<Highlight> = matches
            .iter()
            .filter(|m| m.pane == view.pane && m.block == idx)
            .map(|m| Highlight {
                start: m.start,
                end: m.end,
                index: m.index,
                current: current == Some(m.index),
            })
            .collect();
        render_block(out, view, idx, block, &highlights);
    }

    out.push_str("</div>\n");
}

fn render_block(out: &mut String, view: &PaneView, idx: usize, block: &Block, highlights: &[Highlight]) {
    let id = view.block_id(idx);
    let style = if block.hidden {
        " style=\"display:none\""
    } else {
        ""
    };

    match block.heading() {
        Some((level, key)) => {
            let tag = format!("h{}", level.clamp(1, 6));
            let _ = write!(out, "<{} id=\"{}\" class=\"section-heading\"{}>", tag, id, style);
            if let Some(toggle) = block.toggle.and_then(|t| view.toggles.get(t)) {
                let _ = write!(
                    out,
                    "<button id=\"{}\" class=\"section-toggle {}\" data-section-title=\"{}\" data-section-ordinal=\"{}\" aria-expanded=\"{}\">{}</button>",
                    toggle.id,
                    if toggle.is_expanded() { "expanded" } else { "collapsed" },
                    escape_html(&key.title),
                    key.ordinal,
                    toggle.is_expanded(),
                    toggle.state.icon()
                );
            }
            render_segments(out, view.pane, &block.segments, highlights);
            let _ = writeln!(out, "</{}>", tag);
        }
        None => {
            let _ = write!(out, "<p id=\"{}\" class=\"section-content\"{}>", id, style);
            render_segments(out, view.pane, &block.segments, highlights);
            out.push_str("</p>\n");
        }
    }
}

fn render_segments(out: &mut String, pane: Pane, segments: &[Segment], highlights: &[Highlight]) {
    let mut offset = 0;

    for segment in segments {
        let segment_end = offset + segment.text.len();

        // Cut the segment wherever a highlight starts or ends inside it
        let mut cuts = vec![offset, segment_end];
        for h in highlights {
            for point in [h.start, h.end] {
                if point > offset && point < segment_end {
                    cuts.push(point);
                }
            }
        }
        cuts.sort_unstable();
        cuts.dedup();

        let wrapper = match segment.tag {
            DiffTag::Unchanged => None,
            DiffTag::Added => Some("diff-added"),
            DiffTag::Removed => Some("diff-removed"),
        };
        if let Some(class) = wrapper {
            let _ = write!(out, "<span class=\"{}\">", class);
        }

        for window in cuts.windows(2) {
            let (from, to) = (window[0], window[1]);
            let piece = escape_html(&segment.text[from - offset..to - offset]);
            match highlights.iter().find(|h| h.start <= from && to <= h.end) {
                Some(h) => {
                    let _ = write!(
                        out,
                        "<span class=\"search-highlight{}\" data-container=\"{}\" data-index=\"{}\">{}</span>",
                        if h.current { " current" } else { "" },
                        pane.container_id(),
                        h.index,
                        piece
                    );
                }
                None => out.push_str(&piece),
            }
        }

        if wrapper.is_some() {
            out.push_str("</span>");
        }
        offset = segment_end;
    }
}

pub fn summary_line(summary: &ChangeSummary) -> String {
    format!(
        "{} added, {} removed ({} change groups), {:.1}% unchanged",
        summary.added_spans,
        summary.removed_spans,
        summary.hunks,
        summary.similarity * 100.0
    )
}

/// Terminal listing of the change groups
pub fn render_text(session: &ComparisonSession) -> String {
    let comparison = session.comparison();
    let mut out = String::new();

    let _ = writeln!(out, "Changes: {}", summary_line(&comparison.summary));
    if !comparison.highlighted() {
        out.push_str("Diff unavailable: showing outline only\n");
    }
    if comparison.modified_titles.is_empty() {
        out.push_str("Modified sections: none\n");
    } else {
        let _ = writeln!(out, "Modified sections: {}", comparison.modified_titles.join(", "));
    }

    for hunk in comparison.hunks() {
        render_hunk(&mut out, &hunk);
    }
    out
}

fn render_hunk(out: &mut String, hunk: &ChangeHunk) {
    let _ = writeln!(out, "\n@@ line {} @@", hunk.display_line);
    for line in hunk.original_text.lines().filter(|l| !l.is_empty()) {
        let _ = writeln!(out, "- {}", line);
    }
    for line in hunk.customized_text.lines().filter(|l| !l.is_empty()) {
        let _ = writeln!(out, "+ {}", line);
    }
}

/// Both outlines with modification markers, then the section pairing
pub fn render_outline(session: &ComparisonSession) -> String {
    let comparison = session.comparison();
    let mut out = String::new();

    for pane in [Pane::Original, Pane::Customized] {
        let _ = writeln!(out, "{}:", pane);
        let sections = comparison.sections(pane);
        if sections.is_empty() {
            out.push_str("  (no sections detected)\n");
        }
        for section in sections {
            render_section_line(&mut out, section);
        }
    }

    out.push_str("alignment:\n");
    render_alignment(&mut out, &comparison.alignment);
    out
}

fn render_section_line(out: &mut String, section: &Section) {
    let _ = writeln!(
        out,
        "  {} {}{} (lines {}-{})",
        if section.modified { "*" } else { " " },
        "  ".repeat(section.level.saturating_sub(1)),
        section.key(),
        section.start_line + 1,
        section.end_line + 1
    );
}

fn render_alignment(out: &mut String, alignment: &SectionAlignment) {
    for pair in &alignment.pairs {
        let left = pair.original.as_ref().map(|k| k.to_string()).unwrap_or_else(|| "-".to_string());
        let right = pair.customized.as_ref().map(|k| k.to_string()).unwrap_or_else(|| "-".to_string());
        let marker = match pair.kind {
            PairKind::Matched => "==",
            PairKind::Renamed => "~>",
            PairKind::OnlyOriginal => "<-",
            PairKind::OnlyCustomized => "->",
        };
        let _ = writeln!(out, "  {} {} {}", left, marker, right);
    }
}

/// Matches in navigation order with their line and surrounding text
pub fn render_matches(session: &ComparisonSession) -> String {
    let search = session.search();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:?} in {}: {}",
        search.query().unwrap_or(""),
        scope_label(search.scope()),
        search.counter_label()
    );
    let total = search.matches().len();
    for m in search.matches() {
        let block = &session.view(m.pane).blocks[m.block];
        let text = block.text();
        let _ = writeln!(
            out,
            "[{}/{}] {:<10} line {:>3}: {}[{}]{}",
            m.index + 1,
            total,
            m.pane.to_string(),
            block.line + 1,
            &text[..m.start],
            &text[m.start..m.end],
            &text[m.end..]
        );
    }
    out
}

fn scope_label(scope: SearchScope) -> &'static str {
    match scope {
        SearchScope::Both => "both panes",
        SearchScope::Original => "original",
        SearchScope::Customized => "customized",
    }
}

#[derive(Debug, Serialize)]
pub struct SearchReport<'a> {
    pub query: Option<&'a str>,
    pub scope: SearchScope,
    pub current: Option<usize>,
    pub matches: &'a [SearchMatch],
}

#[derive(Debug, Serialize)]
pub struct ComparisonReport<'a> {
    pub session_id: String,
    pub generated_at: String,
    pub view_mode: ViewMode,
    pub highlighted: bool,
    pub summary: &'a ChangeSummary,
    pub modified_titles: &'a [String],
    pub original_sections: &'a [Section],
    pub customized_sections: &'a [Section],
    pub alignment: &'a SectionAlignment,
    pub hunks: Vec<ChangeHunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchReport<'a>>,
}

pub fn build_report(session: &ComparisonSession) -> ComparisonReport<'_> {
    let comparison = session.comparison();
    let search = session.search();

    ComparisonReport {
        session_id: session.id().to_string(),
        generated_at: session.created_at().to_rfc3339(),
        view_mode: session.mode(),
        highlighted: comparison.highlighted(),
        summary: &comparison.summary,
        modified_titles: &comparison.modified_titles,
        original_sections: &comparison.original_sections,
        customized_sections: &comparison.customized_sections,
        alignment: &comparison.alignment,
        hunks: comparison.hunks(),
        search: search.query().map(|query| SearchReport {
            query: Some(query),
            scope: search.scope(),
            current: search.current_index(),
            matches: search.matches(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(tag: DiffTag, text: &str) -> Segment {
        Segment {
            tag,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>R&D</b> \"x\""), "&lt;b&gt;R&amp;D&lt;/b&gt; &quot;x&quot;");
    }

    #[test]
    fn test_segments_are_wrapped_by_tag() {
        let mut out = String::new();
        render_segments(
            &mut out,
            Pane::Customized,
            &[segment(DiffTag::Unchanged, "Java"), segment(DiffTag::Added, ", Go")],
            &[],
        );
        assert_eq!(out, "Java<span class=\"diff-added\">, Go</span>");
    }

    #[test]
    fn test_highlight_spanning_segments_is_split() {
        let mut out = String::new();
        let highlights = [Highlight {
            start: 2,
            end: 6,
            index: 0,
            current: true,
        }];
        render_segments(
            &mut out,
            Pane::Customized,
            &[segment(DiffTag::Unchanged, "Java"), segment(DiffTag::Added, ", Go")],
            &highlights,
        );
        assert_eq!(
            out,
            "Ja<span class=\"search-highlight current\" data-container=\"customized-resume-html\" data-index=\"0\">va</span>\
             <span class=\"diff-added\"><span class=\"search-highlight current\" data-container=\"customized-resume-html\" data-index=\"0\">, </span>Go</span>"
        );
    }
}
