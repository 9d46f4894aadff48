// src/outline.rs
//! Collapsible per-pane views.
//!
//! A [`PaneView`] holds one block per displayed line, each split into
//! segments that carry their diff tag. Processing sections attaches a toggle
//! to every heading block; the toggle owns the heading's content run and
//! decides whether that run is visible.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::diff_engine::spans_for;
use crate::document::DocumentText;
use crate::models::{DiffSpan, DiffTag, Pane, Section, SectionKey};

/// Upper bound on the blocks collected into one section's content run
pub const DEFAULT_MAX_SCAN_DEPTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Every line of the document
    #[default]
    Full,
    /// Headings plus lines containing a change
    DiffOnly,
}

impl ViewMode {
    pub fn toggled(self) -> ViewMode {
        match self {
            ViewMode::Full => ViewMode::DiffOnly,
            ViewMode::DiffOnly => ViewMode::Full,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub tag: DiffTag,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Heading { level: usize, key: SectionKey },
    Text,
}

#[derive(Debug, Clone, Serialize)]
pub struct Block {
    /// 0-based line in the pane's document
    pub line: usize,
    pub kind: BlockKind,
    pub segments: Vec<Segment>,
    /// Index into [`PaneView::toggles`] once the heading has been wrapped
    pub toggle: Option<usize>,
    pub hidden: bool,
}

impl Block {
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn has_change(&self) -> bool {
        self.segments.iter().any(|s| s.tag != DiffTag::Unchanged)
    }

    pub fn heading(&self) -> Option<(usize, &SectionKey)> {
        match &self.kind {
            BlockKind::Heading { level, key } => Some((*level, key)),
            BlockKind::Text => None,
        }
    }

    fn is_blank(&self) -> bool {
        !self.has_change() && self.segments.iter().all(|s| s.text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    Expanded,
    Collapsed,
}

impl ToggleState {
    pub fn icon(self) -> &'static str {
        match self {
            ToggleState::Expanded => "\u{25BC}",
            ToggleState::Collapsed => "\u{25B6}",
        }
    }
}

/// Collapse control attached to a heading block
#[derive(Debug, Clone, Serialize)]
pub struct Toggle {
    pub id: String,
    pub key: SectionKey,
    pub level: usize,
    pub heading: usize,
    /// Block indices of the content run
    pub content: Vec<usize>,
    pub state: ToggleState,
}

impl Toggle {
    pub fn is_expanded(&self) -> bool {
        self.state == ToggleState::Expanded
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaneView {
    pub pane: Pane,
    pub mode: ViewMode,
    pub blocks: Vec<Block>,
    pub toggles: Vec<Toggle>,
}

impl PaneView {
    /// Build a pane from its document and the inline diff.
    ///
    /// Without spans (diff unavailable) every line is a single unchanged
    /// segment. Heading blocks are taken from `sections` so their keys match
    /// the extracted outline.
    pub fn build(
        pane: Pane,
        document: &DocumentText,
        spans: Option<&[DiffSpan]>,
        sections: &[Section],
        mode: ViewMode,
    ) -> Self {
        let lines = match spans {
            Some(spans) => split_lines(spans_for(spans, pane)),
            None => document
                .lines()
                .map(|line| vec![Segment {
                    tag: DiffTag::Unchanged,
                    text: line.to_string(),
                }])
                .collect(),
        };

        let headings: HashMap<usize, &Section> =
            sections.iter().map(|s| (s.start_line, s)).collect();

        let mut blocks = Vec::new();
        for (line, segments) in lines.into_iter().enumerate() {
            let kind = match headings.get(&line) {
                Some(section) => BlockKind::Heading {
                    level: section.level,
                    key: section.key(),
                },
                None => BlockKind::Text,
            };
            let block = Block {
                line,
                kind,
                segments,
                toggle: None,
                hidden: false,
            };
            if block.heading().is_none() && block.is_blank() {
                continue;
            }
            if mode == ViewMode::DiffOnly && block.heading().is_none() && !block.has_change() {
                continue;
            }
            blocks.push(block);
        }

        Self {
            pane,
            mode,
            blocks,
            toggles: Vec::new(),
        }
    }

    /// Wrap every heading that has no toggle yet. The content run is the
    /// following blocks up to the next heading of equal or shallower level,
    /// capped at `max_scan_depth`. Returns the number of toggles created.
    pub fn process_sections(&mut self, max_scan_depth: usize) -> usize {
        let mut created = 0;

        for idx in 0..self.blocks.len() {
            if self.blocks[idx].toggle.is_some() {
                continue;
            }
            let Some((level, key)) = self.blocks[idx].heading() else {
                continue;
            };
            let key = key.clone();

            let run = self.blocks[idx + 1..]
                .iter()
                .take(max_scan_depth)
                .take_while(|block| !matches!(block.heading(), Some((next, _)) if next <= level))
                .count();
            let content: Vec<usize> = (idx + 1..idx + 1 + run).collect();

            let toggle_idx = self.toggles.len();
            self.toggles.push(Toggle {
                id: format!("{}-section-toggle-{}", self.pane.id_prefix(), toggle_idx),
                key,
                level,
                heading: idx,
                content,
                state: ToggleState::Expanded,
            });
            self.blocks[idx].toggle = Some(toggle_idx);
            created += 1;
        }

        if created > 0 {
            log::debug!("{}: wrapped {} sections", self.pane, created);
        }
        created
    }

    pub fn toggle_index(&self, key: &SectionKey) -> Option<usize> {
        self.toggles.iter().position(|t| &t.key == key)
    }

    pub fn toggle_by_id(&self, id: &str) -> Option<&Toggle> {
        self.toggles.iter().find(|t| t.id == id)
    }

    /// Flip a toggle, returning whether it is now expanded
    pub fn toggle(&mut self, idx: usize) -> Option<bool> {
        let expanded = !self.toggles.get(idx)?.is_expanded();
        self.set_expanded(idx, expanded);
        Some(expanded)
    }

    pub fn set_expanded(&mut self, idx: usize, expanded: bool) {
        let Some(toggle) = self.toggles.get_mut(idx) else {
            return;
        };
        toggle.state = if expanded {
            ToggleState::Expanded
        } else {
            ToggleState::Collapsed
        };
        self.refresh_visibility();
    }

    pub fn is_expanded(&self, key: &SectionKey) -> Option<bool> {
        self.toggle_index(key).map(|idx| self.toggles[idx].is_expanded())
    }

    /// A block is hidden while any toggle owning it is collapsed
    fn refresh_visibility(&mut self) {
        for block in &mut self.blocks {
            block.hidden = false;
        }
        for toggle in self.toggles.iter().filter(|t| !t.is_expanded()) {
            for &idx in &toggle.content {
                self.blocks[idx].hidden = true;
            }
        }
    }

    /// Collapsed toggles whose content run contains block `idx`
    pub fn collapsed_owners(&self, idx: usize) -> Vec<usize> {
        self.toggles
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_expanded() && t.content.contains(&idx))
            .map(|(toggle_idx, _)| toggle_idx)
            .collect()
    }

    pub fn block_id(&self, idx: usize) -> String {
        format!("{}-block-{}", self.pane.id_prefix(), idx)
    }
}

/// Split the spans shown in one pane into per-line segment lists
fn split_lines<'a>(spans: impl Iterator<Item = &'a DiffSpan>) -> Vec<Vec<Segment>> {
    let mut lines: Vec<Vec<Segment>> = vec![Vec::new()];

    for span in spans {
        let mut pieces = span.value.split('\n').peekable();
        while let Some(piece) = pieces.next() {
            if !piece.is_empty() {
                if let Some(line) = lines.last_mut() {
                    line.push(Segment {
                        tag: span.tag,
                        text: piece.to_string(),
                    });
                }
            }
            if pieces.peek().is_some() {
                if let Some(line) = lines.last_mut() {
                    trim_carriage_return(line);
                }
                lines.push(Vec::new());
            }
        }
    }

    // A trailing newline leaves an empty final line that is not part of the text
    if lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Drop the `\r` of a CRLF ending, matching `str::lines`
fn trim_carriage_return(line: &mut Vec<Segment>) {
    let Some(last) = line.last_mut() else {
        return;
    };
    if last.text.ends_with('\r') {
        last.text.pop();
        if last.text.is_empty() {
            line.pop();
        }
    }
}

/// Expanded/collapsed state keyed by pane and section identity.
///
/// Owned by one comparison session and reapplied whenever that session
/// regenerates its panes.
#[derive(Debug, Clone, Default)]
pub struct CollapseState {
    states: HashMap<(Pane, SectionKey), bool>,
}

impl CollapseState {
    pub fn record(&mut self, pane: Pane, key: SectionKey, expanded: bool) {
        self.states.insert((pane, key), expanded);
    }

    pub fn get(&self, pane: Pane, key: &SectionKey) -> Option<bool> {
        self.states.get(&(pane, key.clone())).copied()
    }

    pub fn apply(&self, view: &mut PaneView) {
        let updates: Vec<(usize, bool)> = view
            .toggles
            .iter()
            .enumerate()
            .filter_map(|(idx, t)| self.get(view.pane, &t.key).map(|expanded| (idx, expanded)))
            .collect();
        for (idx, expanded) in updates {
            view.set_expanded(idx, expanded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::extract_sections;

    fn view(text: &str) -> PaneView {
        let doc = DocumentText::from_plain(text);
        let sections = extract_sections(&doc);
        PaneView::build(Pane::Original, &doc, None, &sections, ViewMode::Full)
    }

    #[test]
    fn test_one_toggle_per_heading() {
        let mut pane = view("# Jane\nintro\n## Experience\nAcme\n## Skills\nRust\n");
        assert_eq!(pane.process_sections(DEFAULT_MAX_SCAN_DEPTH), 3);
        assert_eq!(pane.toggles.len(), 3);
    }

    #[test]
    fn test_processing_is_idempotent() {
        let mut pane = view("SUMMARY\nx\nSKILLS\ny\n");
        assert_eq!(pane.process_sections(DEFAULT_MAX_SCAN_DEPTH), 2);
        assert_eq!(pane.process_sections(DEFAULT_MAX_SCAN_DEPTH), 0);
        assert_eq!(pane.toggles.len(), 2);
    }

    #[test]
    fn test_content_run_stops_at_same_level() {
        let mut pane = view("# A\none\n## B\ntwo\n# C\nthree\n");
        pane.process_sections(DEFAULT_MAX_SCAN_DEPTH);
        // A owns "one", heading B and "two", but not C
        assert_eq!(pane.toggles[0].content, vec![1, 2, 3]);
        assert_eq!(pane.toggles[1].content, vec![3]);
        assert_eq!(pane.toggles[2].content, vec![5]);
    }

    #[test]
    fn test_content_run_is_capped() {
        let mut text = String::from("SKILLS\n");
        for i in 0..30 {
            text.push_str(&format!("skill {}\n", i));
        }
        let mut pane = view(&text);
        pane.process_sections(DEFAULT_MAX_SCAN_DEPTH);
        assert_eq!(pane.toggles[0].content.len(), DEFAULT_MAX_SCAN_DEPTH);
    }

    #[test]
    fn test_toggle_has_two_states() {
        let mut pane = view("SKILLS\nJava\nGo\n");
        pane.process_sections(DEFAULT_MAX_SCAN_DEPTH);

        assert_eq!(pane.toggle(0), Some(false));
        assert_eq!(pane.toggles[0].state.icon(), "\u{25B6}");
        assert!(pane.blocks[1].hidden && pane.blocks[2].hidden);

        assert_eq!(pane.toggle(0), Some(true));
        assert_eq!(pane.toggles[0].state.icon(), "\u{25BC}");
        assert!(pane.blocks.iter().all(|b| !b.hidden));
    }

    #[test]
    fn test_nested_collapse_survives_parent_expand() {
        let mut pane = view("# A\n## B\ntext\n");
        pane.process_sections(DEFAULT_MAX_SCAN_DEPTH);
        pane.set_expanded(1, false);
        pane.set_expanded(0, false);
        pane.set_expanded(0, true);
        assert!(!pane.blocks[1].hidden);
        assert!(pane.blocks[2].hidden);
        assert_eq!(pane.collapsed_owners(2), vec![1]);
    }

    #[test]
    fn test_segments_follow_pane() {
        let doc = DocumentText::from_plain("SKILLS\nJava, Go\n");
        let sections = extract_sections(&doc);
        let spans = vec![
            DiffSpan::unchanged("SKILLS\nJava"),
            DiffSpan::added(", Go"),
            DiffSpan::unchanged("\n"),
        ];
        let pane = PaneView::build(Pane::Customized, &doc, Some(&spans), &sections, ViewMode::Full);
        assert_eq!(pane.blocks.len(), 2);
        assert_eq!(pane.blocks[1].text(), "Java, Go");
        assert_eq!(pane.blocks[1].segments[1].tag, DiffTag::Added);
    }

    #[test]
    fn test_crlf_endings_are_not_kept_in_blocks() {
        let doc = DocumentText::from_plain("SKILLS\r\nJava\r\n");
        let sections = extract_sections(&doc);
        let spans = vec![DiffSpan::unchanged("SKILLS\r\nJava"), DiffSpan::added(", Go"), DiffSpan::unchanged("\r\n")];
        let pane = PaneView::build(Pane::Customized, &doc, Some(&spans), &sections, ViewMode::Full);
        let texts: Vec<String> = pane.blocks.iter().map(Block::text).collect();
        assert_eq!(texts, vec!["SKILLS", "Java, Go"]);
        assert!(pane.blocks[0].heading().is_some());
    }

    #[test]
    fn test_diff_only_keeps_headings_and_changes() {
        let doc = DocumentText::from_plain("SUMMARY\nsame\nSKILLS\nJava\n");
        let sections = extract_sections(&doc);
        let spans = vec![
            DiffSpan::unchanged("SUMMARY\nsame\nSKILLS\n"),
            DiffSpan::removed("Java\n"),
            DiffSpan::added("Rust\n"),
        ];
        let pane = PaneView::build(Pane::Original, &doc, Some(&spans), &sections, ViewMode::DiffOnly);
        let texts: Vec<String> = pane.blocks.iter().map(Block::text).collect();
        assert_eq!(texts, vec!["SUMMARY", "SKILLS", "Java"]);
    }

    #[test]
    fn test_collapse_state_reapplies() {
        let mut pane = view("SUMMARY\nx\nSKILLS\ny\n");
        pane.process_sections(DEFAULT_MAX_SCAN_DEPTH);

        let mut state = CollapseState::default();
        state.record(Pane::Original, SectionKey::new("SKILLS", 0), false);

        let mut regenerated = view("SUMMARY\nx\nSKILLS\ny\n");
        regenerated.process_sections(DEFAULT_MAX_SCAN_DEPTH);
        state.apply(&mut regenerated);
        assert_eq!(regenerated.is_expanded(&SectionKey::new("SKILLS", 0)), Some(false));
        assert_eq!(regenerated.is_expanded(&SectionKey::new("SUMMARY", 0)), Some(true));
    }
}
