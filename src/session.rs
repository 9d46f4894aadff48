// src/session.rs
//! Comparison result and the interactive session built on top of it.
//!
//! [`Comparison::compute`] is a pure function of the two documents. A
//! [`ComparisonSession`] adds the view state the user manipulates: view
//! mode, collapsed sections and the running search.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::alignment::{align_sections, SectionAlignment};
use crate::config::Config;
use crate::diff_engine::{diff_inline, group_hunks, ChangeHunk, ChangeSummary, DiffGranularity, DiffPrimitive};
use crate::document::DocumentText;
use crate::error::{Error, Result};
use crate::models::{DiffSpan, Pane, SearchScope, Section, SectionKey};
use crate::outline::{CollapseState, PaneView, ViewMode};
use crate::render::{build_report, render_html, ComparisonReport};
use crate::search::{Debouncer, SearchMatch, SearchState};
use crate::section::{extract_sections, mark_modified, modified_titles};

/// Everything derived from one pair of documents
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub granularity: DiffGranularity,
    /// Line-level spans, used for section marking
    pub line_spans: Vec<DiffSpan>,
    /// Spans used for highlighting; `None` when the diff failed
    pub inline_spans: Option<Vec<DiffSpan>>,
    pub original_sections: Vec<Section>,
    pub customized_sections: Vec<Section>,
    pub modified_titles: Vec<String>,
    pub alignment: SectionAlignment,
    pub summary: ChangeSummary,
}

impl Comparison {
    /// Diff, outline and align two documents.
    ///
    /// A failing diff primitive is logged and leaves the comparison without
    /// spans; sections are still extracted, none of them marked modified.
    pub fn compute(
        original: &DocumentText,
        customized: &DocumentText,
        primitive: &dyn DiffPrimitive,
        granularity: DiffGranularity,
    ) -> Self {
        let line_spans = match primitive.diff_lines(original.as_str(), customized.as_str()) {
            Ok(spans) => Some(spans),
            Err(e) => {
                log::error!("{}", e);
                None
            }
        };

        let inline_spans = line_spans.as_ref().and_then(|lines| {
            if granularity == DiffGranularity::Line {
                return Some(lines.clone());
            }
            match diff_inline(primitive, original.as_str(), customized.as_str(), granularity) {
                Ok(spans) => Some(spans),
                Err(e) => {
                    log::error!("{}", e);
                    None
                }
            }
        });
        let line_spans = line_spans.unwrap_or_default();

        let mut original_sections = extract_sections(original);
        let mut customized_sections = extract_sections(customized);
        mark_modified(&line_spans, &mut original_sections, &mut customized_sections);

        let modified_titles = modified_titles(&original_sections, &customized_sections);
        let alignment = align_sections(&original_sections, &customized_sections);
        let summary = ChangeSummary::from_spans(inline_spans.as_deref().unwrap_or(&line_spans));

        log::info!(
            "Compared documents: {} changes, {} modified sections",
            summary.total_changes(),
            modified_titles.len()
        );

        Self {
            granularity,
            line_spans,
            inline_spans,
            original_sections,
            customized_sections,
            modified_titles,
            alignment,
            summary,
        }
    }

    /// Whether diff highlighting is available
    pub fn highlighted(&self) -> bool {
        self.inline_spans.is_some()
    }

    pub fn sections(&self, pane: Pane) -> &[Section] {
        match pane {
            Pane::Original => &self.original_sections,
            Pane::Customized => &self.customized_sections,
        }
    }

    pub fn hunks(&self) -> Vec<ChangeHunk> {
        self.inline_spans
            .as_deref()
            .map(group_hunks)
            .unwrap_or_default()
    }
}

/// Where navigation landed, with the ids a presentation layer scrolls to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationTarget {
    pub index: usize,
    pub pane: Pane,
    pub container_id: String,
    pub block_id: String,
    /// Sections expanded to reveal the match, across both panes
    pub expanded: Vec<(Pane, SectionKey)>,
    pub counter: String,
}

pub struct ComparisonSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    original: DocumentText,
    customized: DocumentText,
    comparison: Comparison,
    mode: ViewMode,
    original_view: PaneView,
    customized_view: PaneView,
    collapse: CollapseState,
    search: SearchState,
    debouncer: Debouncer,
    max_scan_depth: usize,
}

impl ComparisonSession {
    pub fn new(original: DocumentText, customized: DocumentText) -> Self {
        Self::with_config(original, customized, &Config::default())
    }

    pub fn with_config(original: DocumentText, customized: DocumentText, config: &Config) -> Self {
        let primitive = config.diff_primitive();
        Self::with_primitive(original, customized, &primitive, config)
    }

    pub fn with_primitive(
        original: DocumentText,
        customized: DocumentText,
        primitive: &dyn DiffPrimitive,
        config: &Config,
    ) -> Self {
        if original.is_empty() || customized.is_empty() {
            log::warn!("Comparing against an empty document");
        }

        let comparison = Comparison::compute(&original, &customized, primitive, config.diff.granularity);
        let mode = ViewMode::Full;
        let max_scan_depth = config.sections.max_scan_depth;

        let mut session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            original_view: PaneView::build(
                Pane::Original,
                &original,
                comparison.inline_spans.as_deref(),
                &comparison.original_sections,
                mode,
            ),
            customized_view: PaneView::build(
                Pane::Customized,
                &customized,
                comparison.inline_spans.as_deref(),
                &comparison.customized_sections,
                mode,
            ),
            original,
            customized,
            comparison,
            mode,
            collapse: CollapseState::default(),
            search: SearchState::new(config.search.default_scope, config.search.min_query_len),
            debouncer: Debouncer::new(config.debounce()),
            max_scan_depth,
        };
        session.original_view.process_sections(max_scan_depth);
        session.customized_view.process_sections(max_scan_depth);
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn comparison(&self) -> &Comparison {
        &self.comparison
    }

    pub fn document(&self, pane: Pane) -> &DocumentText {
        match pane {
            Pane::Original => &self.original,
            Pane::Customized => &self.customized,
        }
    }

    pub fn view(&self, pane: Pane) -> &PaneView {
        match pane {
            Pane::Original => &self.original_view,
            Pane::Customized => &self.customized_view,
        }
    }

    fn view_mut(&mut self, pane: Pane) -> &mut PaneView {
        match pane {
            Pane::Original => &mut self.original_view,
            Pane::Customized => &mut self.customized_view,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn collapse_state(&self) -> &CollapseState {
        &self.collapse
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn render_html(&self) -> String {
        render_html(self)
    }

    pub fn report(&self) -> ComparisonReport<'_> {
        build_report(self)
    }

    // ----- view mode -----

    /// Rebuild both panes for `mode`, restoring collapse state and re-running
    /// the last search against the new content
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.regenerate();
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.set_view_mode(self.mode.toggled());
        self.mode
    }

    fn regenerate(&mut self) {
        for pane in [Pane::Original, Pane::Customized] {
            let mut view = PaneView::build(
                pane,
                self.document(pane),
                self.comparison.inline_spans.as_deref(),
                self.comparison.sections(pane),
                self.mode,
            );
            view.process_sections(self.max_scan_depth);
            self.collapse.apply(&mut view);
            *self.view_mut(pane) = view;
        }
        log::debug!("Regenerated panes in {:?} mode", self.mode);

        if let Some(query) = self.search.query().map(str::to_string) {
            self.run_search(&query);
        }
    }

    // ----- sections -----

    /// Flip a section and mirror the new state onto its partner section in
    /// the other pane. Returns whether the section is now expanded.
    pub fn toggle_section(&mut self, pane: Pane, key: &SectionKey) -> Result<bool> {
        let view = self.view(pane);
        let idx = view
            .toggle_index(key)
            .ok_or_else(|| Error::UnknownSection(key.to_string()))?;
        let expanded = !view.toggles[idx].is_expanded();
        self.set_section(pane, key, expanded);
        Ok(expanded)
    }

    /// Toggle by rendered toggle id, e.g. `customized-section-toggle-3`
    pub fn toggle_section_by_id(&mut self, toggle_id: &str) -> Result<bool> {
        let found = [Pane::Original, Pane::Customized].into_iter().find_map(|pane| {
            self.view(pane)
                .toggle_by_id(toggle_id)
                .map(|toggle| (pane, toggle.key.clone()))
        });
        let (pane, key) = found.ok_or_else(|| Error::UnknownSection(toggle_id.to_string()))?;
        self.toggle_section(pane, &key)
    }

    /// Set a section's state, record it and mirror it. Returns every
    /// (pane, section) whose state was written.
    fn set_section(&mut self, pane: Pane, key: &SectionKey, expanded: bool) -> Vec<(Pane, SectionKey)> {
        let mut touched = vec![(pane, key.clone())];
        if let Some(partner) = self.comparison.alignment.partner(pane, key) {
            touched.push((pane.other(), partner.clone()));
        }

        for (target_pane, target_key) in &touched {
            self.collapse.record(*target_pane, target_key.clone(), expanded);
            let view = self.view_mut(*target_pane);
            if let Some(idx) = view.toggle_index(target_key) {
                view.set_expanded(idx, expanded);
            }
        }
        touched
    }

    // ----- search -----

    /// Record a keystroke; the search runs once input has been quiet for the
    /// debounce delay (see [`Self::tick`])
    pub fn input_query(&mut self, query: &str, now: Instant) {
        self.debouncer.input(query, now);
    }

    /// Run the pending search if its delay has elapsed. Returns the new match
    /// count when a search ran.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        let query = self.debouncer.poll(now)?;
        Some(self.run_search(&query))
    }

    /// Search immediately, dropping any pending input
    pub fn search_now(&mut self, query: &str) -> usize {
        self.debouncer.cancel();
        self.run_search(query)
    }

    fn run_search(&mut self, query: &str) -> usize {
        self.search.run(query, &self.original_view, &self.customized_view)
    }

    /// Change which panes are searched, re-running the last query
    pub fn set_scope(&mut self, scope: SearchScope) -> usize {
        if self.search.set_scope(scope) {
            if let Some(query) = self.search.query().map(str::to_string) {
                return self.run_search(&query);
            }
        }
        self.search.matches().len()
    }

    pub fn next_match(&mut self) -> Option<NavigationTarget> {
        let found = self.search.next().cloned()?;
        Some(self.reveal(&found))
    }

    pub fn previous_match(&mut self) -> Option<NavigationTarget> {
        let found = self.search.previous().cloned()?;
        Some(self.reveal(&found))
    }

    /// Enter moves forward, Shift+Enter backward
    pub fn handle_enter(&mut self, shift: bool) -> Option<NavigationTarget> {
        if shift {
            self.previous_match()
        } else {
            self.next_match()
        }
    }

    pub fn clear_search(&mut self) {
        self.debouncer.cancel();
        self.search.clear();
    }

    /// Expand every collapsed section hiding `found`, mirroring each expansion
    fn reveal(&mut self, found: &SearchMatch) -> NavigationTarget {
        let mut expanded = Vec::new();
        let view = self.view(found.pane);
        let owners: Vec<SectionKey> = view
            .collapsed_owners(found.block)
            .into_iter()
            .map(|idx| view.toggles[idx].key.clone())
            .collect();

        for key in owners {
            expanded.extend(self.set_section(found.pane, &key, true));
        }

        NavigationTarget {
            index: found.index,
            pane: found.pane,
            container_id: found.container_id.clone(),
            block_id: self.view(found.pane).block_id(found.block),
            expanded,
            counter: self.search.counter_label(),
        }
    }
}
