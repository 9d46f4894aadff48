// src/search.rs
//! Incremental multi-match search across the two panes.

use std::time::{Duration, Instant};

use regex::RegexBuilder;
use serde::Serialize;

use crate::models::{Pane, SearchScope};
use crate::outline::PaneView;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

/// One located occurrence of the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub pane: Pane,
    pub container_id: String,
    /// Index of the owning block in its pane
    pub block: usize,
    /// Byte offsets into the block text
    pub start: usize,
    pub end: usize,
    /// Position in the combined navigation order
    pub index: usize,
}

/// Holds back input until it has been stable for `delay`.
///
/// Time is passed in by the caller; a newer input replaces the pending one
/// and restarts the delay.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn input(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some((value.into(), now + self.delay));
    }

    /// Take the pending value once its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = matches!(&self.pending, Some((_, deadline)) if *deadline <= now);
        if !due {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// Case-insensitive, non-overlapping occurrences of `query` in every block
/// of `view`, as `(block, start, end)`.
pub fn find_in_pane(view: &PaneView, query: &str) -> Vec<(usize, usize, usize)> {
    let pattern = match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(e) => {
            log::warn!("Search pattern rejected: {}", e);
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    for (idx, block) in view.blocks.iter().enumerate() {
        let text = block.text();
        for m in pattern.find_iter(&text) {
            found.push((idx, m.start(), m.end()));
        }
    }
    found
}

#[derive(Debug, Clone)]
pub struct SearchState {
    scope: SearchScope,
    min_query_len: usize,
    query: Option<String>,
    matches: Vec<SearchMatch>,
    current: Option<usize>,
}

impl SearchState {
    pub fn new(scope: SearchScope, min_query_len: usize) -> Self {
        Self {
            scope,
            min_query_len,
            query: None,
            matches: Vec::new(),
            current: None,
        }
    }

    /// Search the in-scope panes. Queries shorter than the minimum clear
    /// everything instead. Returns the match count.
    pub fn run(&mut self, query: &str, original: &PaneView, customized: &PaneView) -> usize {
        self.clear();
        if query.chars().count() < self.min_query_len {
            return 0;
        }

        for &pane in self.scope.panes() {
            let view = match pane {
                Pane::Original => original,
                Pane::Customized => customized,
            };
            for (block, start, end) in find_in_pane(view, query) {
                let index = self.matches.len();
                self.matches.push(SearchMatch {
                    pane,
                    container_id: pane.container_id().to_string(),
                    block,
                    start,
                    end,
                    index,
                });
            }
        }

        self.query = Some(query.to_string());
        if !self.matches.is_empty() {
            self.current = Some(0);
        }
        log::debug!("Search {:?}: {} matches", query, self.matches.len());
        self.matches.len()
    }

    pub fn next(&mut self) -> Option<&SearchMatch> {
        self.step(true)
    }

    pub fn previous(&mut self) -> Option<&SearchMatch> {
        self.step(false)
    }

    fn step(&mut self, forward: bool) -> Option<&SearchMatch> {
        let total = self.matches.len();
        if total == 0 {
            return None;
        }
        let next = match (self.current, forward) {
            (None, true) => 0,
            (None, false) => total - 1,
            (Some(idx), true) => (idx + 1) % total,
            (Some(idx), false) => (idx + total - 1) % total,
        };
        self.current = Some(next);
        self.matches.get(next)
    }

    /// Drop all matches and the remembered query
    pub fn clear(&mut self) {
        self.query = None;
        self.matches.clear();
        self.current = None;
    }

    /// Change the scope; returns whether it actually changed
    pub fn set_scope(&mut self, scope: SearchScope) -> bool {
        let changed = self.scope != scope;
        self.scope = scope;
        changed
    }

    pub fn scope(&self) -> SearchScope {
        self.scope
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn current(&self) -> Option<&SearchMatch> {
        self.current.and_then(|idx| self.matches.get(idx))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn matches_in(&self, pane: Pane) -> impl Iterator<Item = &SearchMatch> {
        self.matches.iter().filter(move |m| m.pane == pane)
    }

    /// Counter text, e.g. "2 of 5"
    pub fn counter_label(&self) -> String {
        match (self.current, self.matches.len()) {
            (_, 0) => "No matches".to_string(),
            (Some(idx), total) => format!("{} of {}", idx + 1, total),
            (None, total) => format!("{} matches", total),
        }
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(SearchScope::Both, DEFAULT_MIN_QUERY_LEN)
    }
}
