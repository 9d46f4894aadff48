// src/lib.rs
//! Side-by-side resume comparison.
//!
//! Takes an original and a customized resume, diffs them at line and word
//! granularity, detects their section outlines, pairs sections across the
//! two documents, and exposes collapsible dual-pane views with incremental
//! search. All of it is computed from plain text; rendering is a separate
//! layer in [`render`].

pub mod alignment;
pub mod config;
pub mod diff_engine;
pub mod document;
pub mod error;
pub mod models;
pub mod outline;
pub mod render;
pub mod search;
pub mod section;
pub mod session;

pub use config::Config;
pub use diff_engine::{DiffGranularity, DiffPrimitive, SimilarDiff};
pub use document::DocumentText;
pub use error::{Error, Result};
pub use models::{DiffSpan, DiffTag, Pane, SearchScope, Section, SectionKey};
pub use outline::ViewMode;
pub use session::{Comparison, ComparisonSession, NavigationTarget};

/// Compare two plain-text documents with the default `similar` backend
pub fn compare(original: &str, customized: &str, granularity: DiffGranularity) -> Comparison {
    Comparison::compute(
        &DocumentText::from_plain(original),
        &DocumentText::from_plain(customized),
        &SimilarDiff::default(),
        granularity,
    )
}
