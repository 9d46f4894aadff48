// src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the comparison a piece of content belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pane {
    Original,
    Customized,
}

impl Pane {
    pub fn other(self) -> Pane {
        match self {
            Pane::Original => Pane::Customized,
            Pane::Customized => Pane::Original,
        }
    }

    /// Prefix used for element ids rendered inside this pane
    pub fn id_prefix(self) -> &'static str {
        match self {
            Pane::Original => "original",
            Pane::Customized => "customized",
        }
    }

    /// Id of the rendered container holding this pane's content
    pub fn container_id(self) -> &'static str {
        match self {
            Pane::Original => "original-resume-html",
            Pane::Customized => "customized-resume-html",
        }
    }
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id_prefix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffTag {
    Unchanged,
    Added,
    Removed,
}

impl DiffTag {
    /// Whether text carrying this tag is shown in `pane`
    pub fn visible_in(self, pane: Pane) -> bool {
        match (self, pane) {
            (DiffTag::Unchanged, _) => true,
            (DiffTag::Added, Pane::Customized) => true,
            (DiffTag::Removed, Pane::Original) => true,
            _ => false,
        }
    }
}

/// One contiguous run of diff output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSpan {
    pub tag: DiffTag,
    pub value: String,
}

impl DiffSpan {
    pub fn new(tag: DiffTag, value: impl Into<String>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    pub fn unchanged(value: impl Into<String>) -> Self {
        Self::new(DiffTag::Unchanged, value)
    }

    pub fn added(value: impl Into<String>) -> Self {
        Self::new(DiffTag::Added, value)
    }

    pub fn removed(value: impl Into<String>) -> Self {
        Self::new(DiffTag::Removed, value)
    }

    pub fn is_change(&self) -> bool {
        self.tag != DiffTag::Unchanged
    }

    /// Number of lines this span occupies in its document.
    /// A trailing fragment without newline counts as a line.
    pub fn line_count(&self) -> usize {
        if self.value.is_empty() {
            return 0;
        }
        let newlines = self.value.matches('\n').count();
        if self.value.ends_with('\n') {
            newlines
        } else {
            newlines + 1
        }
    }
}

/// Stable identity of a section within one document: its title plus how
/// many earlier sections in the same document carry the same title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionKey {
    pub title: String,
    pub ordinal: usize,
}

impl SectionKey {
    pub fn new(title: impl Into<String>, ordinal: usize) -> Self {
        Self {
            title: title.into(),
            ordinal,
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ordinal == 0 {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} #{}", self.title, self.ordinal + 1)
        }
    }
}

/// A heading-delimited region of a document. Line numbers are 0-based and
/// `end_line` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub level: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub ordinal: usize,
    pub modified: bool,
}

impl Section {
    pub fn key(&self) -> SectionKey {
        SectionKey::new(self.title.clone(), self.ordinal)
    }

    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        start <= self.end_line && self.start_line <= end
    }
}

/// Which panes a search covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    #[default]
    Both,
    Original,
    Customized,
}

impl SearchScope {
    pub fn includes(self, pane: Pane) -> bool {
        match self {
            SearchScope::Both => true,
            SearchScope::Original => pane == Pane::Original,
            SearchScope::Customized => pane == Pane::Customized,
        }
    }

    /// Panes in navigation order: original matches come first
    pub fn panes(self) -> &'static [Pane] {
        match self {
            SearchScope::Both => &[Pane::Original, Pane::Customized],
            SearchScope::Original => &[Pane::Original],
            SearchScope::Customized => &[Pane::Customized],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_count() {
        assert_eq!(DiffSpan::unchanged("").line_count(), 0);
        assert_eq!(DiffSpan::unchanged("abc").line_count(), 1);
        assert_eq!(DiffSpan::unchanged("abc\n").line_count(), 1);
        assert_eq!(DiffSpan::unchanged("a\nb").line_count(), 2);
        assert_eq!(DiffSpan::unchanged("a\nb\n").line_count(), 2);
    }

    #[test]
    fn test_tag_visibility() {
        assert!(DiffTag::Unchanged.visible_in(Pane::Original));
        assert!(DiffTag::Removed.visible_in(Pane::Original));
        assert!(!DiffTag::Added.visible_in(Pane::Original));
        assert!(DiffTag::Added.visible_in(Pane::Customized));
        assert!(!DiffTag::Removed.visible_in(Pane::Customized));
    }

    #[test]
    fn test_section_overlap_is_inclusive() {
        let section = Section {
            title: "SKILLS".to_string(),
            level: 1,
            start_line: 4,
            end_line: 6,
            ordinal: 0,
            modified: false,
        };
        assert!(section.overlaps(6, 9));
        assert!(section.overlaps(0, 4));
        assert!(!section.overlaps(7, 7));
        assert!(!section.overlaps(0, 3));
    }

    #[test]
    fn test_scope_order() {
        assert_eq!(SearchScope::Both.panes(), &[Pane::Original, Pane::Customized]);
        assert!(SearchScope::Customized.includes(Pane::Customized));
        assert!(!SearchScope::Customized.includes(Pane::Original));
    }
}
