// src/alignment.rs
// Pairs sections across the two documents so toggles and search expansion
// can be mirrored. Titles are aligned with an LCS; unmatched runs sitting
// in the same place on both sides are paired positionally as renames.

use serde::Serialize;
use similar::{capture_diff_slices, Algorithm, DiffOp};

use crate::models::{Pane, Section, SectionKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairKind {
    /// Same title on both sides
    Matched,
    /// Different titles at the same position in the outline
    Renamed,
    OnlyOriginal,
    OnlyCustomized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionPair {
    pub original: Option<SectionKey>,
    pub customized: Option<SectionKey>,
    pub kind: PairKind,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SectionAlignment {
    pub pairs: Vec<SectionPair>,
}

impl SectionAlignment {
    /// The section paired with `key` on the other side, if any
    pub fn partner(&self, pane: Pane, key: &SectionKey) -> Option<&SectionKey> {
        self.pairs.iter().find_map(|pair| match pane {
            Pane::Original if pair.original.as_ref() == Some(key) => pair.customized.as_ref(),
            Pane::Customized if pair.customized.as_ref() == Some(key) => pair.original.as_ref(),
            _ => None,
        })
    }

    pub fn count(&self, kind: PairKind) -> usize {
        self.pairs.iter().filter(|pair| pair.kind == kind).count()
    }
}

pub fn align_sections(original: &[Section], customized: &[Section]) -> SectionAlignment {
    let old_titles: Vec<&str> = original.iter().map(|s| s.title.as_str()).collect();
    let new_titles: Vec<&str> = customized.iter().map(|s| s.title.as_str()).collect();

    let mut pairs = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, &old_titles, &new_titles) {
        match op {
            DiffOp::Equal {
                old_index,
                new_index,
                len,
            } => {
                for offset in 0..len {
                    pairs.push(SectionPair {
                        original: Some(original[old_index + offset].key()),
                        customized: Some(customized[new_index + offset].key()),
                        kind: PairKind::Matched,
                    });
                }
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                for section in &original[old_index..old_index + old_len] {
                    pairs.push(only(Pane::Original, section));
                }
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                for section in &customized[new_index..new_index + new_len] {
                    pairs.push(only(Pane::Customized, section));
                }
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                let paired = old_len.min(new_len);
                for offset in 0..paired {
                    pairs.push(SectionPair {
                        original: Some(original[old_index + offset].key()),
                        customized: Some(customized[new_index + offset].key()),
                        kind: PairKind::Renamed,
                    });
                }
                for section in &original[old_index + paired..old_index + old_len] {
                    pairs.push(only(Pane::Original, section));
                }
                for section in &customized[new_index + paired..new_index + new_len] {
                    pairs.push(only(Pane::Customized, section));
                }
            }
        }
    }

    SectionAlignment { pairs }
}

fn only(pane: Pane, section: &Section) -> SectionPair {
    match pane {
        Pane::Original => SectionPair {
            original: Some(section.key()),
            customized: None,
            kind: PairKind::OnlyOriginal,
        },
        Pane::Customized => SectionPair {
            original: None,
            customized: Some(section.key()),
            kind: PairKind::OnlyCustomized,
        },
    }
}
