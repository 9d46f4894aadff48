// src/document.rs
//! Plain-text extraction of a resume.
//!
//! Comparison works on plain text only. Rendered HTML is reduced to text by
//! dropping script/style subtrees, turning block-level tags into line breaks
//! and stripping everything else. `<h1>`..`<h3>` keep their level as a
//! Markdown prefix so heading detection still sees them.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::{Captures, Regex};
use serde::Serialize;

use crate::error::Result;

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").expect("valid regex")
});
static HEADING_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h([1-3])\b[^>]*>").expect("valid regex"));
static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</?(p|div|li|ul|ol|h[1-6]|tr|table|section|header|footer|article|pre|blockquote)\b[^>]*>")
        .expect("valid regex")
});
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[0-9]+|#[xX][0-9A-Fa-f]+|[A-Za-z][A-Za-z0-9]*);").expect("valid regex")
});
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentText {
    text: String,
}

impl DocumentText {
    pub fn from_plain(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Reduce rendered HTML to the plain text the diff runs on
    pub fn from_html(html: &str) -> Self {
        let without_code = SCRIPT_STYLE.replace_all(html, "");
        let headings = HEADING_OPEN.replace_all(&without_code, |caps: &Captures| {
            let level = caps[1].parse::<usize>().unwrap_or(1);
            format!("\n{} ", "#".repeat(level))
        });
        let broken = BLOCK_BREAK.replace_all(&headings, "\n");
        let stripped = ANY_TAG.replace_all(&broken, "");
        let decoded = decode_entities(&stripped);

        let lines: Vec<&str> = decoded.lines().map(str::trim).collect();
        let joined = lines.join("\n");
        let collapsed = BLANK_RUN.replace_all(joined.trim_matches('\n'), "\n\n");

        Self {
            text: collapsed.into_owned(),
        }
    }

    /// Read a file, using HTML extraction for `.html`/`.htm` paths
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let is_html = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
            .unwrap_or(false);

        if is_html {
            log::debug!("Extracting text from HTML input {}", path.display());
            Ok(Self::from_html(&content))
        } else {
            Ok(Self::from_plain(content))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Decode named and numeric character references in one pass, so
/// "&amp;lt;" becomes "&lt;". Unknown references and bare `&` stay as written.
fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let raw = &caps[0];
            match unescape_with(raw, resolve_html5_entity) {
                Ok(decoded) => decoded.replace('\u{a0}', " "),
                Err(e) => {
                    log::debug!("Keeping undecodable reference {}: {}", raw, e);
                    raw.to_string()
                }
            }
        })
        .into_owned()
}
