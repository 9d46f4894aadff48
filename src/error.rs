// src/error.rs
//! Error types for resume comparison.

use thiserror::Error;

/// Result type alias for comparison operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading inputs, diffing or persisting config.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The platform config directory could not be resolved.
    #[error("Could not determine config directory")]
    ConfigDir,

    /// Config file exists but is not valid TOML for [`crate::config::Config`].
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be written back as TOML.
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// The diff primitive could not produce spans.
    #[error("Diff library not loaded: {0}")]
    DiffUnavailable(String),

    /// No section with this key exists in the addressed pane.
    #[error("Unknown section: {0}")]
    UnknownSection(String),
}
