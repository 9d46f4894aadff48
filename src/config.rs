// src/config.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::diff_engine::{DiffAlgorithm, DiffGranularity, SimilarDiff};
use crate::error::{Error, Result};
use crate::models::SearchScope;
use crate::outline::DEFAULT_MAX_SCAN_DEPTH;
use crate::search::{DEFAULT_DEBOUNCE, DEFAULT_MIN_QUERY_LEN};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub diff: DiffSettings,
    pub search: SearchSettings,
    pub sections: SectionSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffSettings {
    pub granularity: DiffGranularity,
    pub algorithm: DiffAlgorithm,
    /// Deadline for a single diff; past it the result gets coarser
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub debounce_ms: u64,
    pub min_query_len: usize,
    pub default_scope: SearchScope,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            default_scope: SearchScope::Both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionSettings {
    pub max_scan_depth: usize,
}

impl Default for SectionSettings {
    fn default() -> Self {
        Self {
            max_scan_depth: DEFAULT_MAX_SCAN_DEPTH,
        }
    }
}

/// Get the config directory path for the application
fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join("resume-compare"))
        .ok_or(Error::ConfigDir)
}

impl Config {
    /// Default location of the config file
    pub fn config_path() -> Result<PathBuf> {
        get_config_dir().map(|p| p.join("config.toml"))
    }

    /// Load config from the default location, return default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn diff_primitive(&self) -> SimilarDiff {
        SimilarDiff::new(
            self.diff.algorithm,
            self.diff.timeout_ms.map(Duration::from_millis),
        )
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }
}
