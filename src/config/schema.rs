//! Configuration data structures for sitesearch.
//!
//! Defines the YAML config format: database location, rebuild run settings,
//! and console behavior. Every section has defaults, so an empty file is a
//! valid config.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSearchConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub reindex: ReindexConfig,

    #[serde(default)]
    pub console: ConsoleConfig,
}

// ---------------------------------------------------------------------------
// DatabaseConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite content database.
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// ReindexConfig
// ---------------------------------------------------------------------------

/// How a run computes the `total` it reports alongside `done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    /// Count the elements up front, inside the run transaction.
    #[default]
    Counted,
    /// No pre-pass; `total` is reported as 0 (unknown).
    Streaming,
}

impl ProgressMode {
    /// Parse from a loose string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "counted" | "count" => Some(Self::Counted),
            "streaming" | "stream" | "indeterminate" => Some(Self::Streaming),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Counted => "counted",
            Self::Streaming => "streaming",
        }
    }
}

impl std::fmt::Display for ProgressMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rebuild run settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexConfig {
    #[serde(default)]
    pub progress_mode: ProgressMode,

    /// Report progress after every N indexed elements. Progress is also
    /// reported at the end of every site regardless.
    #[serde(default = "default_report_every")]
    pub report_every: u64,
}

impl Default for ReindexConfig {
    fn default() -> Self {
        Self {
            progress_mode: ProgressMode::Counted,
            report_every: default_report_every(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConsoleConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Hide the progress bar and status lines; errors are still printed.
    #[serde(default)]
    pub quiet: bool,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_db_path() -> String {
    "sitesearch.db".to_string()
}

fn default_report_every() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
