//! Configuration loading.
//!
//! Sources, highest priority first:
//! 1. an explicit `--config` path
//! 2. the `SITESEARCH_CONFIG` environment variable
//! 3. `sitesearch.yaml` in the platform config directory, if present
//! 4. built-in defaults
//!
//! `SITESEARCH_DB` overrides `database.path` from whichever source won.

pub mod schema;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SiteSearchError};
use schema::SiteSearchConfig;

pub const CONFIG_ENV: &str = "SITESEARCH_CONFIG";
pub const DB_ENV: &str = "SITESEARCH_DB";
const CONFIG_FILE_NAME: &str = "sitesearch.yaml";

/// Load config from the process environment.
pub fn load_config(explicit: Option<&Path>) -> Result<SiteSearchConfig> {
    load_config_with(explicit, |key| std::env::var(key).ok(), default_config_path())
}

/// Load config with an injected environment lookup and default file path.
pub fn load_config_with(
    explicit: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
    default_path: Option<PathBuf>,
) -> Result<SiteSearchConfig> {
    let source = match (explicit, env(CONFIG_ENV)) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, Some(path)) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => default_path.filter(|p| p.exists()),
    };

    let mut config = match source {
        Some(path) => read_config_file(&path)?,
        None => SiteSearchConfig::default(),
    };

    if let Some(db) = env(DB_ENV).filter(|v| !v.is_empty()) {
        config.database.path = db;
    }
    Ok(config)
}

/// Parse one YAML config file.
pub fn read_config_file(path: &Path) -> Result<SiteSearchConfig> {
    debug!(path = %path.display(), "loading config");
    let contents = std::fs::read_to_string(path).map_err(|e| {
        SiteSearchError::Config(format!("cannot read {}: {e}", path.display()))
    })?;
    serde_yaml::from_str(&contents)
        .map_err(|e| SiteSearchError::Config(format!("invalid {}: {e}", path.display())))
}

/// `<platform config dir>/sitesearch/sitesearch.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "sitesearch")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
