//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `LEXI_ROOT_FOLDER` environment variable
//! 3. `root_folder` key in the TOML config file
//! 4. OS-dependent default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "LEXI_ROOT_FOLDER";

/// Environment variable pointing at the TOML config file
pub const CONFIG_PATH_ENV: &str = "LEXI_CONFIG";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "lexi.db";

/// Contents of `lexi-enrich.toml`
///
/// Every section is optional; a missing file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub logging: LoggingConfig,
    pub enrichment: EnrichmentSection,
    pub sources: Vec<SourceSection>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[enrichment]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichmentSection {
    /// Age in days after which a source's cached facets are refetched
    pub staleness_days: i64,
    /// Upper bound for a single source call
    pub source_timeout_secs: u64,
    /// Maximum time spent retrying a locked database write
    pub max_lock_wait_ms: u64,
}

impl Default for EnrichmentSection {
    fn default() -> Self {
        Self {
            staleness_days: 90,
            source_timeout_secs: 10,
            max_lock_wait_ms: 5000,
        }
    }
}

/// One `[[sources]]` entry, in call order
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSection {
    pub name: String,
    /// Endpoint with a `{word}` placeholder
    pub url_template: String,
    /// Facet kinds this source supplies; empty means all of them
    #[serde(default)]
    pub facets: Vec<String>,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_requests_per_second() -> u32 {
    1
}

impl TomlConfig {
    /// Load config from `path`, falling back to defaults if the file is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))?;

        debug!(
            path = %path.display(),
            sources = config.sources.len(),
            "Loaded TOML config"
        );
        Ok(config)
    }
}

/// Locate the TOML config file: CLI argument, then `LEXI_CONFIG`, then the
/// platform config directory
pub fn config_file_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|d| d.join("lexi").join("lexi-enrich.toml"))
}

/// Resolve the root folder following the documented priority order
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("lexi"))
        .unwrap_or_else(|| PathBuf::from("./lexi_data"))
}

/// Path of the SQLite database inside `root_folder`
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE_NAME)
}
