//! Runtime configuration for the enrichment engine
//!
//! Built from the `[enrichment]` section of the shared TOML config.

use crate::freshness::DEFAULT_STALENESS_DAYS;
use lexi_common::config::TomlConfig;
use lexi_common::{Error, Result};
use std::time::Duration;

/// Default bound on a single source call
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default total time spent retrying a locked write-back
pub const DEFAULT_MAX_LOCK_WAIT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Cached source data older than this many days is refetched
    pub staleness_days: i64,
    /// Calls exceeding this are treated as `SourceUnavailable`
    pub source_timeout: Duration,
    /// Bound for `retry_on_lock` around cache writes
    pub max_lock_wait_ms: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            staleness_days: DEFAULT_STALENESS_DAYS,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            max_lock_wait_ms: DEFAULT_MAX_LOCK_WAIT_MS,
        }
    }
}

impl EnrichmentConfig {
    /// Validate and convert the TOML section
    pub fn from_toml(config: &TomlConfig) -> Result<Self> {
        let section = &config.enrichment;

        if section.staleness_days <= 0 {
            return Err(Error::Config(format!(
                "enrichment.staleness_days must be positive, got {}",
                section.staleness_days
            )));
        }
        if section.source_timeout_secs == 0 {
            return Err(Error::Config(
                "enrichment.source_timeout_secs must be positive".to_string(),
            ));
        }

        Ok(Self {
            staleness_days: section.staleness_days,
            source_timeout: Duration::from_secs(section.source_timeout_secs),
            max_lock_wait_ms: section.max_lock_wait_ms,
        })
    }
}
