//! Database and service fixtures

use chrono::{DateTime, Duration, Utc};
use lexi_enrich::config::EnrichmentConfig;
use lexi_enrich::freshness::FixedClock;
use lexi_enrich::types::{EnrichmentSource, Example, Word};
use lexi_enrich::WordSupplementationService;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// Fresh single-connection in-memory database with the full schema
pub async fn test_pool() -> SqlitePool {
    lexi_common::db::init_in_memory()
        .await
        .expect("in-memory database")
}

/// Clock `days` days after `base`
pub fn fixed_clock(base: DateTime<Utc>, days: i64) -> Arc<FixedClock> {
    Arc::new(FixedClock(base + Duration::days(days)))
}

/// Service over `sources` with a clock `days` after `base`
pub fn service(
    pool: &SqlitePool,
    sources: Vec<Arc<dyn EnrichmentSource>>,
    base: DateTime<Utc>,
    days: i64,
) -> WordSupplementationService {
    let config = EnrichmentConfig {
        source_timeout: std::time::Duration::from_millis(200),
        ..EnrichmentConfig::default()
    };
    WordSupplementationService::new(pool.clone(), sources, config)
        .with_clock(fixed_clock(base, days))
}

pub fn word_with_example(value: &str, origin: &str) -> Word {
    let mut word = Word::new(Uuid::new_v4(), value);
    word.examples.push(Example::new(origin));
    word
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("count query")
}
