//! Enrichment cache
//!
//! Durable store of what external sources returned, with provenance.
//! Reads hydrate a `CanonicalEnrichment`; write-back persists its
//! provenance rows in a single transaction.
//!
//! **Keys:**
//! - Shared facets: normalized word value (shared across users)
//! - Examples: word id (per user)

pub mod examples;
pub mod shared;

use crate::merge::CanonicalEnrichment;
use crate::utils::{begin_monitored, retry_on_lock};
use lexi_common::Result;
use shared::SharedFacetTable;
use sqlx::SqlitePool;
use tracing::{debug, info};

#[derive(Clone)]
pub struct OuterSourceCache {
    pool: SqlitePool,
    max_lock_wait_ms: u64,
}

/// Rows prepared for write-back before any connection is taken
struct PreparedWrite {
    word_id: uuid::Uuid,
    word_value: String,
    shared: Vec<(SharedFacetTable, Vec<shared::SharedFacetRow>)>,
    examples: Vec<examples::ExampleRow>,
}

impl OuterSourceCache {
    pub fn new(pool: SqlitePool, max_lock_wait_ms: u64) -> Self {
        Self {
            pool,
            max_lock_wait_ms,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Fold every cached row for this word into `enrichment`
    ///
    /// Cached examples whose origin the word no longer has are skipped.
    pub async fn merge_from_outer_source(&self, enrichment: &mut CanonicalEnrichment) -> Result<()> {
        let word_value = enrichment.normalized_word_value();
        let word_id = enrichment.word_id();

        let mut tx = begin_monitored(&self.pool, "cache::merge_from_outer_source").await?;

        let mut shared_rows = Vec::with_capacity(SharedFacetTable::ALL.len());
        for table in SharedFacetTable::ALL {
            let rows = shared::load_rows(tx.conn()?, table, &word_value).await?;
            shared_rows.push((table, rows));
        }
        let example_rows = examples::load_rows(tx.conn()?, word_id).await?;

        tx.commit().await?;

        let mut applied = 0;
        for (table, rows) in shared_rows {
            applied += shared::hydrate(enrichment, table, rows);
        }
        let example_count = example_rows.len();
        let unmatched = examples::hydrate(enrichment, example_rows);

        debug!(
            word = %word_value,
            shared_rows = applied,
            example_rows = example_count,
            unmatched_examples = unmatched,
            "Hydrated enrichment from cache"
        );

        Ok(())
    }

    /// Persist `enrichment`'s provenance
    ///
    /// Shared facets are fully replaced for the word value. Example rows are
    /// upserted, so rows from sources not fetched this time survive.
    pub async fn save_data_from_outer_source(&self, enrichment: &CanonicalEnrichment) -> Result<()> {
        let prepared = PreparedWrite {
            word_id: enrichment.word_id(),
            word_value: enrichment.normalized_word_value(),
            shared: SharedFacetTable::ALL
                .into_iter()
                .map(|table| (table, shared::rows_for(enrichment, table)))
                .collect(),
            examples: examples::rows_for(enrichment),
        };

        retry_on_lock("cache::save_data_from_outer_source", self.max_lock_wait_ms, || {
            self.write_back(&prepared)
        })
        .await?;

        debug!(
            word = %prepared.word_value,
            shared_rows = prepared.shared.iter().map(|(_, rows)| rows.len()).sum::<usize>(),
            example_rows = prepared.examples.len(),
            "Enrichment cache written"
        );

        Ok(())
    }

    async fn write_back(&self, prepared: &PreparedWrite) -> Result<()> {
        let mut tx = begin_monitored(&self.pool, "cache::save_data_from_outer_source").await?;

        for (table, rows) in &prepared.shared {
            shared::replace_rows(tx.conn()?, *table, &prepared.word_value, rows).await?;
        }
        examples::upsert_rows(tx.conn()?, prepared.word_id, &prepared.examples).await?;

        tx.commit().await
    }

    /// Delete example rows no longer referenced by any word's examples
    pub async fn delete_unused_outer_source_examples(&self) -> Result<u64> {
        let removed = retry_on_lock(
            "cache::delete_unused_outer_source_examples",
            self.max_lock_wait_ms,
            || self.delete_unused_once(),
        )
        .await?;

        info!(removed, "Removed unused example cache rows");
        Ok(removed)
    }

    async fn delete_unused_once(&self) -> Result<u64> {
        let mut tx = begin_monitored(&self.pool, "cache::delete_unused_outer_source_examples").await?;
        let removed = examples::delete_unused(tx.conn()?).await?;
        tx.commit().await?;
        Ok(removed)
    }
}
