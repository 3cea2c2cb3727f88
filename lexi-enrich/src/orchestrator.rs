//! Word supplementation orchestrator
//!
//! `supplement` runs in three phases so that no database transaction spans
//! a network call:
//! 1. Read: hydrate the canonical view from the enrichment cache
//! 2. Fetch: consult each stale or absent source in configured order
//! 3. Write: validate the merged word, then write back in one transaction
//!
//! A failing or slow source only loses its own contribution; the request
//! still returns a best-effort word.

use crate::cache::OuterSourceCache;
use crate::config::EnrichmentConfig;
use crate::error::{EnrichError, EnrichResult};
use crate::freshness::{Clock, Freshness, SystemClock};
use crate::merge::CanonicalEnrichment;
use crate::types::{EnrichmentSource, FacetKind, SourceError, Word};
use crate::validators::validate_word;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened with one source during a `supplement` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    /// Everything the source contributed before is still fresh
    Skipped,
    Fetched {
        new_values: usize,
    },
    /// Source unavailable; its contribution was dropped for this request
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: String,
    #[serde(flatten)]
    pub status: SourceStatus,
}

/// Per-source outcomes, in call order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupplementReport {
    pub sources: Vec<SourceReport>,
}

impl SupplementReport {
    pub fn status_of(&self, source: &str) -> Option<&SourceStatus> {
        self.sources
            .iter()
            .find(|r| r.source == source)
            .map(|r| &r.status)
    }

    pub fn fetched_count(&self) -> usize {
        self.count(|s| matches!(s, SourceStatus::Fetched { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|s| matches!(s, SourceStatus::Skipped))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, SourceStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&SourceStatus) -> bool) -> usize {
        self.sources.iter().filter(|r| pred(&r.status)).count()
    }

    fn push(&mut self, source: &str, status: SourceStatus) {
        self.sources.push(SourceReport {
            source: source.to_string(),
            status,
        });
    }
}

/// Enriched word plus how each source was handled
#[derive(Debug, Clone, Serialize)]
pub struct SupplementOutcome {
    pub word: Word,
    pub report: SupplementReport,
}

pub struct WordSupplementationService {
    cache: OuterSourceCache,
    sources: Vec<Arc<dyn EnrichmentSource>>,
    config: EnrichmentConfig,
    clock: Arc<dyn Clock>,
}

impl WordSupplementationService {
    pub fn new(
        pool: SqlitePool,
        sources: Vec<Arc<dyn EnrichmentSource>>,
        config: EnrichmentConfig,
    ) -> Self {
        Self {
            cache: OuterSourceCache::new(pool, config.max_lock_wait_ms),
            sources,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock used for staleness decisions
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cache(&self) -> &OuterSourceCache {
        &self.cache
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Enrich `word` from the cache and any stale sources
    ///
    /// # Errors
    /// - `EnrichError::Validation` if the merged word breaks an invariant
    ///   (nothing is written back)
    /// - `EnrichError::Persistence` if the cache read or write-back fails
    pub async fn supplement(&self, word: Word) -> EnrichResult<SupplementOutcome> {
        let now = self.clock.now();
        let mut enrichment = CanonicalEnrichment::new(word);

        self.cache.merge_from_outer_source(&mut enrichment).await?;

        let mut report = SupplementReport::default();
        for source in &self.sources {
            let status = self.consult(source.as_ref(), &mut enrichment, now).await;
            report.push(source.name(), status);
        }

        let issues = validate_word(&enrichment.to_word());
        if !issues.is_empty() {
            warn!(
                word = %enrichment.word_value(),
                issues = issues.len(),
                "Merged word failed validation, nothing written back"
            );
            return Err(EnrichError::Validation(
                issues.iter().map(ToString::to_string).collect(),
            ));
        }

        self.cache.save_data_from_outer_source(&enrichment).await?;

        info!(
            word = %enrichment.word_value(),
            fetched = report.fetched_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "Word supplemented"
        );

        Ok(SupplementOutcome {
            word: enrichment.into_word(),
            report,
        })
    }

    /// `supplement` without the report
    pub async fn supplement_word(&self, word: Word) -> EnrichResult<Word> {
        Ok(self.supplement(word).await?.word)
    }

    /// Remove example cache rows whose origin no word uses any more
    pub async fn cleanup_orphaned_example_cache(&self) -> EnrichResult<u64> {
        Ok(self.cache.delete_unused_outer_source_examples().await?)
    }

    async fn consult(
        &self,
        source: &dyn EnrichmentSource,
        enrichment: &mut CanonicalEnrichment,
        now: DateTime<Utc>,
    ) -> SourceStatus {
        let freshness = self.source_freshness(source, enrichment, now);
        if !freshness.needs_fetch() {
            debug!(
                word = %enrichment.word_value(),
                source = source.name(),
                "Source data fresh, skipping"
            );
            return SourceStatus::Skipped;
        }

        debug!(
            word = %enrichment.word_value(),
            source = source.name(),
            ?freshness,
            "Fetching from source"
        );

        let snapshot = enrichment.to_word();
        let fetched = tokio::time::timeout(self.config.source_timeout, source.supplement(&snapshot))
            .await
            .unwrap_or(Err(SourceError::Timeout(self.config.source_timeout)));

        match fetched {
            Ok(contribution) => {
                let summary = enrichment.merge(&contribution);
                SourceStatus::Fetched {
                    new_values: summary.new_values,
                }
            }
            Err(e) => {
                warn!(
                    word = %enrichment.word_value(),
                    source = source.name(),
                    error = %e,
                    "Source unavailable, continuing without it"
                );
                SourceStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Worst state across the declared facet kinds the source has data for
    ///
    /// Kinds the source never returned anything for do not count. A source
    /// with no provenance on any applicable kind is Absent.
    fn source_freshness(
        &self,
        source: &dyn EnrichmentSource,
        enrichment: &CanonicalEnrichment,
        now: DateTime<Utc>,
    ) -> Freshness {
        let applicable: Vec<FacetKind> = source
            .facets()
            .iter()
            .copied()
            .filter(|kind| *kind != FacetKind::Example || enrichment.facet_len(FacetKind::Example) > 0)
            .collect();
        if applicable.is_empty() {
            return Freshness::Fresh;
        }

        let states: Vec<Freshness> = applicable
            .iter()
            .filter_map(|kind| {
                enrichment.freshness(*kind, source.name(), now, self.config.staleness_days)
            })
            .collect();

        if states.is_empty() || states.contains(&Freshness::Absent) {
            Freshness::Absent
        } else if states.contains(&Freshness::Stale) {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }
}
