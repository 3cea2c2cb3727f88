//! lexi-enrich: external enrichment cache and merge engine for vocabulary words
//!
//! Supplements a word's transcriptions, interpretations, translations and
//! example translations from external sources, caching every source's
//! answer with provenance so sources are only re-queried once stale.

pub mod api;
pub mod cache;
pub mod config;
pub mod contribution;
pub mod db;
pub mod error;
pub mod freshness;
pub mod merge;
pub mod orchestrator;
pub mod sources;
pub mod types;
pub mod utils;
pub mod validators;

pub use crate::error::{ApiError, ApiResult, EnrichError, EnrichResult};
pub use crate::orchestrator::{SupplementOutcome, SupplementReport, WordSupplementationService};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub service: Arc<WordSupplementationService>,
    pub startup_time: DateTime<Utc>,
    /// Last server-side failure, reported by `/health`
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(db: SqlitePool, service: Arc<WordSupplementationService>) -> Self {
        Self {
            db,
            service,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember persistence failures for diagnostics
    pub async fn record_error(&self, err: &EnrichError) {
        if matches!(err, EnrichError::Persistence(_)) {
            *self.last_error.write().await = Some(err.to_string());
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::word_routes())
        .merge(api::maintenance_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
