//! Word supplementation endpoint

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use crate::db::load_word;
use crate::error::{ApiError, ApiResult};
use crate::orchestrator::SupplementOutcome;
use crate::AppState;

/// POST /words/:id/supplement
///
/// Enriches the stored word from the cache and any stale sources.
/// Returns the enriched word and the per-source report.
pub async fn supplement_word(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SupplementOutcome>> {
    let word_id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("invalid word id '{}'", id)))?;

    let word = load_word(&state.db, word_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("word {}", word_id)))?;

    match state.service.supplement(word).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            state.record_error(&e).await;
            Err(e.into())
        }
    }
}

pub fn word_routes() -> Router<AppState> {
    Router::new().route("/words/:id/supplement", post(supplement_word))
}
