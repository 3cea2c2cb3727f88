//! Cache maintenance endpoints
//!
//! Meant for a periodic external job; not part of the request path.

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub removed: u64,
}

/// POST /maintenance/example-cache/cleanup
pub async fn cleanup_example_cache(State(state): State<AppState>) -> ApiResult<Json<CleanupResponse>> {
    match state.service.cleanup_orphaned_example_cache().await {
        Ok(removed) => Ok(Json(CleanupResponse { removed })),
        Err(e) => {
            state.record_error(&e).await;
            Err(e.into())
        }
    }
}

pub fn maintenance_routes() -> Router<AppState> {
    Router::new().route("/maintenance/example-cache/cleanup", post(cleanup_example_cache))
}
