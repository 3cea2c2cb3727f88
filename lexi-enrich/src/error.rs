//! Error types for lexi-enrich
//!
//! - `EnrichError`: failures surfaced by `supplement` and cache maintenance
//! - `ApiError`: HTTP mapping of those failures
//!
//! Per-source failures (`SourceError`) are recovered inside the orchestrator
//! and never reach either type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of an enrichment request
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Merged word violates a domain invariant; nothing was written back
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Cache read or write-back failed
    #[error("Persistence failure: {0}")]
    Persistence(#[from] lexi_common::Error),
}

impl From<sqlx::Error> for EnrichError {
    fn from(err: sqlx::Error) -> Self {
        EnrichError::Persistence(lexi_common::Error::Database(err))
    }
}

/// Result type for enrichment operations
pub type EnrichResult<T> = Result<T, EnrichError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Enrichment failure
    #[error(transparent)]
    Enrich(#[from] EnrichError),

    /// lexi-common error
    #[error("Common error: {0}")]
    Common(#[from] lexi_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Enrich(ref err @ EnrichError::Validation(_)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_FAILED",
                err.to_string(),
            ),
            ApiError::Enrich(ref err @ EnrichError::Persistence(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PERSISTENCE_FAILURE",
                err.to_string(),
            ),
            ApiError::Common(lexi_common::Error::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, error = %message, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
