use crate::stores::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Handler-level failure, split by origin so each maps deliberately to the
/// response envelope instead of through a catch-all boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing request input. Store clients are never invoked.
    #[error("bad input: {0}")]
    BadInput(String),

    /// Any failure reported by the blob or metadata store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    /// Every handler failure becomes a uniform 400 with a non-specific
    /// message; the underlying cause is logged here and goes no further.
    fn into_response(self) -> Response {
        match &self {
            ApiError::BadInput(reason) => tracing::warn!("rejecting request: {}", reason),
            ApiError::Store(err) => tracing::error!("store call failed: {}", err),
        }

        let body = Json(json!({ "error": "Something went wrong" }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

/// Fallback for (method, path) pairs outside the routing table.
pub async fn not_found() -> Response {
    let body = Json(json!({ "error": "Not Found" }));
    (StatusCode::NOT_FOUND, body).into_response()
}
