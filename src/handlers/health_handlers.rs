//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that probes both store clients

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that runs each store client's own health check: a
/// lightweight query for the metadata store and a write/read/delete round
/// trip for the blob store.
///
/// Returns JSON describing each check. HTTP 200 when all checks pass,
/// HTTP 503 when any check fails.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let blob_check = match state.blob.healthy().await {
        Ok(()) => (true, None::<String>),
        Err(err) => (false, Some(format!("error: {}", err))),
    };
    let metadata_check = match state.metadata.healthy().await {
        Ok(()) => (true, None::<String>),
        Err(err) => (false, Some(format!("error: {}", err))),
    };

    let blob_ok = blob_check.0;
    let metadata_ok = metadata_check.0;
    let overall_ok = blob_ok && metadata_ok;

    let mut checks = HashMap::new();
    checks.insert(
        "blob_store",
        CheckStatus {
            ok: blob_ok,
            error: blob_check.1,
        },
    );
    checks.insert(
        "metadata_store",
        CheckStatus {
            ok: metadata_ok,
            error: metadata_check.1,
        },
    );

    let body = ReadyResponse {
        status: if overall_ok {
            "ok".into()
        } else {
            "error".into()
        },
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
