//! Defines routes for the image storage API.
//!
//! ## Structure
//! - **Image endpoints**
//!   - `POST   /images/upload` — upload payload + metadata
//!   - `GET    /images`        — list metadata records (supports filter1, filter2)
//!   - `GET    /images/{id}`   — temporary access link for one image
//!   - `DELETE /images/{id}`   — remove blob and metadata record
//!
//! - **Health endpoints** (mounted at root)
//!   - `GET /healthz`, `GET /readyz`
//!
//! The wildcard `{*id}` keeps the view/delete rows prefix-based: any path
//! under `/images/` reaches the handler, which rejects malformed identifiers
//! itself. Everything outside the table — unknown paths and known paths with
//! the wrong method alike — gets the structured 404 envelope.

use crate::{
    errors::not_found,
    handlers::{
        health_handlers::{healthz, readyz},
        image_handlers::{delete_image, list_images, upload_image, view_image},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for all image API routes.
///
/// The router carries shared state (`AppState`, the injected store client
/// handles) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // image endpoints
        .route("/images/upload", post(upload_image))
        .route("/images", get(list_images))
        .route("/images/{*id}", get(view_image).delete(delete_image))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
}
