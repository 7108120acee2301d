//! HTTP handlers for the four image operations: Upload, List, View, Delete.
//! Each handler validates its input, calls the injected store clients, and
//! maps the outcome onto the response envelope.

use crate::{errors::ApiError, models::image::ImageRecord, state::AppState, stores::blob_key};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Fixed lifetime of view links.
const VIEW_LINK_EXPIRY: Duration = Duration::from_secs(3600);

const MAX_IMAGE_ID_LEN: usize = 256;

/// Body for `POST /images/upload`.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// Image payload as a string (e.g. base64). Stored verbatim.
    pub image: String,

    /// Arbitrary metadata document, stored in serialized form.
    pub metadata: Value,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(rename = "imageId")]
    pub image_id: String,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Query params accepted by `GET /images`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub filter1: Option<String>,
    pub filter2: Option<String>,
}

/// `POST /images/upload`
///
/// Generates a fresh id, writes the payload to the blob store, then the
/// serialized metadata to the metadata store. The body is deserialized here
/// rather than by an extractor so a malformed body takes the Bad-Input path
/// with the uniform envelope and the stores untouched.
pub async fn upload_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let request: UploadRequest = serde_json::from_slice(&body)
        .map_err(|err| ApiError::BadInput(format!("undeserializable upload body: {}", err)))?;
    let metadata = serde_json::to_string(&request.metadata)
        .map_err(|err| ApiError::BadInput(format!("unserializable metadata: {}", err)))?;

    let image_id = Uuid::new_v4().to_string();
    info!("uploading image with id {}", image_id);

    // Blob first, then metadata. A metadata failure leaves the blob orphaned
    // with no cleanup; callers re-upload under a fresh id.
    state
        .blob
        .put(&blob_key(&image_id), Bytes::from(request.image))
        .await?;
    state.metadata.put(&image_id, &metadata).await?;

    Ok(Json(UploadResponse { image_id }))
}

/// `GET /images?filter1=&filter2=`
///
/// Full scan of the metadata store, narrowed by the optional filters.
/// Records come back in serialized form, never decoded.
pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ImageRecord>>, ApiError> {
    info!(
        "listing images with filters: filter1={:?}, filter2={:?}",
        query.filter1, query.filter2
    );

    let records = state.metadata.scan().await?;
    Ok(Json(apply_filters(
        records,
        query.filter1.as_deref(),
        query.filter2.as_deref(),
    )))
}

/// `GET /images/{id}`
///
/// Returns a time-limited access link for the blob key derived from the id.
/// No existence check: a link is produced even for ids never uploaded.
pub async fn view_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Json<ViewResponse>, ApiError> {
    ensure_image_id(&image_id)?;
    info!("generating access link for image {}", image_id);

    let url = state
        .blob
        .presigned_url(&blob_key(&image_id), VIEW_LINK_EXPIRY)
        .await?;
    Ok(Json(ViewResponse { url }))
}

/// `DELETE /images/{id}`
///
/// Unconditional blob delete, then metadata delete. Both stores treat
/// delete-of-absent as success, so repeated deletes return 200.
pub async fn delete_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    ensure_image_id(&image_id)?;
    info!("deleting image {}", image_id);

    state.blob.delete(&blob_key(&image_id)).await?;
    state.metadata.delete(&image_id).await?;

    Ok(Json(DeleteResponse {
        message: "Image deleted successfully".into(),
    }))
}

/// Conjunctive plain-substring narrowing over the serialized metadata text.
/// Empty filters are ignored, same as absent ones.
fn apply_filters(
    mut records: Vec<ImageRecord>,
    filter1: Option<&str>,
    filter2: Option<&str>,
) -> Vec<ImageRecord> {
    for filter in [filter1, filter2].into_iter().flatten() {
        if filter.is_empty() {
            continue;
        }
        records.retain(|record| record.metadata.contains(filter));
    }
    records
}

/// The router prefix-matches anything under `/images/`; identifiers are
/// vetted here, not there. Ids are server-generated UUID strings, so
/// anything path-like is rejected as bad input.
fn ensure_image_id(image_id: &str) -> Result<(), ApiError> {
    if image_id.is_empty() || image_id.len() > MAX_IMAGE_ID_LEN {
        return Err(ApiError::BadInput("image id has invalid length".into()));
    }
    if image_id.contains('/') || image_id.contains("..") {
        return Err(ApiError::BadInput(format!(
            "image id `{}` looks like a path",
            image_id
        )));
    }
    if image_id
        .bytes()
        .any(|b| b.is_ascii_control() || b == b'\\')
    {
        return Err(ApiError::BadInput(
            "image id contains control characters".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, metadata: &str) -> ImageRecord {
        ImageRecord {
            image_id: id.to_string(),
            metadata: metadata.to_string(),
        }
    }

    #[test]
    fn filters_are_conjunctive() {
        let records = vec![
            record("1", r#"{"tag":"alpha"}"#),
            record("2", r#"{"tag":"beta"}"#),
            record("3", r#"{"tag":"alphabet"}"#),
        ];

        let filtered = apply_filters(records, Some("alpha"), Some("bet"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].image_id, "3");
    }

    #[test]
    fn single_filter_narrows_by_substring() {
        let records = vec![
            record("1", r#"{"tag":"alpha"}"#),
            record("2", r#"{"tag":"beta"}"#),
            record("3", r#"{"tag":"alphabet"}"#),
        ];

        let filtered = apply_filters(records, Some("alpha"), None);
        let ids: Vec<_> = filtered.into_iter().map(|r| r.image_id).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn empty_filters_are_ignored() {
        let records = vec![record("1", "{}"), record("2", "{}")];
        assert_eq!(apply_filters(records, Some(""), Some("")).len(), 2);
    }

    #[test]
    fn image_id_validation() {
        assert!(ensure_image_id("6a1f0e9e-2b7c-4d3e-9f10-0123456789ab").is_ok());
        assert!(ensure_image_id("plain-id").is_ok());

        assert!(ensure_image_id("").is_err());
        assert!(ensure_image_id("a/b").is_err());
        assert!(ensure_image_id("..").is_err());
        assert!(ensure_image_id("a\\b").is_err());
        assert!(ensure_image_id(&"x".repeat(300)).is_err());
    }
}
