//! Represents a stored image: the only entity in the system.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Metadata record for one uploaded image.
///
/// The id pairs this record with the blob stored under `{image_id}.jpg`;
/// the pairing is by convention, not a transaction. Metadata is kept in the
/// serialized form it was written with and is never decoded on the way out.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct ImageRecord {
    /// Server-generated opaque identifier (v4 UUID). Immutable once created.
    #[serde(rename = "imageId")]
    pub image_id: String,

    /// Caller-supplied metadata document, serialized as JSON text.
    pub metadata: String,
}
