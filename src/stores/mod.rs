//! Store client abstractions for the two external collaborators:
//! a blob store holding image payloads and a key-value metadata store.
//!
//! Handlers only ever see these traits; concrete backends (local disk,
//! SQLite, in-memory fakes) are injected at startup or in tests.

pub mod blob;
pub mod memory;
pub mod metadata;

pub use blob::DiskBlobStore;
pub use memory::{MemoryBlobStore, MemoryMetadataStore};
pub use metadata::SqliteMetadataStore;

use crate::models::image::ImageRecord;
use async_trait::async_trait;
use bytes::Bytes;
use std::{io, time::Duration};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("blob `{0}` not found")]
    BlobNotFound(String),
    #[error("invalid blob key `{0}`")]
    InvalidKey(String),
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Blob key for an image identifier. Every backend and handler derives the
/// key through this function so the pairing with metadata records holds.
pub fn blob_key(image_id: &str) -> String {
    format!("{}.jpg", image_id)
}

/// Binary object storage keyed by string. Put/get/delete plus time-limited
/// access links. Deleting an absent key is a success.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes) -> StoreResult<()>;

    async fn get(&self, key: &str) -> StoreResult<Bytes>;

    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Generate a capability-bearing link for reading `key`, valid for
    /// `expires_in`. No existence check; links to absent blobs are fine.
    async fn presigned_url(&self, key: &str, expires_in: Duration) -> StoreResult<String>;

    /// Readiness probe: write, read back, and delete a throwaway blob.
    async fn healthy(&self) -> StoreResult<()> {
        let key = format!(".readyz-{}", Uuid::new_v4());
        self.put(&key, Bytes::from_static(b"readyz")).await?;
        let data = self.get(&key).await?;
        self.delete(&key).await?;
        if data.as_ref() != b"readyz" {
            return Err(StoreError::Unavailable(
                "probe blob content mismatch".into(),
            ));
        }
        Ok(())
    }
}

/// Key-value record store for image metadata: put/scan/delete keyed by
/// image id. Deleting an absent record is a success.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn put(&self, image_id: &str, metadata: &str) -> StoreResult<()>;

    /// Full scan; filtering is the caller's concern.
    async fn scan(&self) -> StoreResult<Vec<ImageRecord>>;

    async fn delete(&self, image_id: &str) -> StoreResult<()>;

    /// Readiness probe.
    async fn healthy(&self) -> StoreResult<()> {
        self.scan().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_key_appends_jpg_suffix() {
        assert_eq!(blob_key("abc-123"), "abc-123.jpg");
    }
}
