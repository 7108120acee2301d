//! SQLite-backed metadata store. One row per image: the id and the metadata
//! document serialized as text, exactly as supplied at upload time.

use super::{MetadataStore, StoreResult};
use crate::models::image::ImageRecord;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct SqliteMetadataStore {
    db: Arc<SqlitePool>,
}

impl SqliteMetadataStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    /// Upsert by image id. Ids are server-generated UUIDs, so a conflict
    /// only happens if the same id is written twice deliberately.
    async fn put(&self, image_id: &str, metadata: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO images (image_id, metadata) VALUES (?, ?)
             ON CONFLICT(image_id) DO UPDATE SET metadata = excluded.metadata",
        )
        .bind(image_id)
        .bind(metadata)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    async fn scan(&self) -> StoreResult<Vec<ImageRecord>> {
        let records = sqlx::query_as::<_, ImageRecord>(
            "SELECT image_id, metadata FROM images ORDER BY image_id",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(records)
    }

    /// Unconditional delete; zero rows affected means the record was already
    /// gone, which is a success.
    async fn delete(&self, image_id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM images WHERE image_id = ?")
            .bind(image_id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }

    async fn healthy(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await?;
        Ok(())
    }
}
