//! In-memory store implementations. Used by tests to exercise handlers
//! without disk or a database, and handy for local experiments.

use super::{BlobStore, MetadataStore, StoreError, StoreResult};
use crate::models::image::ImageRecord;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Mutex,
    time::Duration,
};

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, data: Bytes) -> StoreResult<()> {
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::BlobNotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn presigned_url(&self, key: &str, expires_in: Duration) -> StoreResult<String> {
        let expires_at = Utc::now().timestamp() + expires_in.as_secs() as i64;
        Ok(format!("memory://blobs/{}?expires={}", key, expires_at))
    }
}

#[derive(Default)]
pub struct MemoryMetadataStore {
    records: Mutex<BTreeMap<String, String>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, image_id: &str) -> bool {
        self.records.lock().unwrap().contains_key(image_id)
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn put(&self, image_id: &str, metadata: &str) -> StoreResult<()> {
        self.records
            .lock()
            .unwrap()
            .insert(image_id.to_string(), metadata.to_string());
        Ok(())
    }

    async fn scan(&self) -> StoreResult<Vec<ImageRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|(image_id, metadata)| ImageRecord {
                image_id: image_id.clone(),
                metadata: metadata.clone(),
            })
            .collect())
    }

    async fn delete(&self, image_id: &str) -> StoreResult<()> {
        self.records.lock().unwrap().remove(image_id);
        Ok(())
    }
}
