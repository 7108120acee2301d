//! Test helpers: build AppState and router on in-memory stores, plus
//! failure-injecting store clients for the error-envelope tests.

use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use image_store::models::image::ImageRecord;
use image_store::routes::routes::routes;
use image_store::state::AppState;
use image_store::stores::{
    BlobStore, MemoryBlobStore, MemoryMetadataStore, MetadataStore, StoreError, StoreResult,
};
use std::sync::Arc;
use std::time::Duration;

/// Test application: server plus handles on the backing fakes so tests can
/// observe what the handlers actually wrote.
pub struct TestApp {
    pub server: TestServer,
    pub blob: Arc<MemoryBlobStore>,
    pub metadata: Arc<MemoryMetadataStore>,
}

pub fn setup_test_app() -> TestApp {
    let blob = Arc::new(MemoryBlobStore::new());
    let metadata = Arc::new(MemoryMetadataStore::new());
    let state = AppState::new(blob.clone(), metadata.clone());
    let server = TestServer::new(routes().with_state(state)).expect("test server");
    TestApp {
        server,
        blob,
        metadata,
    }
}

/// Server over arbitrary store implementations.
pub fn server_with(blob: Arc<dyn BlobStore>, metadata: Arc<dyn MetadataStore>) -> TestServer {
    let state = AppState::new(blob, metadata);
    TestServer::new(routes().with_state(state)).expect("test server")
}

fn boom() -> StoreError {
    StoreError::Unavailable("injected failure: connection refused".into())
}

/// Blob store that fails every call, simulating an unreachable backend.
pub struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn put(&self, _key: &str, _data: Bytes) -> StoreResult<()> {
        Err(boom())
    }

    async fn get(&self, _key: &str) -> StoreResult<Bytes> {
        Err(boom())
    }

    async fn delete(&self, _key: &str) -> StoreResult<()> {
        Err(boom())
    }

    async fn presigned_url(&self, _key: &str, _expires_in: Duration) -> StoreResult<String> {
        Err(boom())
    }
}

/// Metadata store that fails every call.
pub struct FailingMetadataStore;

#[async_trait]
impl MetadataStore for FailingMetadataStore {
    async fn put(&self, _image_id: &str, _metadata: &str) -> StoreResult<()> {
        Err(boom())
    }

    async fn scan(&self) -> StoreResult<Vec<ImageRecord>> {
        Err(boom())
    }

    async fn delete(&self, _image_id: &str) -> StoreResult<()> {
        Err(boom())
    }
}
