//! Shared application state: the two store client handles, constructed once
//! at startup and passed to every handler. Keeping them behind trait objects
//! lets tests swap in in-memory fakes.

use crate::stores::{BlobStore, MetadataStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub blob: Arc<dyn BlobStore>,
    pub metadata: Arc<dyn MetadataStore>,
}

impl AppState {
    pub fn new(blob: Arc<dyn BlobStore>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self { blob, metadata }
    }
}
