//! Minimal image storage API: upload images with metadata, list/filter them,
//! fetch a temporary access link, or delete them. Handlers pass straight
//! through to a blob store and a key-value metadata store; nothing is kept
//! between requests.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod stores;
