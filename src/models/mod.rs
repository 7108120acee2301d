//! Core data models for the image storage service.
//!
//! Entities map to the metadata store via `sqlx::FromRow` and serialize
//! naturally as JSON via `serde`.

pub mod image;
