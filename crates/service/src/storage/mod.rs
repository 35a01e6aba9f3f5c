//! Storage abstractions for the service layer
//!
//! `json_map_store` persists small maps as JSON files (accounts, catalogue);
//! `blob` is the file/object storage capability used for service images.

pub mod blob;
pub mod json_map_store;

use thiserror::Error;

pub use blob::{init_blob_store, BlobStore, LocalBlobStore, StoredBlob};
pub use json_map_store::JsonMapStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid blob key: {0}")]
    InvalidKey(String),
    #[error("invalid storage config: {0}")]
    Config(String),
}
