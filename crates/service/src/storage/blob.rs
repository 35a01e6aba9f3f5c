//! Blob storage capability for uploaded service images.
//!
//! Handlers only see `Arc<dyn BlobStore>`; the deployment decides the backend
//! once at startup through [`init_blob_store`].

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

use configs::StorageConfig;

use super::StorageError;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredBlob {
    pub key: String,
    pub url: String,
    pub size: usize,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<StoredBlob, StorageError>;
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

/// Filesystem backend: objects live under `<root>/<bucket>/<key>` and are
/// addressed publicly as `<public_base_url>/<bucket>/<key>`.
pub struct LocalBlobStore {
    dir: PathBuf,
    bucket: String,
    base_url: String,
}

impl LocalBlobStore {
    pub async fn new(cfg: &StorageConfig) -> Result<Self, StorageError> {
        Url::parse(&cfg.public_base_url)
            .map_err(|e| StorageError::Config(format!("public_base_url: {e}")))?;
        let dir = PathBuf::from(&cfg.root).join(&cfg.bucket);
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            bucket: cfg.bucket.clone(),
            base_url: cfg.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.bucket, key)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        Ok(self.dir.join(sanitize_key(key)?))
    }
}

/// Keys are relative, `/`-separated, made of `[A-Za-z0-9._-]` segments and
/// never contain `.` or `..` segments.
pub fn sanitize_key(key: &str) -> Result<&str, StorageError> {
    let invalid = || StorageError::InvalidKey(key.to_string());
    if key.is_empty() || key.starts_with('/') || key.ends_with('/') {
        return Err(invalid());
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(invalid());
        }
        if !segment.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
            return Err(invalid());
        }
    }
    Ok(key)
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<StoredBlob, StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let size = bytes.len();
        fs::write(&path, bytes).await?;
        info!(%key, size, "blob_stored");
        Ok(StoredBlob { key: key.to_string(), url: self.public_url(key), size })
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Initialize the process-wide blob store from configuration.
pub async fn init_blob_store(cfg: &StorageConfig) -> Result<Arc<dyn BlobStore>, StorageError> {
    let store = LocalBlobStore::new(cfg).await?;
    info!(root = %cfg.root, bucket = %cfg.bucket, "blob store initialized");
    Ok(Arc::new(store))
}
