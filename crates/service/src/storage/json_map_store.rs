use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};
use tracing::error;

use super::StorageError;

/// JSON file-backed key-value map.
///
/// The whole map lives in memory behind a `RwLock` and is rewritten to disk
/// after each mutation. Suitable for account and catalogue data of a single
/// small deployment.
pub struct JsonMapStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Open the store at `path`, creating the file with an empty map if missing.
    /// A file that exists but fails to parse is an error; it is never overwritten.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StorageError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                error!(path = %file_path.display(), error = %e, "store file is corrupt");
                e
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: HashMap<K, V> = HashMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty)?).await?;
                empty
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    async fn save(&self, map: &HashMap<K, V>) -> Result<(), StorageError> {
        let data = serde_json::to_vec(map)?;
        fs::write(&self.file_path, data).await?;
        Ok(())
    }

    pub async fn values(&self) -> Vec<V> {
        let map = self.inner.read().await;
        map.values().cloned().collect()
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Insert or replace a value and persist.
    pub async fn insert(&self, key: K, value: V) -> Result<(), StorageError> {
        let mut map = self.inner.write().await;
        map.insert(key, value);
        self.save(&map).await
    }

    /// Insert only when the key is absent; returns `false` if it already existed.
    /// Check and insert happen under one write lock.
    pub async fn insert_new(&self, key: K, value: V) -> Result<bool, StorageError> {
        let mut map = self.inner.write().await;
        if map.contains_key(&key) {
            return Ok(false);
        }
        map.insert(key, value);
        self.save(&map).await?;
        Ok(true)
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, StorageError> {
        let mut map = self.inner.write().await;
        let existed = map.remove(key).is_some();
        if existed {
            self.save(&map).await?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn json_map_store_persists_across_reopen() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::<String, String>::open(&tmp).await?;
        assert!(store.is_empty().await);

        store.insert("a".into(), "1".into()).await?;
        assert!(store.insert_new("b".into(), "2".into()).await?);
        assert!(!store.insert_new("b".into(), "3".into()).await?);
        assert_eq!(store.get(&"b".into()).await.as_deref(), Some("2"));

        assert!(store.remove(&"a".into()).await?);
        assert!(!store.remove(&"a".into()).await?);

        let reopened = JsonMapStore::<String, String>::open(&tmp).await?;
        assert_eq!(reopened.len().await, 1);
        assert_eq!(reopened.get(&"b".into()).await.as_deref(), Some("2"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_rejected_and_left_intact() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::<String, String>::open(&tmp).await?;
        store.insert("alice".into(), "hash-a".into()).await?;
        store.insert("bob".into(), "hash-b".into()).await?;
        drop(store);

        let mut bytes = tokio::fs::read(&tmp).await?;
        bytes.extend_from_slice(b" x");
        tokio::fs::write(&tmp, &bytes).await?;

        let reopened = JsonMapStore::<String, String>::open(&tmp).await;
        assert!(matches!(reopened, Err(StorageError::Serde(_))));
        assert_eq!(tokio::fs::read(&tmp).await?, bytes);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_path_is_an_io_error() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("json_map_store_{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await?;
        // Reading a directory fails with something other than NotFound.
        let opened = JsonMapStore::<String, String>::open(&dir).await;
        assert!(matches!(opened, Err(StorageError::Io(_))));
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
