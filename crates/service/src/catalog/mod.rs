//! Catalogue of bookable services. Submissions pass through the service form
//! schema before they reach the repository.

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::service_form::{self, ServiceFormValues};
use crate::storage::JsonMapStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub values: ServiceFormValues,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn insert(&self, record: ServiceRecord) -> Result<(), ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<ServiceRecord>, ServiceError>;
    async fn list(&self) -> Result<Vec<ServiceRecord>, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
}

/// Repository backed by `services.json` in the data directory.
pub struct JsonServiceRepository {
    store: Arc<JsonMapStore<Uuid, ServiceRecord>>,
}

impl JsonServiceRepository {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let store = JsonMapStore::open(data_dir.as_ref().join("services.json")).await?;
        Ok(Self { store })
    }
}

#[async_trait]
impl ServiceRepository for JsonServiceRepository {
    async fn insert(&self, record: ServiceRecord) -> Result<(), ServiceError> {
        Ok(self.store.insert(record.id, record).await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ServiceRecord>, ServiceError> {
        Ok(self.store.get(&id).await)
    }

    async fn list(&self) -> Result<Vec<ServiceRecord>, ServiceError> {
        Ok(self.store.values().await)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.store.remove(&id).await?)
    }
}

pub struct CatalogService {
    repo: Arc<dyn ServiceRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn ServiceRepository>) -> Self { Self { repo } }

    /// Validate a raw submission and persist it. Rejections carry every field error.
    #[instrument(skip(self, raw))]
    pub async fn create(&self, raw: &Value) -> Result<ServiceRecord, ServiceError> {
        let validated = service_form::validate(raw).map_err(ServiceError::InvalidForm)?;
        let record = ServiceRecord { id: Uuid::new_v4(), values: validated.values, created_at: Utc::now() };
        self.repo.insert(record.clone()).await?;
        info!(service_id = %record.id, name = %record.values.name, price = validated.price_value, "service_created");
        Ok(record)
    }

    /// All records, newest first.
    pub async fn list(&self) -> Result<Vec<ServiceRecord>, ServiceError> {
        let mut items = self.repo.list().await?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    pub async fn get(&self, id: Uuid) -> Result<ServiceRecord, ServiceError> {
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("service"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if self.repo.delete(id).await? {
            info!(service_id = %id, "service_deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found("service"))
        }
    }

    pub async fn count(&self) -> Result<usize, ServiceError> {
        Ok(self.repo.list().await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn catalog() -> anyhow::Result<(CatalogService, std::path::PathBuf)> {
        let dir = std::env::temp_dir().join(format!("catalog_{}", Uuid::new_v4()));
        let repo = JsonServiceRepository::open(&dir).await?;
        Ok((CatalogService::new(Arc::new(repo)), dir))
    }

    fn yoga() -> Value {
        json!({
            "name": "Yoga Class",
            "description": "A relaxing session",
            "price": "25.50",
            "isBookable": true,
            "depositPercentage": "20"
        })
    }

    #[tokio::test]
    async fn create_list_get_delete() -> anyhow::Result<()> {
        let (catalog, dir) = catalog().await?;
        let first = catalog.create(&yoga()).await?;
        let mut second_raw = yoga();
        second_raw["name"] = json!("Pilates");
        let second = catalog.create(&second_raw).await?;

        let listed = catalog.list().await?;
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
        assert_eq!(catalog.get(first.id).await?.values.name, "Yoga Class");

        catalog.delete(second.id).await?;
        assert!(matches!(catalog.delete(second.id).await, Err(ServiceError::NotFound(_))));
        assert_eq!(catalog.count().await?, 1);

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn invalid_submission_is_not_persisted() -> anyhow::Result<()> {
        let (catalog, dir) = catalog().await?;
        let mut raw = yoga();
        raw["price"] = json!("0");
        match catalog.create(&raw).await {
            Err(ServiceError::InvalidForm(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "price");
            }
            other => panic!("expected InvalidForm, got {other:?}"),
        }
        assert_eq!(catalog.count().await?, 0);
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[test]
    fn record_serializes_flat_camel_case() {
        let values: ServiceFormValues = serde_json::from_value(yoga()).unwrap();
        let record = ServiceRecord { id: Uuid::nil(), values, created_at: Utc::now() };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["isBookable"], json!(true));
        assert_eq!(json["depositPercentage"], json!("20"));
        assert!(json.get("createdAt").is_some());
    }
}
