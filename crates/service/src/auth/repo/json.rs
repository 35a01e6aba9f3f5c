use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials, Role};
use crate::auth::errors::AuthError;
use crate::auth::repository::AccountRepository;
use crate::storage::JsonMapStore;

/// Account repository persisted as two JSON files under a data directory:
/// `accounts.json` (email -> user) and `credentials.json` (user id -> hash).
pub struct JsonAccountRepository {
    users: Arc<JsonMapStore<String, AuthUser>>,
    creds: Arc<JsonMapStore<Uuid, Credentials>>,
}

impl JsonAccountRepository {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, AuthError> {
        let dir = data_dir.as_ref();
        let users = JsonMapStore::open(dir.join("accounts.json")).await?;
        let creds = JsonMapStore::open(dir.join("credentials.json")).await?;
        Ok(Self { users, creds })
    }
}

#[async_trait]
impl AccountRepository for JsonAccountRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(self.users.get(&email.to_lowercase()).await)
    }

    async fn create_user(&self, email: &str, name: &str, role: Role) -> Result<AuthUser, AuthError> {
        let key = email.to_lowercase();
        let user = AuthUser { id: Uuid::new_v4(), email: key.clone(), name: name.to_string(), role };
        if !self.users.insert_new(key, user.clone()).await? {
            return Err(AuthError::Conflict);
        }
        Ok(user)
    }

    async fn delete_user(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self.users.remove(&email.to_lowercase()).await?)
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        Ok(self.creds.get(&user_id).await)
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = Credentials { user_id, password_hash, password_algorithm };
        self.creds.insert(user_id, c.clone()).await?;
        Ok(c)
    }
}
