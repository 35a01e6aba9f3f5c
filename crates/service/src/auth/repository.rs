use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials, Role};
use super::errors::AuthError;

/// Repository abstraction for account persistence. Emails are stored lowercased.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, email: &str, name: &str, role: Role) -> Result<AuthUser, AuthError>;
    /// Remove an account row; returns whether it existed.
    async fn delete_user(&self, email: &str) -> Result<bool, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAccountRepository {
        users: Mutex<HashMap<String, AuthUser>>,   // key: email
        creds: Mutex<HashMap<Uuid, Credentials>>,  // key: user_id
    }

    fn poisoned<T>(_: T) -> AuthError { AuthError::Repository("mock lock poisoned".into()) }

    #[async_trait]
    impl AccountRepository for MockAccountRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().map_err(poisoned)?;
            Ok(users.get(&email.to_lowercase()).cloned())
        }

        async fn create_user(&self, email: &str, name: &str, role: Role) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().map_err(poisoned)?;
            let key = email.to_lowercase();
            if users.contains_key(&key) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser { id: Uuid::new_v4(), email: key.clone(), name: name.to_string(), role };
            users.insert(key, user.clone());
            Ok(user)
        }

        async fn delete_user(&self, email: &str) -> Result<bool, AuthError> {
            let mut users = self.users.lock().map_err(poisoned)?;
            Ok(users.remove(&email.to_lowercase()).is_some())
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().map_err(poisoned)?;
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let mut creds = self.creds.lock().map_err(poisoned)?;
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }
    }
}
