use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;
use tracing::{info, debug, instrument, warn};

use super::domain::{RegisterInput, LoginInput, AuthUser, AuthSession, Role};
use super::errors::AuthError;
use super::repository::AccountRepository;
use super::token::issue_token;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub password_algorithm: String,
    /// Lowercased emails that register as `Role::Admin`.
    pub admin_emails: Vec<String>,
}

impl AuthConfig {
    pub fn from_settings(cfg: &configs::AuthConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            session_ttl_hours: cfg.session_ttl_hours,
            password_algorithm: "argon2".into(),
            admin_emails: cfg.admin_emails.clone(),
        }
    }

    fn role_for(&self, email: &str) -> Role {
        if self.admin_emails.iter().any(|e| e.eq_ignore_ascii_case(email)) { Role::Admin } else { Role::User }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AccountRepository + ?Sized> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AccountRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new account with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAccountRepository};
    /// use service::auth::domain::{RegisterInput, Role};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAccountRepository::default());
    /// let cfg = AuthConfig { jwt_secret: "secret".into(), session_ttl_hours: 1, password_algorithm: "argon2".into(), admin_emails: vec![] };
    /// let svc = AuthService::new(repo, cfg);
    /// let input = RegisterInput { email: "user@example.com".into(), name: "Test".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// assert_eq!(user.role, Role::User);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        let email = input.email.trim();
        if !email.contains('@') {
            return Err(AuthError::Validation("invalid email".into()));
        }
        if input.name.trim().is_empty() {
            return Err(AuthError::Validation("name required".into()));
        }
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
        }
        if let Some(existing) = self.repo.find_user_by_email(email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self.repo.create_user(email, input.name.trim(), self.cfg.role_for(email)).await?;
        if let Err(e) = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await {
            // An account without credentials could never log in or re-register.
            warn!(user_id = %user.id, err = %e, "credentials not saved, rolling back account");
            self.repo.delete_user(&user.email).await?;
            return Err(e);
        }
        info!(user_id = %user.id, email = %user.email, role = user.role.as_str(), "user_registered");
        Ok(user)
    }

    /// Authenticate an account and issue a session token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAccountRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAccountRepository::default());
    /// let cfg = AuthConfig { jwt_secret: "secret".into(), session_ttl_hours: 1, password_algorithm: "argon2".into(), admin_emails: vec![] };
    /// let svc = AuthService::new(repo, cfg);
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(input.email.trim())
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let token = issue_token(&self.cfg.jwt_secret, &user, self.cfg.session_ttl_hours)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAccountRepository;
    use crate::auth::token::decode_token;

    fn svc() -> AuthService<MockAccountRepository> {
        AuthService::new(
            Arc::new(MockAccountRepository::default()),
            AuthConfig {
                jwt_secret: "secret".into(),
                session_ttl_hours: 1,
                password_algorithm: "argon2".into(),
                admin_emails: vec!["boss@example.com".into()],
            },
        )
    }

    fn register(email: &str, password: &str) -> RegisterInput {
        RegisterInput { email: email.into(), name: "Name".into(), password: password.into() }
    }

    #[tokio::test]
    async fn admin_emails_get_admin_role_in_token() {
        let svc = svc();
        let user = svc.register(register("Boss@Example.com", "Passw0rd!")).await.unwrap();
        assert_eq!(user.role, Role::Admin);
        let session = svc.login(LoginInput { email: "boss@example.com".into(), password: "Passw0rd!".into() }).await.unwrap();
        let claims = decode_token("secret", &session.token).unwrap();
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.uid, user.id);
    }

    #[tokio::test]
    async fn rejects_weak_input_and_duplicates() {
        let svc = svc();
        assert!(matches!(svc.register(register("no-at-sign", "Passw0rd!")).await, Err(AuthError::Validation(_))));
        assert!(matches!(svc.register(register("a@b.com", "short")).await, Err(AuthError::Validation(_))));
        svc.register(register("a@b.com", "Passw0rd!")).await.unwrap();
        let dup = svc.register(register("a@b.com", "Passw0rd!")).await;
        assert!(matches!(dup, Err(AuthError::Conflict)));
        assert_eq!(dup.unwrap_err().code(), 1002);
    }

    /// Accounts work normally but every credential write fails.
    #[derive(Default)]
    struct FailingCredentials {
        inner: MockAccountRepository,
    }

    #[async_trait::async_trait]
    impl AccountRepository for FailingCredentials {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            self.inner.find_user_by_email(email).await
        }
        async fn create_user(&self, email: &str, name: &str, role: Role) -> Result<AuthUser, AuthError> {
            self.inner.create_user(email, name, role).await
        }
        async fn delete_user(&self, email: &str) -> Result<bool, AuthError> {
            self.inner.delete_user(email).await
        }
        async fn get_credentials(&self, user_id: uuid::Uuid) -> Result<Option<crate::auth::domain::Credentials>, AuthError> {
            self.inner.get_credentials(user_id).await
        }
        async fn upsert_password(&self, _: uuid::Uuid, _: String, _: String) -> Result<crate::auth::domain::Credentials, AuthError> {
            Err(AuthError::Repository("disk full".into()))
        }
    }

    #[tokio::test]
    async fn failed_credential_write_leaves_no_account_behind() {
        let repo = Arc::new(FailingCredentials::default());
        let svc = AuthService::new(Arc::clone(&repo), svc().cfg);

        let first = svc.register(register("a@b.com", "Passw0rd!")).await;
        assert!(matches!(first, Err(AuthError::Repository(_))));
        assert!(repo.find_user_by_email("a@b.com").await.unwrap().is_none());

        // A retry fails for the same reason instead of reporting a conflict.
        let retry = svc.register(register("a@b.com", "Passw0rd!")).await;
        assert!(matches!(retry, Err(AuthError::Repository(_))));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_unauthorized() {
        let svc = svc();
        svc.register(register("a@b.com", "Passw0rd!")).await.unwrap();
        let wrong = svc.login(LoginInput { email: "a@b.com".into(), password: "nope".into() }).await;
        assert!(matches!(wrong, Err(AuthError::Unauthorized)));
        let unknown = svc.login(LoginInput { email: "x@b.com".into(), password: "Passw0rd!".into() }).await;
        assert!(matches!(unknown, Err(AuthError::Unauthorized)));
    }
}
