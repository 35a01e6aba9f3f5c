use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role carried inside the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Domain user (business view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
}

/// Claims signed into the session JWT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account email.
    pub sub: String,
    pub uid: Uuid,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// Proof that the current request carries a verified session.
///
/// The route guard only cares whether one exists; handlers that need the
/// account details read the claims.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthToken {
    claims: SessionClaims,
}

impl AuthToken {
    pub fn new(claims: SessionClaims) -> Self { Self { claims } }

    pub fn claims(&self) -> &SessionClaims { &self.claims }

    pub fn role(&self) -> Role { self.claims.role }

    pub fn email(&self) -> &str { &self.claims.sub }

    pub fn user_id(&self) -> Uuid { self.claims.uid }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_uses_uppercase_labels() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(serde_json::from_str::<Role>("\"USER\"").unwrap(), Role::User);
        assert!(serde_json::from_str::<Role>("\"OWNER\"").is_err());
        assert_eq!(Role::User.as_str(), "USER");
    }
}
