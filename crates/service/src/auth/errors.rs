use thiserror::Error;

use crate::storage::StorageError;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("user already exists")]
    Conflict,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::Unauthorized => 1004,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(e: StorageError) -> Self { AuthError::Repository(e.to_string()) }
}

/// Why a request's session could not be verified. Never escapes the route
/// guard; callers there see an absent token instead.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("malformed Authorization header")]
    MalformedHeader,
    #[error("invalid session token: {0}")]
    InvalidToken(String),
    #[error("verification timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("verifier unavailable: {0}")]
    Unavailable(String),
}
