//! Session verification at the request boundary.
//!
//! A verifier turns request headers into an optional [`AuthToken`]. Callers
//! that must fail closed go through [`verify_or_absent`], which folds errors
//! and timeouts into "no token".

use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::domain::AuthToken;
use super::errors::VerifyError;
use super::token::decode_token;

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// `Ok(None)` when the request carries no session at all.
    async fn verify(&self, headers: &HeaderMap) -> Result<Option<AuthToken>, VerifyError>;
}

/// Pull the raw token from `Authorization: Bearer <token>`, falling back to the
/// session cookie. An Authorization header with any other scheme is an error.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Result<Option<String>, VerifyError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| VerifyError::MalformedHeader)?;
        return match value.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            _ => Err(VerifyError::MalformedHeader),
        };
    }
    let jar = CookieJar::from_headers(headers);
    Ok(jar
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty()))
}

/// Verifies HS256 session JWTs signed with the shared secret.
pub struct JwtSessionVerifier {
    secret: String,
    cookie_name: String,
}

impl JwtSessionVerifier {
    pub fn new(secret: impl Into<String>, cookie_name: impl Into<String>) -> Self {
        Self { secret: secret.into(), cookie_name: cookie_name.into() }
    }
}

#[async_trait]
impl SessionVerifier for JwtSessionVerifier {
    async fn verify(&self, headers: &HeaderMap) -> Result<Option<AuthToken>, VerifyError> {
        match extract_token(headers, &self.cookie_name)? {
            Some(raw) => decode_token(&self.secret, &raw).map(|claims| Some(AuthToken::new(claims))),
            None => Ok(None),
        }
    }
}

/// Run `verifier` bounded by `timeout`; any failure yields `None`.
pub async fn verify_or_absent(verifier: &dyn SessionVerifier, headers: &HeaderMap, timeout: Duration) -> Option<AuthToken> {
    let outcome = match tokio::time::timeout(timeout, verifier.verify(headers)).await {
        Ok(res) => res,
        Err(_) => Err(VerifyError::Timeout(timeout)),
    };
    match outcome {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "session verification failed; treating as anonymous");
            None
        }
    }
}
