use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::domain::{AuthUser, SessionClaims};
use super::errors::{AuthError, VerifyError};

/// Sign an HS256 session token for `user`, valid for `ttl_hours`.
pub fn issue_token(secret: &str, user: &AuthUser, ttl_hours: i64) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: user.email.clone(),
        uid: user.id,
        role: user.role,
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(ttl_hours)).timestamp() as usize,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Verify signature and expiry of a session token.
pub fn decode_token(secret: &str, token: &str) -> Result<SessionClaims, VerifyError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<SessionClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| VerifyError::InvalidToken(e.to_string()))
}
