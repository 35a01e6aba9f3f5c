use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use service::auth::errors::AuthError;
use service::errors::ServiceError;
use service::service_form::FieldError;
use service::storage::StorageError;

/// JSON error response: `{ "error": ..., "message"?: ..., "errors"?: [...] }`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: Option<String>,
    pub errors: Vec<FieldError>,
}

#[derive(Serialize)]
struct Body {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message, errors: Vec::new() }
    }

    pub fn invalid_form(errors: Vec<FieldError>) -> Self {
        Self { status: StatusCode::UNPROCESSABLE_ENTITY, error: "Validation Error", message: None, errors }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", None)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden", None)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = Body { error: self.error, message: self.message, errors: self.errors };
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let msg = Some(e.to_string());
        match e {
            AuthError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", msg),
            AuthError::Conflict => Self::new(StatusCode::CONFLICT, "Conflict", msg),
            AuthError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", msg),
            other => {
                error!(code = other.code(), err = %other, "auth failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::InvalidForm(errors) => Self::invalid_form(errors),
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ServiceError::Storage(err) => err.into(),
        }
    }
}

impl From<StorageError> for JsonApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::InvalidKey(_) => Self::new(StatusCode::BAD_REQUEST, "Invalid Key", Some(e.to_string())),
            other => {
                error!(err = %other, "storage failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn invalid_form_lists_field_errors() {
        let err: JsonApiError = ServiceError::InvalidForm(vec![FieldError { field: "price".into(), message: "Price must be a positive number".into() }]).into();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(resp).await;
        assert_eq!(json["errors"][0]["field"], "price");
        assert!(json.get("message").is_none());
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let err: JsonApiError = AuthError::Repository("disk on fire".into()).into();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json, serde_json::json!({ "error": "Internal Server Error" }));
    }
}
