use thiserror::Error;

use crate::service_form::FieldError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service form rejected ({} field errors)", .0.len())]
    InvalidForm(Vec<FieldError>),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}
