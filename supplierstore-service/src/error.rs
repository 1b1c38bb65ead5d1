//! Error types for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use supplierstore::error::SupplierStoreError;

/// Result type for handlers.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// Request body or parameters failed validation
    #[error("{0}")]
    Validation(String),

    /// Requested supplier does not exist
    #[error("{0}")]
    NotFound(String),

    /// Request carried a missing or unsupported Content-Type
    #[error("Content-Type must be {0}")]
    UnsupportedMediaType(String),

    /// The document store cannot be reached
    #[error("Service unavailable: {0}")]
    Connection(String),

    /// Unexpected failure inside the service or its store
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Marks a supplier id as absent, with the message clients match on.
    pub fn supplier_not_found(id: &str) -> Self {
        Self::NotFound(format!("Supplier with id '{id}' was not found."))
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ServiceError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SupplierStoreError> for ServiceError {
    fn from(err: SupplierStoreError) -> Self {
        match err {
            SupplierStoreError::Validation(message) => ServiceError::Validation(message),
            SupplierStoreError::Connection(message) => ServiceError::Connection(message),
            SupplierStoreError::Backend(message) | SupplierStoreError::Serialization(message) => {
                ServiceError::Internal(message)
            }
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl From<ServiceError> for ErrorResponse {
    fn from(err: ServiceError) -> Self {
        let status = err.status_code();

        ErrorResponse {
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
