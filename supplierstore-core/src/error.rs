//! Error types and result types for supplier store operations.
//!
//! Use [`SupplierStoreResult<T>`] as the return type for fallible operations.
//! Note that a missing document is not an error at this layer: lookups return
//! `Option` and writes report [`WriteOutcome::Missing`](crate::backend::WriteOutcome),
//! so only the HTTP layer decides what "not found" means to a client.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur in the supplier data-access layer.
#[derive(Error, Debug)]
pub enum SupplierStoreError {
    /// Input rejected before any persistence attempt (missing/malformed fields).
    #[error("Invalid supplier: {0}")]
    Validation(String),
    /// Credential resolution or connection setup failed.
    #[error("Database connection error: {0}")]
    Connection(String),
    /// Conversion between the record and the store's JSON mapping failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// A transport-level failure talking to the document store.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for supplier store operations.
pub type SupplierStoreResult<T> = Result<T, SupplierStoreError>;

impl From<SerdeJsonError> for SupplierStoreError {
    fn from(err: SerdeJsonError) -> Self {
        SupplierStoreError::Serialization(err.to_string())
    }
}
