//! Storage backend abstraction for the supplier store.
//!
//! The [`StoreBackend`] trait is the single seam between the Supplier record and
//! whatever holds the documents: the in-memory store used by tests or the
//! CouchDB store used in production. Implementations are required to be
//! thread-safe (`Send + Sync`) and the trait is object safe, so the service's
//! composition root can inject an `Arc<dyn StoreBackend>` wherever a record
//! operation needs a connection.
//!
//! Documents are plain JSON mappings ([`serde_json::Value`]); the store owns id
//! assignment and surfaces the id under the reserved `_id` key of every
//! document it returns.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::error::SupplierStoreResult;

/// Outcome of a write against a document that may not exist.
///
/// Missing documents are a legitimate, expected condition during update and
/// delete, so they are reported as a variant instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write reached an existing document.
    Applied,
    /// No document exists under the given id; nothing was written.
    Missing,
}

/// Abstract interface for document storage backends.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts a new document. The store assigns the id and returns it; the
    /// stored document carries the id under the reserved `_id` key.
    async fn insert_document(&self, document: Value) -> SupplierStoreResult<String>;

    /// Retrieves the document stored under `id`, or `None` if absent.
    async fn get_document(&self, id: &str) -> SupplierStoreResult<Option<Value>>;

    /// Replaces the document stored under `id` in its entirety.
    ///
    /// An unknown id is reported as [`WriteOutcome::Missing`], not as an error.
    async fn update_document(&self, id: &str, document: Value)
    -> SupplierStoreResult<WriteOutcome>;

    /// Deletes the document stored under `id`. Idempotent: deleting an absent
    /// document reports [`WriteOutcome::Missing`].
    async fn delete_document(&self, id: &str) -> SupplierStoreResult<WriteOutcome>;

    /// Returns every document in the store, each carrying its `_id`.
    async fn list_documents(&self) -> SupplierStoreResult<Vec<Value>>;

    /// Removes every document. Used only for test fixture resets.
    async fn delete_all(&self) -> SupplierStoreResult<()>;
}

/// Factory trait for creating backend instances.
///
/// Construction can be fallible (credential resolution, connection setup), so
/// builders return a [`SupplierStoreResult`].
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> SupplierStoreResult<Self::Backend>;
}
