//! In-memory storage implementation for the supplier store.
//!
//! This module provides a simple backend that keeps documents as JSON values
//! in a HashMap behind an async-safe read-write lock.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use mea::rwlock::RwLock;
use serde_json::Value;
use uuid::Uuid;

use supplierstore_core::{
    backend::{StoreBackend, StoreBackendBuilder, WriteOutcome},
    error::SupplierStoreResult,
    supplier::RESERVED_ID_KEY,
};

type DocumentMap = HashMap<String, Value>;

/// Thread-safe in-memory document storage backend.
///
/// This struct implements the [`StoreBackend`] trait to provide a fully
/// functional document store that operates entirely in memory using an
/// async-aware read-write lock. Documents are stored as JSON values indexed
/// by their store-assigned id.
///
/// # Thread Safety
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state,
/// allowing it to be safely shared across async tasks. Multiple clones of the
/// same instance share the same underlying data.
///
/// # Performance
///
/// Listing returns the whole collection; callers filter client-side. Fine for
/// tests and local development, not meant for production data volumes.
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    documents: Arc<RwLock<DocumentMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(DocumentMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_document(&self, mut document: Value) -> SupplierStoreResult<String> {
        let id = Uuid::new_v4().to_string();

        if let Some(fields) = document.as_object_mut() {
            fields.insert(RESERVED_ID_KEY.to_string(), Value::String(id.clone()));
        }

        self.documents.write().await.insert(id.clone(), document);

        Ok(id)
    }

    async fn get_document(&self, id: &str) -> SupplierStoreResult<Option<Value>> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn update_document(&self, id: &str, mut document: Value) -> SupplierStoreResult<WriteOutcome> {
        let mut documents = self.documents.write().await;

        if !documents.contains_key(id) {
            return Ok(WriteOutcome::Missing);
        }

        if let Some(fields) = document.as_object_mut() {
            fields.insert(RESERVED_ID_KEY.to_string(), Value::String(id.to_string()));
        }

        documents.insert(id.to_string(), document);

        Ok(WriteOutcome::Applied)
    }

    async fn delete_document(&self, id: &str) -> SupplierStoreResult<WriteOutcome> {
        match self.documents.write().await.remove(id) {
            Some(_) => Ok(WriteOutcome::Applied),
            None => Ok(WriteOutcome::Missing),
        }
    }

    async fn list_documents(&self) -> SupplierStoreResult<Vec<Value>> {
        Ok(self.documents.read().await.values().cloned().collect())
    }

    async fn delete_all(&self) -> SupplierStoreResult<()> {
        self.documents.write().await.clear();

        Ok(())
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// Currently a no-op builder, kept so every backend is constructed through the
/// same [`StoreBackendBuilder`] seam.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new [`InMemoryStore`] instance.
    ///
    /// This always succeeds and returns a freshly initialized store.
    async fn build(self) -> SupplierStoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}
