//! CouchDB storage implementation over the HTTP document API.
//!
//! Documents live in a single database. The store speaks plain CouchDB:
//! `POST /{db}` to insert (the server assigns `_id`), `GET`/`PUT`/`DELETE
//! /{db}/{id}` for single documents and `_all_docs?include_docs=true` to list.
//! Updates carry the document's current `_rev`; when the caller's document has
//! none, the store fetches it first. There is no compare-and-swap above that,
//! so concurrent writers to one id race and the last write wins.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use supplierstore_core::{
    backend::{StoreBackend, StoreBackendBuilder, WriteOutcome},
    error::{SupplierStoreError, SupplierStoreResult},
};

use crate::config::{Credentials, RetryPolicy};

#[derive(Debug, Clone)]
pub struct CouchDbStore {
    client: Client,
    credentials: Credentials,
    database: String,
    retry: RetryPolicy,
}

impl CouchDbStore {
    pub fn new(client: Client, credentials: Credentials, database: String, retry: RetryPolicy) -> Self {
        Self {
            client,
            credentials,
            database,
            retry,
        }
    }

    pub fn builder(credentials: Credentials, database: &str) -> CouchDbStoreBuilder {
        CouchDbStoreBuilder::new(credentials, database)
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.credentials.url, self.database)
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}/{}", self.credentials.url, self.database, id)
    }

    /// Sends a request, replaying it on HTTP 429 with exponential backoff
    /// until the retry budget runs out. The builder closure is invoked once
    /// per attempt since a `RequestBuilder` is consumed by `send`.
    async fn send_with_retry<F>(&self, build: F) -> SupplierStoreResult<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 0;

        loop {
            let response = build(&self.client)
                .basic_auth(&self.credentials.username, Some(&self.credentials.password))
                .send()
                .await
                .map_err(|err| SupplierStoreError::Backend(err.to_string()))?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS && attempt < self.retry.retries {
                let backoff = self.retry.backoff(attempt);
                debug!(attempt, ?backoff, "rate limited, retrying");
                tokio::time::sleep(backoff).await;
                attempt += 1;
                continue;
            }

            return Ok(response);
        }
    }

    async fn read_json(response: Response) -> SupplierStoreResult<Value> {
        response
            .json()
            .await
            .map_err(|err| SupplierStoreError::Backend(err.to_string()))
    }

    fn unexpected_status(action: &str, status: StatusCode) -> SupplierStoreError {
        SupplierStoreError::Backend(format!("{action} returned unexpected status {status}"))
    }

    /// Fetches the current revision of a document, `None` when absent.
    async fn current_revision(&self, id: &str) -> SupplierStoreResult<Option<String>> {
        match self.get_document(id).await? {
            Some(document) => Ok(document
                .get("_rev")
                .and_then(Value::as_str)
                .map(str::to_string)),
            None => Ok(None),
        }
    }

    /// Creates the backing database when it does not exist yet, then confirms
    /// it is reachable. Called once at build time.
    async fn ensure_database(&self) -> SupplierStoreResult<()> {
        let url = self.database_url();

        let response = self
            .send_with_retry(|client| client.put(&url))
            .await
            .map_err(as_connection_error)?;

        // 412 Precondition Failed means the database already exists.
        if !response.status().is_success() && response.status() != StatusCode::PRECONDITION_FAILED {
            return Err(SupplierStoreError::Connection(format!(
                "database [{}] could not be created, status {}",
                self.database,
                response.status()
            )));
        }

        let confirmation = self
            .send_with_retry(|client| client.head(&url))
            .await
            .map_err(as_connection_error)?;

        if !confirmation.status().is_success() {
            return Err(SupplierStoreError::Connection(format!(
                "database [{}] could not be obtained",
                self.database
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl StoreBackend for CouchDbStore {
    async fn insert_document(&self, document: Value) -> SupplierStoreResult<String> {
        let url = self.database_url();

        let response = self
            .send_with_retry(|client| client.post(&url).json(&document))
            .await?;

        if !response.status().is_success() {
            return Err(Self::unexpected_status("insert", response.status()));
        }

        Self::read_json(response)
            .await?
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                SupplierStoreError::Backend("insert response carried no document id".to_string())
            })
    }

    async fn get_document(&self, id: &str) -> SupplierStoreResult<Option<Value>> {
        let url = self.document_url(id);

        let response = self.send_with_retry(|client| client.get(&url)).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(Self::read_json(response).await?)),
            status => Err(Self::unexpected_status("get", status)),
        }
    }

    async fn update_document(&self, id: &str, mut document: Value) -> SupplierStoreResult<WriteOutcome> {
        if document.get("_rev").is_none() {
            let Some(rev) = self.current_revision(id).await? else {
                return Ok(WriteOutcome::Missing);
            };

            if let Some(fields) = document.as_object_mut() {
                fields.insert("_rev".to_string(), Value::String(rev));
            }
        }

        let url = self.document_url(id);

        let response = self
            .send_with_retry(|client| client.put(&url).json(&document))
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(WriteOutcome::Missing),
            status if status.is_success() => Ok(WriteOutcome::Applied),
            status => Err(Self::unexpected_status("update", status)),
        }
    }

    async fn delete_document(&self, id: &str) -> SupplierStoreResult<WriteOutcome> {
        let Some(rev) = self.current_revision(id).await? else {
            return Ok(WriteOutcome::Missing);
        };

        let url = self.document_url(id);

        let response = self
            .send_with_retry(|client| client.delete(&url).query(&[("rev", rev.as_str())]))
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(WriteOutcome::Missing),
            status if status.is_success() => Ok(WriteOutcome::Applied),
            status => Err(Self::unexpected_status("delete", status)),
        }
    }

    async fn list_documents(&self) -> SupplierStoreResult<Vec<Value>> {
        let url = format!("{}/_all_docs", self.database_url());

        let response = self
            .send_with_retry(|client| client.get(&url).query(&[("include_docs", "true")]))
            .await?;

        if !response.status().is_success() {
            return Err(Self::unexpected_status("list", response.status()));
        }

        let body = Self::read_json(response).await?;
        let rows = body
            .get("rows")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(rows
            .into_iter()
            .filter_map(|row| row.get("doc").cloned())
            .filter(|doc| {
                // Design documents are CouchDB internals, not suppliers.
                doc.get("_id")
                    .and_then(Value::as_str)
                    .is_none_or(|id| !id.starts_with("_design/"))
            })
            .collect())
    }

    async fn delete_all(&self) -> SupplierStoreResult<()> {
        for document in self.list_documents().await? {
            if let Some(id) = document.get("_id").and_then(Value::as_str) {
                self.delete_document(id).await?;
            }
        }

        Ok(())
    }
}

fn as_connection_error(err: SupplierStoreError) -> SupplierStoreError {
    match err {
        SupplierStoreError::Backend(message) => SupplierStoreError::Connection(message),
        other => other,
    }
}

/// Builder for [`CouchDbStore`] instances.
///
/// Building verifies the connection: the target database is created when
/// absent and its existence confirmed before the store is handed out, so a
/// successfully built store points at a reachable database.
pub struct CouchDbStoreBuilder {
    credentials: Credentials,
    database: String,
    retry: RetryPolicy,
}

impl CouchDbStoreBuilder {
    pub fn new(credentials: Credentials, database: &str) -> Self {
        Self {
            credentials,
            database: database.to_string(),
            retry: RetryPolicy::from_env(),
        }
    }

    /// Overrides the environment-derived retry policy.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for CouchDbStoreBuilder {
    type Backend = CouchDbStore;

    async fn build(self) -> SupplierStoreResult<Self::Backend> {
        let client = Client::builder()
            .build()
            .map_err(|err| SupplierStoreError::Connection(err.to_string()))?;

        let store = CouchDbStore::new(client, self.credentials, self.database, self.retry);
        store.ensure_database().await?;

        Ok(store)
    }
}
