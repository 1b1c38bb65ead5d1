//! CouchDB/Cloudant storage backend for supplierstore.
//!
//! This crate implements the `StoreBackend` trait over the CouchDB HTTP API
//! using `reqwest`. It resolves connection credentials from the environment
//! (Cloud Foundry `VCAP_SERVICES`, a Kubernetes `BINDING_CLOUDANT` blob, or
//! discrete `CLOUDANT_*` variables), creates the target database if it does
//! not exist yet, and retries rate-limited requests with exponential backoff.
//!
//! # Quick Start
//!
//! ```ignore
//! use supplierstore_core::backend::StoreBackendBuilder;
//! use supplierstore_couchdb::{config::Credentials, CouchDbStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::from_env()?;
//!     let store = CouchDbStore::builder(credentials, "suppliers").build().await?;
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as supplierstore_couchdb;

pub mod config;
pub mod store;

pub use config::{Credentials, RetryPolicy};
pub use store::{CouchDbStore, CouchDbStoreBuilder};
