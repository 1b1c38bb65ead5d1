//! Main supplierstore crate providing a unified interface to the supplier
//! document store.
//!
//! This crate is the primary entry point for consumers. It re-exports the
//! core record and query types from the sub-crates and provides convenient
//! access to the storage backends.
//!
//! # Features
//!
//! - **Supplier record lifecycle** - create, update, save, delete, plus
//!   finder helpers built on a composable query API
//! - **Multiple backends** - in-memory storage for development and testing,
//!   CouchDB/Cloudant for production (behind the `couchdb` feature)
//! - **Explicit connections** - every operation takes the store as an
//!   argument, so backends can be swapped or shared freely
//!
//! # Quick Start
//!
//! ```ignore
//! use supplierstore::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryStore::new();
//!
//!     let mut supplier = Supplier::new();
//!     supplier.name = Some("Alice's Produce".to_string());
//!     supplier.rating = Some(8.5);
//!     supplier.save(&store).await?;
//!
//!     let top_rated = Supplier::find_by_greater(&store, "rating", 7.0).await?;
//!     println!("top rated: {top_rated:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`couchdb`] - Persistent CouchDB/Cloudant backend (requires the
//!   `couchdb` feature)

pub mod prelude;

pub use supplierstore_core::{backend, error, query, supplier};

/// In-memory storage backend implementations.
pub mod memory {
    pub use supplierstore_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// CouchDB storage backend implementations.
///
/// This module is only available when the `couchdb` feature is enabled.
#[cfg(feature = "couchdb")]
pub mod couchdb {
    pub use supplierstore_couchdb::{
        CouchDbStore, CouchDbStoreBuilder, Credentials, RetryPolicy,
    };
}
