//! In-memory document storage backend for supplierstore.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `StoreBackend` trait. It uses async-aware read-write locks for concurrent
//! access and is ideal for development and testing where a running CouchDB
//! instance is not available.
//!
//! # Quick Start
//!
//! ```ignore
//! use supplierstore_memory::InMemoryStore;
//! use supplierstore_core::supplier::Supplier;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryStore::new();
//!
//!     let mut supplier = Supplier::new();
//!     supplier.name = Some("Alice's Produce".to_string());
//!     supplier.save(&store).await?;
//!
//!     assert!(supplier.id.is_some());
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as supplierstore_memory;

pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
