//! Core data-access layer for the supplier store.
//!
//! This crate is the heart of the supplierstore project and provides:
//!
//! - **The Supplier record** ([`supplier`]) - validation, (de)serialization and the
//!   persistence lifecycle of a single supplier document
//! - **Store backend abstraction** ([`backend`]) - the trait seam implemented by the
//!   in-memory and CouchDB backends
//! - **Query and filtering API** ([`query`]) - filter expressions and the client-side
//!   evaluator that powers the finder helpers
//! - **Error handling** ([`error`]) - error and result types shared by every crate
//!
//! # Example
//!
//! ```ignore
//! use supplierstore_core::supplier::Supplier;
//!
//! let mut supplier = Supplier::new();
//! supplier.name = Some("acme".to_string());
//! supplier.save(&store).await?;
//! assert!(supplier.id.is_some());
//! ```

#[allow(unused_extern_crates)]
extern crate self as supplierstore_core;

pub mod backend;
pub mod error;
pub mod query;
pub mod supplier;
