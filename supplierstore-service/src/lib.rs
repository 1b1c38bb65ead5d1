//! HTTP service exposing the supplier store over REST.
//!
//! The router is built by [`routes::app`] from an injected storage backend,
//! so tests run the full HTTP surface against the in-memory store while the
//! binary wires in CouchDB.

pub mod error;
pub mod routes;

pub use routes::app;
