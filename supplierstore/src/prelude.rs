//! Convenient re-exports of commonly used types from supplierstore.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use supplierstore::prelude::*;
//! ```

pub use supplierstore_core::{
    backend::{StoreBackend, StoreBackendBuilder, WriteOutcome},
    error::{SupplierStoreError, SupplierStoreResult},
    query::{DocumentEvaluator, Expr, FieldOp, Filter, QueryVisitor},
    supplier::{Supplier, RESERVED_ID_KEY},
};
