//! The Supplier record: one document with validation, (de)serialization and a
//! persistence lifecycle.
//!
//! Every persistence operation takes the store connection explicitly as a
//! `&dyn StoreBackend`; there is no global handle. The record is created in
//! memory with no id, validated, persisted (the store assigns the id on first
//! save), optionally mutated and re-saved, and finally deleted, after which it
//! is stale and must not be reused.
//!
//! `name` is the only field required for persistence; `deserialize` however
//! requires all five business keys to be present in the incoming mapping, so a
//! request body cannot silently drop fields.

use serde_json::{Map, Value};
use tracing::warn;

use crate::{
    backend::{StoreBackend, WriteOutcome},
    error::{SupplierStoreError, SupplierStoreResult},
    query::{DocumentEvaluator, Expr, Filter},
};

/// The key under which the store-assigned id travels in serialized documents.
///
/// Stable across create/read/update for client compatibility.
pub const RESERVED_ID_KEY: &str = "_id";

/// The business fields that must be present in any mapping handed to
/// [`Supplier::deserialize`].
const REQUIRED_FIELDS: [&str; 5] = ["name", "like_count", "is_active", "products", "rating"];

/// A single supplier, in memory or persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Supplier {
    /// Store-assigned identifier; `None` until the first successful persist.
    pub id: Option<String>,
    /// Supplier name. Required for any persist operation.
    pub name: Option<String>,
    /// Number of likes given by customers.
    pub like_count: Option<i64>,
    /// Whether the supplier is active.
    pub is_active: bool,
    /// Product ids provided by this supplier.
    pub products: Vec<i64>,
    /// Average customer rating, 0-10.
    pub rating: Option<f64>,
}

impl Default for Supplier {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            like_count: None,
            is_active: true,
            products: Vec::new(),
            rating: None,
        }
    }
}

impl Supplier {
    /// Creates an empty record with no id, active by default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the record is fit for persistence.
    ///
    /// `name` is the only required field.
    pub fn validate(&self) -> SupplierStoreResult<()> {
        if self.name.is_none() {
            return Err(SupplierStoreError::Validation(
                "name attribute is not set".to_string(),
            ));
        }

        Ok(())
    }

    /// Serializes the record into the store's JSON mapping format.
    ///
    /// All five business fields are always present (optionals as `null`); the
    /// reserved `_id` key is included only once the store has assigned an id.
    pub fn serialize(&self) -> Value {
        let mut document = Map::new();
        document.insert("name".to_string(), Value::from(self.name.clone()));
        document.insert("like_count".to_string(), Value::from(self.like_count));
        document.insert("is_active".to_string(), Value::from(self.is_active));
        document.insert("products".to_string(), Value::from(self.products.clone()));
        document.insert("rating".to_string(), Value::from(self.rating));

        if let Some(id) = &self.id {
            document.insert(RESERVED_ID_KEY.to_string(), Value::String(id.clone()));
        }

        Value::Object(document)
    }

    /// Populates the business fields from a JSON mapping.
    ///
    /// Fails with a validation error when `data` is not a mapping at all, when
    /// any of the five business keys is absent, or when a value has the wrong
    /// shape (e.g. a bare scalar where `products` expects a sequence of
    /// integers). An incoming `_id` is adopted only if the record does not
    /// already have one.
    pub fn deserialize(&mut self, data: &Value) -> SupplierStoreResult<()> {
        let Some(fields) = data.as_object() else {
            return Err(SupplierStoreError::Validation(
                "body of request contained bad or no data".to_string(),
            ));
        };

        for key in REQUIRED_FIELDS {
            if !fields.contains_key(key) {
                return Err(SupplierStoreError::Validation(format!("missing {key}")));
            }
        }

        self.name = match &fields["name"] {
            Value::Null => None,
            Value::String(name) => Some(name.clone()),
            _ => {
                return Err(SupplierStoreError::Validation(
                    "name must be a string".to_string(),
                ));
            }
        };
        self.like_count = match &fields["like_count"] {
            Value::Null => None,
            value => Some(value.as_i64().ok_or_else(|| {
                SupplierStoreError::Validation("like_count must be an integer".to_string())
            })?),
        };
        self.is_active = fields["is_active"].as_bool().ok_or_else(|| {
            SupplierStoreError::Validation("is_active must be a boolean".to_string())
        })?;
        self.products = fields["products"]
            .as_array()
            .ok_or_else(|| {
                SupplierStoreError::Validation(
                    "products must be a sequence of integers".to_string(),
                )
            })?
            .iter()
            .map(|product| {
                product.as_i64().ok_or_else(|| {
                    SupplierStoreError::Validation(
                        "products must be a sequence of integers".to_string(),
                    )
                })
            })
            .collect::<SupplierStoreResult<Vec<i64>>>()?;
        self.rating = match &fields["rating"] {
            Value::Null => None,
            value => Some(value.as_f64().ok_or_else(|| {
                SupplierStoreError::Validation("rating must be a number".to_string())
            })?),
        };

        if self.id.is_none() {
            match fields.get(RESERVED_ID_KEY) {
                Some(Value::String(id)) => self.id = Some(id.clone()),
                Some(Value::Number(id)) => self.id = Some(id.to_string()),
                _ => {}
            }
        }

        Ok(())
    }

    /// Persists a new record, adopting the store-assigned id on success.
    ///
    /// Best-effort: a transport-level failure from the store is logged and
    /// swallowed, leaving `id` unset. Callers check `id` rather than catching
    /// an error. Validation failures still propagate.
    pub async fn create(&mut self, store: &dyn StoreBackend) -> SupplierStoreResult<()> {
        self.validate()?;

        match store.insert_document(self.serialize()).await {
            Ok(id) => {
                self.id = Some(id);
                Ok(())
            }
            Err(SupplierStoreError::Backend(err)) => {
                warn!(error = %err, "create failed");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Writes the record's current field values over its stored document.
    ///
    /// Fetches the stored document, merges the serialized business fields over
    /// it (preserving store bookkeeping keys such as `_rev`) and writes back.
    /// A missing document is a silent no-op reported as
    /// [`WriteOutcome::Missing`]. There is no compare-and-swap: concurrent
    /// updates to the same id race, last write wins.
    pub async fn update(&self, store: &dyn StoreBackend) -> SupplierStoreResult<WriteOutcome> {
        let id = self.id.as_deref().ok_or_else(|| {
            SupplierStoreError::Validation("cannot update a supplier without an id".to_string())
        })?;

        let Some(mut stored) = store.get_document(id).await? else {
            return Ok(WriteOutcome::Missing);
        };

        if let (Some(target), Value::Object(fields)) = (stored.as_object_mut(), self.serialize()) {
            for (key, value) in fields {
                target.insert(key, value);
            }
        }

        store.update_document(id, stored).await
    }

    /// Saves the record: dispatches to [`create`](Self::create) when `id` is
    /// unset, otherwise to [`update`](Self::update). Validates first, before
    /// attempting either path.
    pub async fn save(&mut self, store: &dyn StoreBackend) -> SupplierStoreResult<WriteOutcome> {
        self.validate()?;

        if self.id.is_some() {
            self.update(store).await
        } else {
            self.create(store).await?;
            Ok(WriteOutcome::Applied)
        }
    }

    /// Removes the backing document; no-op when it does not exist.
    ///
    /// On success the record's id is cleared, leaving it stale. A store
    /// failure leaves the id in place so the delete can be retried.
    pub async fn delete(&mut self, store: &dyn StoreBackend) -> SupplierStoreResult<WriteOutcome> {
        let Some(id) = self.id.as_deref() else {
            return Ok(WriteOutcome::Missing);
        };

        let outcome = store.delete_document(id).await?;
        self.id = None;

        Ok(outcome)
    }

    /// Returns every supplier in the store, each independently deserialized.
    pub async fn all(store: &dyn StoreBackend) -> SupplierStoreResult<Vec<Supplier>> {
        store
            .list_documents()
            .await?
            .iter()
            .map(Self::from_document)
            .collect()
    }

    /// Removes every document from the store. Test fixture resets only.
    pub async fn remove_all(store: &dyn StoreBackend) -> SupplierStoreResult<()> {
        store.delete_all().await
    }

    /// Finds a supplier by id, returning `None` when absent.
    pub async fn find(store: &dyn StoreBackend, id: &str) -> SupplierStoreResult<Option<Supplier>> {
        match store.get_document(id).await? {
            Some(document) => Ok(Some(Self::from_document(&document)?)),
            None => Ok(None),
        }
    }

    /// Finds suppliers whose name equals `name`.
    pub async fn find_by_name(
        store: &dyn StoreBackend,
        name: &str,
    ) -> SupplierStoreResult<Vec<Supplier>> {
        Self::find_where(store, Filter::eq("name", name)).await
    }

    /// Finds suppliers by their active flag.
    pub async fn find_by_is_active(
        store: &dyn StoreBackend,
        is_active: bool,
    ) -> SupplierStoreResult<Vec<Supplier>> {
        Self::find_where(store, Filter::eq("is_active", is_active)).await
    }

    /// Finds suppliers whose named field strictly exceeds `threshold`.
    ///
    /// The comparison is numeric and field-agnostic: `like_count` and `rating`
    /// both work. Records where the field is unset never match.
    pub async fn find_by_greater(
        store: &dyn StoreBackend,
        field: &str,
        threshold: f64,
    ) -> SupplierStoreResult<Vec<Supplier>> {
        Self::find_where(store, Filter::gt(field, threshold)).await
    }

    /// Finds suppliers whose product list contains `product_id`.
    pub async fn find_by_product(
        store: &dyn StoreBackend,
        product_id: i64,
    ) -> SupplierStoreResult<Vec<Supplier>> {
        Self::find_where(store, Filter::contains("products", product_id)).await
    }

    async fn find_where(
        store: &dyn StoreBackend,
        expr: Expr,
    ) -> SupplierStoreResult<Vec<Supplier>> {
        let documents = store.list_documents().await?;
        DocumentEvaluator::filter_documents(documents.iter(), &expr)?
            .iter()
            .map(Self::from_document)
            .collect()
    }

    fn from_document(document: &Value) -> SupplierStoreResult<Supplier> {
        let mut supplier = Supplier::new();
        supplier.deserialize(document)?;
        Ok(supplier)
    }
}
