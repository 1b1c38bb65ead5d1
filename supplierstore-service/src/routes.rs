//! Axum router and handlers for the supplier REST surface.
//!
//! The storage backend is injected as shared state (`Arc<dyn StoreBackend>`),
//! so the same router serves CouchDB in production and the in-memory store in
//! tests.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Form, Json, RequestExt, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

use supplierstore::{backend::StoreBackend, supplier::Supplier};

use crate::error::{ServiceError, ServiceResult};

type AppState = Arc<dyn StoreBackend>;

/// Builds the application router over the given backend.
pub fn app(store: Arc<dyn StoreBackend>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .route("/suppliers/:id/like", put(like_supplier))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

async fn index() -> &'static str {
    "Hello Supplier!"
}

/// Query parameters accepted by the list endpoint. At most one filter is
/// applied per request; when several are passed, precedence runs name,
/// like_count, is_active, rating, product_id.
#[derive(Debug, Default, Deserialize)]
struct ListParams {
    name: Option<String>,
    like_count: Option<i64>,
    is_active: Option<String>,
    rating: Option<f64>,
    product_id: Option<i64>,
}

async fn list_suppliers(
    State(store): State<AppState>,
    Query(params): Query<ListParams>,
) -> ServiceResult<Json<Vec<Value>>> {
    let store = store.as_ref();

    let suppliers = if let Some(name) = &params.name {
        info!(%name, "listing suppliers by name");
        Supplier::find_by_name(store, name).await?
    } else if let Some(like_count) = params.like_count {
        info!(like_count, "listing suppliers with more likes");
        Supplier::find_by_greater(store, "like_count", like_count as f64).await?
    } else if let Some(is_active) = &params.is_active {
        let is_active = is_active == "true";
        info!(is_active, "listing suppliers by active flag");
        Supplier::find_by_is_active(store, is_active).await?
    } else if let Some(rating) = params.rating {
        info!(rating, "listing suppliers rated higher");
        Supplier::find_by_greater(store, "rating", rating).await?
    } else if let Some(product_id) = params.product_id {
        info!(product_id, "listing suppliers carrying product");
        Supplier::find_by_product(store, product_id).await?
    } else {
        Supplier::all(store).await?
    };

    Ok(Json(suppliers.iter().map(Supplier::serialize).collect()))
}

async fn get_supplier(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<Json<Value>> {
    let supplier = Supplier::find(store.as_ref(), &id)
        .await?
        .ok_or_else(|| ServiceError::supplier_not_found(&id))?;

    Ok(Json(supplier.serialize()))
}

async fn create_supplier(
    State(store): State<AppState>,
    request: Request,
) -> ServiceResult<Response> {
    let content_type = content_type(request.headers()).map(str::to_string);

    let data = match content_type.as_deref() {
        Some(ct) if ct.starts_with("application/json") => {
            let Json(data) = request
                .extract::<Json<Value>, _>()
                .await
                .map_err(|err| ServiceError::Validation(err.to_string()))?;
            data
        }
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
            info!("creating supplier from form submit");
            let Form(form) = request
                .extract::<Form<SupplierForm>, _>()
                .await
                .map_err(|err| ServiceError::Validation(err.to_string()))?;
            form.into_document()?
        }
        _ => {
            return Err(ServiceError::UnsupportedMediaType(
                "application/json".to_string(),
            ));
        }
    };

    let mut supplier = Supplier::new();
    supplier.deserialize(&data)?;
    supplier.save(store.as_ref()).await?;
    info!(id = ?supplier.id, "supplier created");

    let location = match &supplier.id {
        Some(id) => format!("/suppliers/{id}"),
        None => "/suppliers".to_string(),
    };

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(supplier.serialize()),
    )
        .into_response())
}

async fn update_supplier(
    State(store): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> ServiceResult<Json<Value>> {
    require_json(request.headers())?;

    let mut supplier = Supplier::find(store.as_ref(), &id)
        .await?
        .ok_or_else(|| ServiceError::supplier_not_found(&id))?;

    let Json(data) = request
        .extract::<Json<Value>, _>()
        .await
        .map_err(|err| ServiceError::Validation(err.to_string()))?;

    supplier.deserialize(&data)?;
    supplier.id = Some(id);
    supplier.save(store.as_ref()).await?;

    Ok(Json(supplier.serialize()))
}

async fn delete_supplier(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<StatusCode> {
    if let Some(mut supplier) = Supplier::find(store.as_ref(), &id).await? {
        supplier.delete(store.as_ref()).await?;
        info!(%id, "supplier deleted");
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn like_supplier(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<Json<Value>> {
    let mut supplier = Supplier::find(store.as_ref(), &id)
        .await?
        .ok_or_else(|| ServiceError::supplier_not_found(&id))?;

    supplier.like_count = Some(supplier.like_count.unwrap_or(0) + 1);
    supplier.save(store.as_ref()).await?;
    info!(%id, like_count = ?supplier.like_count, "supplier liked");

    Ok(Json(supplier.serialize()))
}

/// Form payload for browser submissions. Every field arrives as a string and
/// is coerced to its typed shape; coercion failures are validation errors.
#[derive(Debug, Deserialize)]
struct SupplierForm {
    name: String,
    like_count: String,
    is_active: String,
    products: String,
    rating: String,
}

impl SupplierForm {
    fn into_document(self) -> ServiceResult<Value> {
        let like_count = match self.like_count.trim() {
            "" => Value::Null,
            raw => raw
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| ServiceError::Validation("like_count must be an integer".to_string()))?,
        };

        let rating = match self.rating.trim() {
            "" => Value::Null,
            raw => raw
                .parse::<f64>()
                .map(Value::from)
                .map_err(|_| ServiceError::Validation("rating must be a number".to_string()))?,
        };

        let products = match self.products.trim() {
            "" => Vec::new(),
            raw => raw
                .split(',')
                .map(|part| {
                    part.trim().parse::<i64>().map_err(|_| {
                        ServiceError::Validation(
                            "products must be comma-separated integers".to_string(),
                        )
                    })
                })
                .collect::<ServiceResult<Vec<i64>>>()?,
        };

        Ok(json!({
            "name": self.name,
            "like_count": like_count,
            "is_active": self.is_active == "true",
            "products": products,
            "rating": rating,
        }))
    }
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::CONTENT_TYPE)?.to_str().ok()
}

fn require_json(headers: &HeaderMap) -> ServiceResult<()> {
    match content_type(headers) {
        Some(ct) if ct.starts_with("application/json") => Ok(()),
        _ => Err(ServiceError::UnsupportedMediaType(
            "application/json".to_string(),
        )),
    }
}
