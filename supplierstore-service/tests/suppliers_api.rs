//! Full HTTP surface tests, driving the router against the in-memory store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use rand::{seq::SliceRandom, Rng};
use serde_json::{json, Value};
use tower::ServiceExt;

use supplierstore::{backend::StoreBackend, memory::InMemoryStore};
use supplierstore_service::app;

struct TestApp {
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let store: Arc<dyn StoreBackend> = Arc::new(InMemoryStore::new());
        Self { router: app(store) }
    }

    async fn request(&self, request: Request<Body>) -> (StatusCode, Value, Option<String>) {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, body, location)
    }

    async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value, Option<String>) {
        self.request(
            Request::post(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn put_json(&self, path: &str, body: Value) -> (StatusCode, Value, Option<String>) {
        self.request(
            Request::put(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn get(&self, path: &str) -> (StatusCode, Value, Option<String>) {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    async fn delete(&self, path: &str) -> StatusCode {
        let response = self
            .router
            .clone()
            .oneshot(Request::delete(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        response.status()
    }

    /// Creates a supplier and returns its assigned id plus the posted body.
    async fn seed(&self, supplier: Value) -> (String, Value) {
        let (status, body, _) = self.post_json("/suppliers", supplier.clone()).await;
        assert_eq!(status, StatusCode::CREATED);

        let id = body["_id"].as_str().unwrap().to_string();
        (id, supplier)
    }
}

fn supplier(name: &str) -> Value {
    json!({
        "name": name,
        "like_count": 2,
        "is_active": true,
        "products": [1, 2, 3],
        "rating": 8.5,
    })
}

/// Random but valid supplier payload, for tests that only care about shape.
fn random_supplier() -> Value {
    let mut rng = rand::thread_rng();
    let name = ["Acme", "Globex", "Initech", "Umbrella"]
        .choose(&mut rng)
        .unwrap()
        .to_string();

    json!({
        "name": name,
        "like_count": rng.gen_range(0..100),
        "is_active": rng.gen_bool(0.5),
        "products": (0..rng.gen_range(1..5)).map(|_| rng.gen_range(1..50)).collect::<Vec<i64>>(),
        "rating": rng.gen_range(0.0..10.0),
    })
}

#[tokio::test]
async fn index_greets() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Hello Supplier!");
}

#[tokio::test]
async fn create_returns_201_with_body_and_location() {
    let app = TestApp::new();

    let (status, body, location) = app.post_json("/suppliers", supplier("supplier1")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], json!("supplier1"));
    assert_eq!(body["like_count"], json!(2));
    assert_eq!(body["products"], json!([1, 2, 3]));
    assert_eq!(body["rating"], json!(8.5));

    let id = body["_id"].as_str().unwrap();
    assert_eq!(location.as_deref(), Some(format!("/suppliers/{id}").as_str()));
}

#[tokio::test]
async fn create_accepts_form_submissions() {
    let app = TestApp::new();

    let form = "name=formed&like_count=4&is_active=true&products=1%2C2&rating=6.5";
    let (status, body, _) = app
        .request(
            Request::post("/suppliers")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], json!("formed"));
    assert_eq!(body["like_count"], json!(4));
    assert_eq!(body["products"], json!([1, 2]));
}

#[tokio::test]
async fn create_without_name_is_400() {
    let app = TestApp::new();

    let mut payload = supplier("ignored");
    payload.as_object_mut().unwrap().remove("name");

    let (status, body, _) = app.post_json("/suppliers", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], json!(400));
    assert!(body["message"].as_str().unwrap().contains("missing name"));
}

#[tokio::test]
async fn create_without_content_type_is_415() {
    let app = TestApp::new();

    let (status, _, _) = app
        .request(
            Request::post("/suppliers")
                .body(Body::from(supplier("s").to_string()))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn create_with_wrong_content_type_is_415() {
    let app = TestApp::new();

    let (status, body, _) = app
        .request(
            Request::post("/suppliers")
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("not a supplier"))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("application/json"));
}

#[tokio::test]
async fn get_returns_the_stored_supplier() {
    let app = TestApp::new();
    let (id, _) = app.seed(supplier("supplier1")).await;

    let (status, body, _) = app.get(&format!("/suppliers/{id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_id"], json!(id));
    assert_eq!(body["name"], json!("supplier1"));
}

#[tokio::test]
async fn get_unknown_id_is_404_with_message() {
    let app = TestApp::new();

    let (status, body, _) = app.get("/suppliers/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], json!(404));
    assert!(body["message"].as_str().unwrap().contains("was not found"));
}

#[tokio::test]
async fn list_returns_every_supplier() {
    let app = TestApp::new();
    for _ in 0..3 {
        app.seed(random_supplier()).await;
    }

    let (status, body, _) = app.get("/suppliers").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn list_filters_by_name() {
    let app = TestApp::new();
    app.seed(supplier("alpha")).await;
    app.seed(supplier("beta")).await;

    let (status, body, _) = app.get("/suppliers?name=alpha").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("alpha"));
}

#[tokio::test]
async fn list_filters_by_like_count_strictly_greater() {
    let app = TestApp::new();

    let mut popular = supplier("popular");
    popular["like_count"] = json!(10);
    app.seed(popular).await;
    app.seed(supplier("modest")).await; // like_count 2

    let (status, body, _) = app.get("/suppliers?like_count=2").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("popular"));
}

#[tokio::test]
async fn list_filters_by_is_active() {
    let app = TestApp::new();

    let mut dormant = supplier("dormant");
    dormant["is_active"] = json!(false);
    app.seed(dormant).await;
    app.seed(supplier("active")).await;

    let (status, body, _) = app.get("/suppliers?is_active=false").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("dormant"));
}

#[tokio::test]
async fn list_filters_by_rating_strictly_greater() {
    let app = TestApp::new();

    for (name, rating) in [("a", 8.5), ("b", 6.5), ("c", 7.2), ("d", 4.5)] {
        let mut payload = supplier(name);
        payload["rating"] = json!(rating);
        app.seed(payload).await;
    }

    let (status, body, _) = app.get("/suppliers?rating=7.2").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("a"));
}

#[tokio::test]
async fn list_filters_by_product_membership() {
    let app = TestApp::new();

    let mut other = supplier("other");
    other["products"] = json!([7, 8]);
    app.seed(other).await;
    app.seed(supplier("stocked")).await; // products [1, 2, 3]

    let (status, body, _) = app.get("/suppliers?product_id=2").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("stocked"));
}

#[tokio::test]
async fn name_filter_takes_precedence() {
    let app = TestApp::new();
    app.seed(supplier("alpha")).await;

    let mut inactive = supplier("beta");
    inactive["is_active"] = json!(false);
    app.seed(inactive).await;

    // Both filters passed; only the name filter applies.
    let (status, body, _) = app.get("/suppliers?name=alpha&is_active=false").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("alpha"));
}

#[tokio::test]
async fn update_replaces_fields_and_returns_the_record() {
    let app = TestApp::new();
    let (id, _) = app.seed(supplier("before")).await;

    let mut updated = supplier("after");
    updated["rating"] = json!(9.9);
    let (status, body, _) = app.put_json(&format!("/suppliers/{id}"), updated).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_id"], json!(id));
    assert_eq!(body["name"], json!("after"));
    assert_eq!(body["rating"], json!(9.9));

    let (_, fetched, _) = app.get(&format!("/suppliers/{id}")).await;
    assert_eq!(fetched["name"], json!("after"));
}

#[tokio::test]
async fn update_unknown_id_is_404() {
    let app = TestApp::new();

    let (status, body, _) = app.put_json("/suppliers/nope", supplier("ghost")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("was not found"));
}

#[tokio::test]
async fn update_requires_json_content_type() {
    let app = TestApp::new();
    let (id, _) = app.seed(supplier("stuck")).await;

    let (status, _, _) = app
        .request(
            Request::put(format!("/suppliers/{id}"))
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("nope"))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn delete_is_204_even_when_absent() {
    let app = TestApp::new();
    let (id, _) = app.seed(supplier("doomed")).await;

    assert_eq!(app.delete(&format!("/suppliers/{id}")).await, StatusCode::NO_CONTENT);
    assert_eq!(app.delete(&format!("/suppliers/{id}")).await, StatusCode::NO_CONTENT);

    let (status, _, _) = app.get(&format!("/suppliers/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn like_increments_the_count() {
    let app = TestApp::new();
    let (id, _) = app.seed(supplier("liked")).await; // like_count 2

    let (status, body, _) = app.put_json(&format!("/suppliers/{id}/like"), Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["like_count"], json!(3));

    let (_, fetched, _) = app.get(&format!("/suppliers/{id}")).await;
    assert_eq!(fetched["like_count"], json!(3));
}

#[tokio::test]
async fn like_treats_unset_count_as_zero() {
    let app = TestApp::new();

    let mut unliked = supplier("unliked");
    unliked["like_count"] = Value::Null;
    let (id, _) = app.seed(unliked).await;

    let (status, body, _) = app.put_json(&format!("/suppliers/{id}/like"), Value::Null).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["like_count"], json!(1));
}

#[tokio::test]
async fn like_unknown_id_is_404() {
    let app = TestApp::new();

    let (status, body, _) = app.put_json("/suppliers/nope/like", Value::Null).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("was not found"));
}
