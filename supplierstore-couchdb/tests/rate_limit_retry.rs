//! Exercises the 429 replay loop against a local TCP listener serving canned
//! HTTP responses, one connection per attempt.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use reqwest::Client;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

use supplierstore_core::{backend::StoreBackend, error::SupplierStoreError};
use supplierstore_couchdb::{CouchDbStore, Credentials, RetryPolicy};

fn response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn rate_limited() -> String {
    response("429 Too Many Requests", "")
}

fn created() -> String {
    response("201 Created", r#"{"ok":true,"id":"abc","rev":"1-x"}"#)
}

/// Serves one canned response per connection, in order; once the script runs
/// out every further connection gets a 429. Returns the base url and a hit
/// counter.
async fn canned_server(responses: Vec<String>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };

            let index = counter.fetch_add(1, Ordering::SeqCst);
            let reply = responses.get(index).cloned().unwrap_or_else(rate_limited);

            // The whole request fits one segment; drain it before replying.
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}"), hits)
}

fn store_at(url: &str, retry: RetryPolicy) -> CouchDbStore {
    let (host, port) = url
        .strip_prefix("http://")
        .and_then(|rest| rest.split_once(':'))
        .map(|(host, port)| (host.to_string(), port.parse().unwrap()))
        .unwrap();

    CouchDbStore::new(
        Client::new(),
        Credentials {
            host,
            port,
            username: "admin".to_string(),
            password: "pass".to_string(),
            url: url.to_string(),
        },
        "suppliers".to_string(),
        retry,
    )
}

fn quick_retry(retries: u32) -> RetryPolicy {
    RetryPolicy {
        retries,
        initial_backoff: Duration::from_millis(1),
        growth: 2,
    }
}

#[tokio::test]
async fn rate_limited_requests_are_replayed_until_success() {
    let (url, hits) = canned_server(vec![rate_limited(), rate_limited(), created()]).await;
    let store = store_at(&url, quick_retry(5));

    let id = store
        .insert_document(serde_json::json!({ "name": "supplier1" }))
        .await
        .unwrap();

    assert_eq!(id, "abc");
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_budget_is_bounded() {
    // Every response is a 429, so the request runs out of retries.
    let (url, hits) = canned_server(Vec::new()).await;
    let store = store_at(&url, quick_retry(1));

    let err = store
        .insert_document(serde_json::json!({ "name": "supplier1" }))
        .await
        .unwrap_err();

    assert!(matches!(err, SupplierStoreError::Backend(_)));
    assert!(err.to_string().contains("429"));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
