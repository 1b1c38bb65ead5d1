use std::{env, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use supplierstore::{
    backend::{StoreBackend, StoreBackendBuilder},
    couchdb::{CouchDbStore, Credentials},
};
use supplierstore_service::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let credentials = Credentials::from_env()?;
    let database = env::var("DATABASE_NAME").unwrap_or_else(|_| "suppliers".to_string());
    info!(url = %credentials.url, database, "connecting to document store");

    let store = CouchDbStore::builder(credentials, &database)
        .build()
        .await
        .context("failed to initialize the document store")?;
    let store: Arc<dyn StoreBackend> = Arc::new(store);

    let addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "serving supplier store");

    axum::serve(listener, app(store)).await?;

    Ok(())
}
