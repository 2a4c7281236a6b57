mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod models;
mod routes;
mod service;
mod utils;
#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use anyhow::Context;
use axum::http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::EnvFilter;

use crate::{
    db::{db::DBClient, memorydb::MemoryDB, seed::seed_catalog, Store},
    service::{
        storage_backend::{IrysHttpBackend, MemoryBackend, StorageBackend},
        uploader::DocumentUploader,
    },
};

/// Starting balance of the in-process storage backend, 1 ETH in wei.
const LOCAL_STORAGE_BALANCE: u128 = 1_000_000_000_000_000_000;
const LOCAL_PRICE_PER_BYTE: u128 = 1_000;

#[derive(Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<dyn Store>,
    pub uploader: Arc<DocumentUploader>,
}

impl AppState {
    pub fn new(config: Config, db_client: Arc<dyn Store>, uploader: DocumentUploader) -> Self {
        Self {
            env: config,
            db_client,
            uploader: Arc::new(uploader),
        }
    }
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let client = DBClient::connect(url, config.database_max_connections)
                .await
                .context("🔥 Failed to connect to the database")?;
            tracing::info!("📊 Max connections: {}", config.database_max_connections);
            Arc::new(client)
        }
        None => {
            tracing::warn!("⚠️  DATABASE_URL not set - using in-memory store, data will not persist");
            Arc::new(MemoryDB::new())
        }
    };

    if config.seed_catalog {
        seed_catalog(store.as_ref()).await?;
    }

    Ok(store)
}

fn storage_backend(config: &Config) -> Arc<dyn StorageBackend> {
    if config.irys_upload_relay_url.is_some() {
        tracing::info!("📦 Document storage: Irys node {}", config.irys_node_url);
        Arc::new(IrysHttpBackend::new(config))
    } else {
        tracing::warn!("⚠️  IRYS_UPLOAD_RELAY_URL not set - documents are kept in memory");
        Arc::new(MemoryBackend::new(LOCAL_STORAGE_BALANCE, LOCAL_PRICE_PER_BYTE))
    }
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allowed_origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid origin in ALLOWED_ORIGINS: {}", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST]))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("propius=debug,tower_http=info")),
        )
        .init();

    let config = Config::init();

    let db_client = connect_store(&config).await?;

    let uploader = DocumentUploader::new(
        storage_backend(&config),
        &config.irys_node_url,
        &config.irys_gateway_url,
    );

    let cors = cors_layer(&config)?;
    let app_state = Arc::new(AppState::new(config.clone(), db_client, uploader));

    let app = create_router(app_state.clone()).layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    tracing::info!("🚀 Server is running on http://localhost:{}", config.port);
    tracing::info!("📄 Document storage backend: {}", app_state.uploader.backend_name());

    axum::serve(listener, app).await?;

    Ok(())
}
