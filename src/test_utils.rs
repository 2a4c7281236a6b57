use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    config::Config,
    db::{memorydb::MemoryDB, seed::seed_catalog, Store},
    routes::create_router,
    service::{storage_backend::MemoryBackend, uploader::DocumentUploader},
    AppState,
};

const DEFAULT_STORAGE_BALANCE: u128 = 10_000_000;

pub struct TestApp {
    pub router: Router,
    pub storage: Arc<MemoryBackend>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(Config::for_tests(), DEFAULT_STORAGE_BALANCE, false).await
    }

    pub async fn seeded() -> Self {
        Self::build(Config::for_tests(), DEFAULT_STORAGE_BALANCE, true).await
    }

    pub async fn with_storage_balance(balance: u128) -> Self {
        Self::build(Config::for_tests(), balance, false).await
    }

    pub async fn with_manifest(path: &str) -> Self {
        let config = Config {
            deployment_manifest: path.to_string(),
            ..Config::for_tests()
        };
        Self::build(config, DEFAULT_STORAGE_BALANCE, false).await
    }

    async fn build(config: Config, balance: u128, seed: bool) -> Self {
        let db_client: Arc<dyn Store> = Arc::new(MemoryDB::new());
        if seed {
            seed_catalog(db_client.as_ref()).await.unwrap();
        }

        let storage = Arc::new(MemoryBackend::new(balance, 1));
        let uploader = DocumentUploader::new(
            storage.clone(),
            &config.irys_node_url,
            &config.irys_gateway_url,
        )
        .with_bundle_pause(Duration::ZERO);

        let app_state = Arc::new(AppState::new(config, db_client, uploader));

        TestApp {
            router: create_router(app_state),
            storage,
        }
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

pub async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}
