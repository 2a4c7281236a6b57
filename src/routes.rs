use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        deployment::get_deployment,
        documents::documents_handler,
        properties::{get_stats, properties_handler},
        tokenization::tokenization_handler,
    },
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/properties", properties_handler())
        .route("/stats", get(get_stats))
        .nest("/tokenize", tokenization_handler())
        .nest("/documents", documents_handler())
        .route("/deployment", get(get_deployment))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
