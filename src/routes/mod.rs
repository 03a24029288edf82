use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::AppResult,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::CatalogService,
};

pub mod catalog;

/// Shared application state
pub struct AppState {
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(catalog: CatalogService) -> Self {
        Self { catalog }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/db", get(database_health))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(catalog::movies))
        .route("/genres", get(catalog::genres))
        .route("/actors", get(catalog::actors))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Store connectivity check
async fn database_health(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    state.catalog.ping().await?;
    Ok(Json(json!({ "connected": true })))
}
