//! `orgchart serve` -- HTTP JSON API over the hierarchy pipeline.
//!
//! Served with `axum` + `tokio`. Submissions are validated and numbered on
//! the blocking pool, then persisted through the storage trait, whose commit
//! keeps concurrent replacements from interleaving.
//!
//! Security features:
//! - CORS headers on all responses (any origin, GET/POST)
//! - Request body limit (default 1 MiB, configurable)
//! - Optional API key authentication via ORGCHART_API_KEY env var
//!
//! Endpoints:
//! - GET  /health                                          - Server status (exempt from auth)
//! - POST /api/v1/hierarchy/structure                      - Structure and store a hierarchy
//! - GET  /api/v1/hierarchy                                - Stored hierarchy as a nested mapping
//! - GET  /api/v1/hierarchy/employees/{name}               - One stored employee
//! - GET  /api/v1/hierarchy/employees/{name}/supervisors   - Everyone above an employee
//! - GET  /api/v1/hierarchy/employees/{name}/subordinates  - Everyone below an employee
//!
//! All responses use Content-Type: application/json.

mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Json, Router};
use orgchart_storage::{InMemoryStorage, OrgStorage};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use self::handlers::{
    handle_get_employee, handle_get_hierarchy, handle_health, handle_list_subordinates,
    handle_list_supervisors, handle_not_found, handle_structure,
};
use self::middleware::auth_middleware;
use self::state::AppState;
use crate::config::ServeConfig;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

/// Assemble the routes and layers around `state`.
fn router<S: OrgStorage>(state: Arc<AppState<S>>, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/v1/hierarchy", get(handle_get_hierarchy::<S>))
        .route("/api/v1/hierarchy/structure", post(handle_structure::<S>))
        .route(
            "/api/v1/hierarchy/employees/{name}",
            get(handle_get_employee::<S>),
        )
        .route(
            "/api/v1/hierarchy/employees/{name}/supervisors",
            get(handle_list_supervisors::<S>),
        )
        .route(
            "/api/v1/hierarchy/employees/{name}/subordinates",
            get(handle_list_subordinates::<S>),
        )
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ))
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl+C.
///
/// Accepted hierarchies live in an in-memory table for the lifetime of the
/// process.
pub async fn start_server(config: ServeConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.api_key.is_some() {
        info!("API key authentication enabled");
    }

    let state = Arc::new(AppState {
        storage: InMemoryStorage::new(),
        api_key: config.api_key.clone(),
    });
    let app = router(state, config.max_body_bytes);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, max_body_bytes = config.max_body_bytes, "orgchart listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("received shutdown signal");
}
