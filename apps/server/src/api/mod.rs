//! API layer - routes, handlers, and middleware

pub mod envelope;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;

use crate::{state::AppState, Error};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_request_body_size;
    let cors_origins = state.config.server.cors_origins.clone();
    let base_path = state.config.server.base_path.trim_end_matches('/').to_string();

    let api_router = routes::api_routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        crate::auth::auth_middleware,
    ));
    let router = if base_path.is_empty() {
        Router::new().merge(api_router)
    } else {
        Router::new().nest(&base_path, api_router)
    };

    router
        .route("/health", get(health_check))
        .route("/", get(root))
        .merge(routes::metrics_routes())
        .fallback(not_found)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_id_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics_middleware,
        ))
        .layer(middleware::compression())
        .layer(middleware::cors(&cors_origins))
        .layer(middleware::trace())
        .layer(DefaultBodyLimit::max(max_body_size))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"status": "ok", "service": "internhub"})),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable", "service": "internhub"})),
            )
        }
    }
}

async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "server": "internhub",
        "version": env!("CARGO_PKG_VERSION"),
        "api": state.config.server.base_path,
        "status": "running"
    }))
}

async fn not_found() -> Error {
    Error::NotFound("Route not found".to_string())
}
