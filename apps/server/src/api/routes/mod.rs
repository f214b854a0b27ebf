//! Route tables

pub mod companies;
pub mod internships;

use crate::{api::handlers::metrics, state::AppState};
use axum::{routing::get, Router};

/// Resource routes, mounted under `server.base_path`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(internships::internship_routes())
        .merge(companies::company_routes())
}

/// Prometheus scrape endpoint, served outside the base path.
pub fn metrics_routes() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics::metrics_handler))
}
