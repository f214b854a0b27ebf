//! `GET /metrics`

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

use crate::state::AppState;

/// Refresh the pool gauges, then render every registered metric in text format.
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    if let Some(pool) = &state.pool {
        let idle = pool.num_idle() as i64;
        crate::metrics::DB_CONNECTIONS_IDLE.set(idle);
        crate::metrics::DB_CONNECTIONS_ACTIVE.set(i64::from(pool.size()) - idle);
    }

    let encoder = TextEncoder::new();
    let mut body = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut body) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, "metrics unavailable").into_response();
    }

    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        body,
    )
        .into_response()
}
