//! Health check and metrics handlers

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub name: String,
}

/// Liveness probe - basic health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
    })
}

/// Prometheus-compatible metrics endpoint
pub async fn prometheus_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.uptime_secs();
    let total_requests = state.get_request_count();

    let pool_size = state.db_pool.size();
    let pool_idle = state.db_pool.num_idle();

    let mut output = String::new();

    output.push_str("# HELP booklynn_uptime_seconds Time since server start\n");
    output.push_str("# TYPE booklynn_uptime_seconds gauge\n");
    output.push_str(&format!("booklynn_uptime_seconds {uptime}\n\n"));

    output.push_str("# HELP booklynn_requests_total Total number of HTTP requests\n");
    output.push_str("# TYPE booklynn_requests_total counter\n");
    output.push_str(&format!("booklynn_requests_total {total_requests}\n\n"));

    output.push_str("# HELP booklynn_build_info Build information\n");
    output.push_str("# TYPE booklynn_build_info gauge\n");
    output.push_str(&format!(
        "booklynn_build_info{{version=\"{}\"}} 1\n\n",
        env!("CARGO_PKG_VERSION")
    ));

    output.push_str("# HELP booklynn_db_pool_connections_active Active database connections\n");
    output.push_str("# TYPE booklynn_db_pool_connections_active gauge\n");
    output.push_str(&format!(
        "booklynn_db_pool_connections_active {}\n\n",
        pool_size.saturating_sub(pool_idle as u32)
    ));

    output.push_str("# HELP booklynn_db_pool_connections_idle Idle database connections\n");
    output.push_str("# TYPE booklynn_db_pool_connections_idle gauge\n");
    output.push_str(&format!("booklynn_db_pool_connections_idle {pool_idle}\n\n"));

    output.push_str("# HELP booklynn_db_pool_connections_total Total database pool size\n");
    output.push_str("# TYPE booklynn_db_pool_connections_total gauge\n");
    output.push_str(&format!("booklynn_db_pool_connections_total {pool_size}\n\n"));

    output.push_str("# HELP booklynn_http_requests_total HTTP requests by endpoint\n");
    output.push_str("# TYPE booklynn_http_requests_total counter\n");
    let counts = state.endpoint_counts.read().await;
    for (endpoint, count) in counts.iter() {
        output.push_str(&format!(
            "booklynn_http_requests_total{{endpoint=\"{endpoint}\"}} {count}\n"
        ));
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        output,
    )
}
