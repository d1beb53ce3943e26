//! Booklynn API - REST server for the book review service
//!
//! Router assembly lives here; route definitions are in [`routes`], the
//! token lifecycle in [`auth`], and the CRUD services in [`books`] and
//! [`reviews`].

pub mod auth;
pub mod books;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod reviews;
pub mod routes;
pub mod state;

use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::routes::ApiDoc;
use crate::state::AppState;

/// Assemble the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = build_cors(&state.config.server.cors_origins);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::prometheus_metrics))
        .nest("/v2", routes::api_routes(state.clone()))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_counter_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Permissive CORS unless origins are pinned in configuration
fn build_cors(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Build a router over a lazy pool for integration tests
///
/// The pool connects on first use, so tests that never touch the
/// database run without one.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    use booklynn_core::config::AppConfig;

    let config = AppConfig::default();
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect_lazy(&config.database.url)
        .expect("default database URL parses");
    let mailer = mail::Mailer::spawn(config.clone());
    let state = Arc::new(AppState::new(config, pool, mailer));

    create_router(state)
}
