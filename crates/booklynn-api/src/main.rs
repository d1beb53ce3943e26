//! Booklynn API Server
//!
//! REST API server for the Booklynn book review service.

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use booklynn_api::auth::REVOCATION_TTL_SECS;
use booklynn_api::{create_router, mail::Mailer, state::AppState};
use booklynn_core::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("booklynn_api={},tower_http=debug", config.logging.level).into()
    });
    if config.logging.json_format {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if config.auth.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set, using the development signing secret");
    }
    if config.auth.access_token_ttl_secs > REVOCATION_TTL_SECS as u64 {
        tracing::warn!(
            access_ttl_secs = config.auth.access_token_ttl_secs,
            revocation_ttl_secs = REVOCATION_TTL_SECS,
            "access tokens outlive blocklist entries; a revoked token becomes valid again once its entry lapses"
        );
    }

    // Connect to Postgres and bring the schema up to date
    let pool = PgPoolOptions::new()
        .max_connections(config.database.pool_size)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database migrations applied");

    let mailer = Mailer::spawn(config.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, pool, mailer));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Booklynn API server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
