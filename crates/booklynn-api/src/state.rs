//! Application state management

use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::RwLock;

use booklynn_core::config::AppConfig;

use crate::auth::RevocationStore;
use crate::mail::Mailer;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db_pool: PgPool,
    /// Token revocation blocklist
    pub revocations: RevocationStore,
    /// Outbound email queue handle
    pub mailer: Mailer,
    /// Server start time
    pub start_time: Instant,
    /// Total request counter
    pub request_count: AtomicU64,
    /// Per-endpoint request counts, keyed by normalized path
    pub endpoint_counts: RwLock<HashMap<String, u64>>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig, db_pool: PgPool, mailer: Mailer) -> Self {
        Self {
            revocations: RevocationStore::new(db_pool.clone()),
            config,
            db_pool,
            mailer,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            endpoint_counts: RwLock::new(HashMap::new()),
        }
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Record a handled request against its normalized endpoint
    pub async fn record_request(&self, endpoint: String) {
        let mut counts = self.endpoint_counts.write().await;
        *counts.entry(endpoint).or_insert(0) += 1;
    }
}
