//! Token revocation blocklist
//!
//! Revoked jti values are stored in Postgres with an expiry timestamp and
//! only count as revoked while `expires_at` is in the future, giving the
//! table the semantics of an expiring set. Entries live for a fixed hour;
//! if access tokens are configured to outlive that, a revoked token could
//! become valid again once its entry lapses, so startup warns about such
//! configurations instead of silently coupling the two lifetimes.

use booklynn_core::Result;
use chrono::{Duration, Utc};
use sqlx::PgPool;

/// How long a revoked jti stays on the blocklist, in seconds
pub const REVOCATION_TTL_SECS: i64 = 3600;

/// Blocklist handle, cheap to clone
#[derive(Clone)]
pub struct RevocationStore {
    db_pool: PgPool,
}

impl RevocationStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Put a jti on the blocklist
    ///
    /// Idempotent: revoking an already-revoked token changes nothing and
    /// succeeds.
    pub async fn revoke(&self, jti: &str) -> Result<()> {
        let expires_at = Utc::now() + Duration::seconds(REVOCATION_TTL_SECS);

        sqlx::query(
            "INSERT INTO token_blocklist (token_jti, expires_at) VALUES ($1, $2) \
             ON CONFLICT (token_jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    /// True while the jti is blocklisted and its entry has not lapsed
    pub async fn is_revoked(&self, jti: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM token_blocklist WHERE token_jti = $1 AND expires_at > NOW()",
        )
        .bind(jti)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(count > 0)
    }
}
