//! Bearer token generation and validation
//!
//! Implements HMAC-SHA256 signed JWTs. Access and refresh tokens share one
//! claim shape and are told apart by the `refresh` flag; every token gets
//! a fresh `jti` so it can be revoked individually.

use booklynn_core::config::AuthConfig;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Identity summary embedded in a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Account email address
    pub email: String,
    /// Account UUID, stringified
    pub user_uid: String,
}

/// Claims carried by every bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity of the account this token was issued to
    pub user: UserClaims,
    /// Expiration timestamp (Unix epoch seconds)
    pub exp: u64,
    /// True for refresh tokens, false for access tokens
    pub refresh: bool,
    /// Unique token identifier, the revocation key
    pub jti: String,
}

/// Token generation and validation errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

/// Sign a bearer token with an explicit lifetime
///
/// [`issue_access_token`] and [`issue_refresh_token`] are the two callers;
/// this stays public for tests that need unusual lifetimes.
pub fn issue_token(
    config: &AuthConfig,
    email: &str,
    user_uid: Uuid,
    ttl_secs: u64,
    refresh: bool,
) -> Result<String, JwtError> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        user: UserClaims {
            email: email.to_string(),
            user_uid: user_uid.to_string(),
        },
        exp: now + ttl_secs,
        refresh,
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

/// Issue a short-lived access token (default lifetime 15 minutes)
pub fn issue_access_token(
    config: &AuthConfig,
    email: &str,
    user_uid: Uuid,
) -> Result<String, JwtError> {
    issue_token(config, email, user_uid, config.access_token_ttl_secs, false)
}

/// Issue a long-lived refresh token (default lifetime 7 days)
pub fn issue_refresh_token(
    config: &AuthConfig,
    email: &str,
    user_uid: Uuid,
) -> Result<String, JwtError> {
    issue_token(
        config,
        email,
        user_uid,
        config.refresh_token_ttl_days * SECS_PER_DAY,
        true,
    )
}

/// Validate a bearer token and extract its claims
///
/// Failures are typed rather than thrown: an expired token, a bad
/// signature, and a structurally broken token are distinct outcomes so
/// the guard can answer with the right rejection.
///
/// # Example
///
/// ```no_run
/// use booklynn_api::auth::jwt::decode_token;
/// use booklynn_core::config::AuthConfig;
///
/// let config = AuthConfig::default();
/// let claims = decode_token(&config, "eyJhbGciOiJIUzI1NiIs...").expect("Invalid token");
/// println!("Subject: {}", claims.user.email);
/// ```
pub fn decode_token(config: &AuthConfig, token: &str) -> Result<Claims, JwtError> {
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        _ => JwtError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
