//! Booklynn Core - Shared error taxonomy and configuration
//!
//! This crate defines the pieces shared by every Booklynn service:
//! - The domain error taxonomy with stable machine-readable codes
//! - Configuration management (env vars and TOML files)
//! - Helpers for classifying database constraint violations

pub mod config;

pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, MailConfig, ServerConfig,
};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Domain errors for Booklynn operations
///
/// Every variant carries a stable machine code (see [`BooklynnError::code`])
/// so clients can branch on failures without parsing messages.
#[derive(Error, Debug)]
pub enum BooklynnError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Missing Authorization header")]
    MissingToken,

    #[error("Invalid Authorization header format")]
    MalformedToken,

    #[error("This token is invalid or expired")]
    InvalidToken,

    #[error("This token is invalid or has been revoked")]
    TokenRevoked,

    #[error("Please provide an access token")]
    AccessTokenRequired,

    #[error("Please provide a refresh token")]
    RefreshTokenRequired,

    #[error("Account not verified")]
    AccountNotVerified,

    #[error("You do not have permission to perform this action")]
    InsufficientPermission,

    #[error("User with email already exists")]
    UserAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Book not found")]
    BookNotFound,

    #[error("Review not found")]
    ReviewNotFound,

    #[error("Operation conflicts with records that still reference this one")]
    IntegrityConflict,

    #[error("This link has expired")]
    ActionTokenExpired,

    #[error("This link is invalid")]
    ActionTokenInvalid,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BooklynnError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MissingToken => "MISSING_CREDENTIALS",
            Self::MalformedToken => "MALFORMED_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::AccessTokenRequired => "ACCESS_TOKEN_REQUIRED",
            Self::RefreshTokenRequired => "REFRESH_TOKEN_REQUIRED",
            Self::AccountNotVerified => "ACCOUNT_NOT_VERIFIED",
            Self::InsufficientPermission => "INSUFFICIENT_PERMISSION",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::BookNotFound => "BOOK_NOT_FOUND",
            Self::ReviewNotFound => "REVIEW_NOT_FOUND",
            Self::IntegrityConflict => "INTEGRITY_CONFLICT",
            Self::ActionTokenExpired => "ACTION_TOKEN_EXPIRED",
            Self::ActionTokenInvalid => "ACTION_TOKEN_INVALID",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Other(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, BooklynnError>;

// ============================================================================
// Database Error Classification
// ============================================================================

/// True when a statement was rejected by a unique constraint
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err.as_database_error().map(|db| db.kind()),
        Some(sqlx::error::ErrorKind::UniqueViolation)
    )
}

/// True when a statement was rejected by a foreign key constraint
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(
        err.as_database_error().map(|db| db.kind()),
        Some(sqlx::error::ErrorKind::ForeignKeyViolation)
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(BooklynnError::InvalidCredentials.code(), "INVALID_CREDENTIALS");
        assert_eq!(BooklynnError::TokenRevoked.code(), "TOKEN_REVOKED");
        assert_eq!(BooklynnError::UserAlreadyExists.code(), "USER_ALREADY_EXISTS");
        assert_eq!(BooklynnError::BookNotFound.code(), "BOOK_NOT_FOUND");
        assert_eq!(
            BooklynnError::Validation("rating out of range".into()).code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_error_messages_match_wire_contract() {
        assert_eq!(
            BooklynnError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert_eq!(
            BooklynnError::InvalidToken.to_string(),
            "This token is invalid or expired"
        );
        assert_eq!(
            BooklynnError::AccessTokenRequired.to_string(),
            "Please provide an access token"
        );
        assert_eq!(
            BooklynnError::UserAlreadyExists.to_string(),
            "User with email already exists"
        );
    }

    #[test]
    fn test_validation_message_passthrough() {
        let err = BooklynnError::Validation("Passwords do not match".into());
        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[test]
    fn test_anyhow_passthrough() {
        let err: BooklynnError = anyhow::anyhow!("boom").into();
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert_eq!(err.to_string(), "boom");
    }
}
