//! API error handling
//!
//! [`AppError`] wraps the domain taxonomy from `booklynn-core` and turns
//! it into HTTP: a status code plus a stable JSON body `{code, message,
//! details?}`. Storage and internal failures are logged server-side and
//! surfaced with sanitized messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use booklynn_core::BooklynnError;

use crate::auth::action_token::ActionTokenError;
use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;

/// API error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Stable machine-readable error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type, the `E` of every handler
#[derive(Debug)]
pub struct AppError(pub BooklynnError);

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            BooklynnError::InvalidCredentials
            | BooklynnError::MissingToken
            | BooklynnError::MalformedToken
            | BooklynnError::InvalidToken
            | BooklynnError::TokenRevoked
            | BooklynnError::AccessTokenRequired
            | BooklynnError::RefreshTokenRequired => StatusCode::UNAUTHORIZED,

            BooklynnError::AccountNotVerified
            | BooklynnError::InsufficientPermission
            | BooklynnError::UserAlreadyExists => StatusCode::FORBIDDEN,

            BooklynnError::UserNotFound
            | BooklynnError::BookNotFound
            | BooklynnError::ReviewNotFound => StatusCode::NOT_FOUND,

            BooklynnError::IntegrityConflict => StatusCode::CONFLICT,

            BooklynnError::ActionTokenExpired
            | BooklynnError::ActionTokenInvalid
            | BooklynnError::Validation(_) => StatusCode::BAD_REQUEST,

            BooklynnError::Database(_) | BooklynnError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal failures keep their cause in the logs, not the body
        let body = match &self.0 {
            BooklynnError::Database(e) => {
                tracing::error!(error = %e, "database error");
                ApiError::new(self.0.code(), "Database operation failed")
            }
            BooklynnError::Other(e) => {
                tracing::error!(error = %e, "internal error");
                ApiError::new(self.0.code(), "Internal server error")
            }
            err => ApiError::new(err.code(), err.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

impl From<BooklynnError> for AppError {
    fn from(err: BooklynnError) -> Self {
        Self(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self(BooklynnError::Database(err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self(BooklynnError::Validation(err.to_string()))
    }
}

impl From<ActionTokenError> for AppError {
    fn from(err: ActionTokenError) -> Self {
        match err {
            ActionTokenError::Expired => Self(BooklynnError::ActionTokenExpired),
            ActionTokenError::Invalid => Self(BooklynnError::ActionTokenInvalid),
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        Self(BooklynnError::Other(err.into()))
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        Self(BooklynnError::Other(err.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError(BooklynnError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError(BooklynnError::TokenRevoked).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError(BooklynnError::AccountNotVerified).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError(BooklynnError::UserAlreadyExists).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError(BooklynnError::BookNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError(BooklynnError::IntegrityConflict).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError(BooklynnError::ActionTokenExpired).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_action_token_errors_stay_distinct() {
        let expired: AppError = ActionTokenError::Expired.into();
        assert!(matches!(expired.0, BooklynnError::ActionTokenExpired));

        let invalid: AppError = ActionTokenError::Invalid.into();
        assert!(matches!(invalid.0, BooklynnError::ActionTokenInvalid));
    }

    #[test]
    fn test_api_error_body_shape() {
        let body = ApiError::new("BOOK_NOT_FOUND", "Book not found");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["code"], "BOOK_NOT_FOUND");
        assert_eq!(json["message"], "Book not found");
        assert!(json.get("details").is_none());

        let with_details = ApiError::new("VALIDATION_ERROR", "Invalid input")
            .with_details("rating: out of range");
        let json = serde_json::to_value(&with_details).unwrap();
        assert_eq!(json["details"], "rating: out of range");
    }
}
