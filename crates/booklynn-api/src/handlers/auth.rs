//! Authentication API handlers
//!
//! The handlers stay thin: validate the request, call the service, shape
//! the response. The email-verification endpoint is the one exception to
//! JSON-in/JSON-out, answering with a redirect to the operator console
//! because a human clicked that link in a mail client.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use booklynn_core::BooklynnError;

use crate::auth::{
    action_token, jwt, require_principal, AuthService, AuthenticatedUser, LoginRequest,
    MessageResponse, PasswordResetConfirmRequest, PasswordResetRequest, SignupRequest,
    TokenRefreshResponse, User, UserRole, UserWithBooks,
};
use crate::books::BookService;
use crate::error::AppError;
use crate::mail::EmailJob;
use crate::state::AppState;

/// Signup response: the created account plus a pointer at the inbox
#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub user: User,
}

/// Register a new account
///
/// Creates an unverified account and enqueues the verification email.
#[utoipa::path(
    post,
    path = "/v2/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 403, description = "Email already registered", body = crate::error::ApiError),
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let service = AuthService::new(state.db_pool.clone());
    let user = service.signup(request).await?;

    let token = action_token::sign(&state.config.auth, &user.email);
    state.mailer.enqueue(EmailJob::Verification {
        to: user.email.clone(),
        token,
    });

    let response = SignupResponse {
        message: "Account created! Check email to verify your account".to_string(),
        user,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Redeem an email verification link
///
/// The outcome travels back to the console as query parameters on the
/// redirect instead of a JSON body, since the caller is a browser.
#[utoipa::path(
    get,
    path = "/v2/auth/verify/{token}",
    tag = "auth",
    params(("token" = String, Path, description = "Signed action token from the email link")),
    responses(
        (status = 303, description = "Redirect to the console with the verification outcome"),
    )
)]
pub async fn verify_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Redirect {
    let frontend = &state.config.server.frontend_url;

    let email = match action_token::redeem(
        &state.config.auth,
        &token,
        state.config.auth.action_token_ttl_secs,
    ) {
        Ok(email) => email,
        Err(action_token::ActionTokenError::Expired) => {
            return Redirect::to(&format!("{frontend}/?verified=false&reason=expired"));
        }
        Err(action_token::ActionTokenError::Invalid) => {
            return Redirect::to(&format!("{frontend}/?verified=false&reason=invalid"));
        }
    };

    let service = AuthService::new(state.db_pool.clone());
    match service.mark_verified(&email).await {
        Ok(_) => Redirect::to(&format!("{frontend}/?verified=true")),
        Err(BooklynnError::UserNotFound) => {
            Redirect::to(&format!("{frontend}/?verified=false&reason=not_found"))
        }
        Err(e) => {
            tracing::error!(error = %e, "verification update failed");
            Redirect::to(&format!("{frontend}/?verified=false&reason=error"))
        }
    }
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/v2/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = crate::auth::LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service = AuthService::new(state.db_pool.clone());
    let response = service.login(&state.config.auth, request).await?;

    Ok(Json(response))
}

/// Issue a fresh access token from a refresh token
#[utoipa::path(
    post,
    path = "/v2/auth/refresh",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "New access token", body = TokenRefreshResponse),
        (status = 401, description = "Refresh token missing or invalid", body = crate::error::ApiError),
    )
)]
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    let access_token = jwt::issue_access_token(&state.config.auth, &auth.email, auth.user_uid)?;

    Ok(Json(TokenRefreshResponse { access_token }))
}

/// Revoke the presented access token
#[utoipa::path(
    get,
    path = "/v2/auth/logout",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token revoked", body = MessageResponse),
        (status = 401, description = "Access token missing or invalid", body = crate::error::ApiError),
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    state.revocations.revoke(&auth.jti).await?;

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// Return the authenticated account's profile and owned books
#[utoipa::path(
    get,
    path = "/v2/auth/me",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile with owned books", body = UserWithBooks),
        (status = 401, description = "Access token missing or invalid", body = crate::error::ApiError),
        (status = 403, description = "Account not verified", body = crate::error::ApiError),
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_principal(&state, &auth, &[UserRole::User, UserRole::Admin]).await?;
    let books = BookService::new(state.db_pool.clone())
        .books_for_user(user.uid)
        .await?;

    Ok(Json(UserWithBooks { user, books }))
}

/// Delete an account (administrator only)
///
/// The uid is accepted in hyphenated or bare-hex form. Books and reviews
/// owned by the account are detached, not deleted.
#[utoipa::path(
    delete,
    path = "/v2/auth/users/{uid}",
    tag = "auth",
    security(("bearer" = [])),
    params(("uid" = String, Path, description = "Account UUID, hyphenated or bare-hex")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 403, description = "Not an administrator", body = crate::error::ApiError),
        (status = 404, description = "Account not found", body = crate::error::ApiError),
    )
)]
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_principal(&state, &auth, &[UserRole::Admin]).await?;

    // Uuid::parse_str takes both 8-4-4-4-12 and 32-hex forms
    let uid = Uuid::parse_str(&uid)
        .map_err(|_| BooklynnError::Validation(format!("Invalid account id: {uid}")))?;

    let service = AuthService::new(state.db_pool.clone());
    service.delete_user(uid).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Request a password reset link
///
/// Always answers 200 with the same message so the endpoint cannot be
/// used to probe which addresses have accounts.
#[utoipa::path(
    post,
    path = "/v2/auth/password-reset",
    tag = "auth",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Reset email enqueued if the account exists", body = MessageResponse),
        (status = 400, description = "Invalid email", body = crate::error::ApiError),
    )
)]
pub async fn password_reset_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let service = AuthService::new(state.db_pool.clone());
    if service.find_by_email(&request.email).await?.is_some() {
        let token = action_token::sign(&state.config.auth, &request.email);
        state.mailer.enqueue(EmailJob::PasswordReset {
            to: request.email.clone(),
            token,
        });
    }

    Ok(Json(MessageResponse::new(
        "Please check your email for instructions to reset your password",
    )))
}

/// Redeem a password reset link and replace the password
#[utoipa::path(
    post,
    path = "/v2/auth/password-reset-confirm/{token}",
    tag = "auth",
    request_body = PasswordResetConfirmRequest,
    params(("token" = String, Path, description = "Signed action token from the email link")),
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 400, description = "Mismatched passwords or bad token", body = crate::error::ApiError),
        (status = 404, description = "Account no longer exists", body = crate::error::ApiError),
    )
)]
pub async fn password_reset_confirm_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(request): Json<PasswordResetConfirmRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    if request.new_password != request.confirm_new_password {
        return Err(BooklynnError::Validation("Passwords do not match".to_string()).into());
    }

    let email = action_token::redeem(
        &state.config.auth,
        &token,
        state.config.auth.action_token_ttl_secs,
    )?;

    let service = AuthService::new(state.db_pool.clone());
    service
        .replace_password(&email, &request.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password reset successfully")))
}
