//! Request guards for protected routes
//!
//! One authentication routine serves both token kinds; the fixed order of
//! checks is the contract here:
//!
//! 1. Authorization header present
//! 2. header is `Bearer <token>`
//! 3. token decodes with a valid signature and unexpired `exp`
//! 4. jti is not on the revocation blocklist
//! 5. the `refresh` flag matches the kind the route expects
//!
//! On success the claims land in request extensions as
//! [`AuthenticatedUser`]; handlers that need the full account row resolve
//! it with [`require_principal`], which also applies the role gate.
//! Verification is always checked before role, so an unverified admin is
//! told to verify, not that it lacks permission.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use booklynn_core::{BooklynnError, Result};

use super::jwt::{self, Claims};
use super::models::{User, UserRole};
use super::service::AuthService;
use crate::error::AppError;
use crate::state::AppState;

/// Which kind of bearer token a route expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Authenticated token holder, inserted into request extensions
///
/// Extract in handlers with `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Email address from the token claims
    pub email: String,
    /// Account UUID from the token claims
    pub user_uid: Uuid,
    /// Token id, needed for revocation on logout
    pub jti: String,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = BooklynnError;

    /// A signed token whose `user_uid` is not a UUID was not minted by
    /// us, so it is rejected outright rather than mapped to a sentinel.
    fn try_from(claims: Claims) -> Result<Self> {
        let user_uid =
            Uuid::parse_str(&claims.user.user_uid).map_err(|_| BooklynnError::InvalidToken)?;
        Ok(Self {
            user_uid,
            email: claims.user.email,
            jti: claims.jti,
        })
    }
}

/// Pull the bearer token out of the Authorization header
fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(BooklynnError::MissingToken)?
        .to_str()
        .map_err(|_| BooklynnError::MalformedToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or(BooklynnError::MalformedToken)
}

/// Run the full guard state machine against a request's headers
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    expected: TokenKind,
) -> Result<AuthenticatedUser> {
    let token = bearer_token(headers)?;

    let claims = jwt::decode_token(&state.config.auth, token)
        .map_err(|_| BooklynnError::InvalidToken)?;

    if state.revocations.is_revoked(&claims.jti).await? {
        return Err(BooklynnError::TokenRevoked);
    }

    match expected {
        TokenKind::Access if claims.refresh => Err(BooklynnError::AccessTokenRequired),
        TokenKind::Refresh if !claims.refresh => Err(BooklynnError::RefreshTokenRequired),
        _ => AuthenticatedUser::try_from(claims),
    }
}

/// Middleware requiring a valid access token
///
/// # Usage
///
/// ```ignore
/// use axum::{middleware, routing::get, Router};
/// use booklynn_api::auth::guard::require_access_token;
///
/// let protected = Router::new()
///     .route("/me", get(me_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), require_access_token));
/// ```
pub async fn require_access_token(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, AppError> {
    let user = authenticate(&state, request.headers(), TokenKind::Access).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Middleware requiring a valid refresh token
pub async fn require_refresh_token(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, AppError> {
    let user = authenticate(&state, request.headers(), TokenKind::Refresh).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Role gate over a resolved account
///
/// The verification check always runs first, regardless of role.
pub fn authorize(user: &User, allowed_roles: &[UserRole]) -> Result<()> {
    if !user.is_verified {
        return Err(BooklynnError::AccountNotVerified);
    }
    if !allowed_roles.contains(&user.role) {
        return Err(BooklynnError::InsufficientPermission);
    }
    Ok(())
}

/// Resolve the token holder to an account row and apply the role gate
///
/// Fails with `UserNotFound` when the token outlived its account.
pub async fn require_principal(
    state: &AppState,
    auth: &AuthenticatedUser,
    allowed_roles: &[UserRole],
) -> Result<User> {
    let service = AuthService::new(state.db_pool.clone());
    let user = service.resolve_principal(&auth.email).await?;
    authorize(&user, allowed_roles)?;
    Ok(user)
}
