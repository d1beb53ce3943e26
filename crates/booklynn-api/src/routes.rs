//! API route definitions
//!
//! All business routes hang under `/v2`. Three trees get merged: public
//! auth endpoints, the refresh endpoint behind the refresh-token guard,
//! and everything else behind the access-token guard.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use utoipa::{Modify, OpenApi};

use crate::auth::{require_access_token, require_refresh_token};
use crate::handlers::{auth, books, health, reviews};
use crate::state::AppState;

/// Create the `/v2` route tree
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/verify/:token", get(auth::verify_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/password-reset", post(auth::password_reset_handler))
        .route(
            "/auth/password-reset-confirm/:token",
            post(auth::password_reset_confirm_handler),
        );

    let refresh_routes = Router::new()
        .route("/auth/refresh", post(auth::refresh_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_refresh_token,
        ));

    let protected_routes = Router::new()
        .route("/auth/logout", get(auth::logout_handler))
        .route("/auth/me", get(auth::me_handler))
        .route("/auth/users/:uid", delete(auth::delete_user_handler))
        // Book endpoints
        .route("/books/", get(books::list_books).post(books::create_book))
        .route(
            "/books/:uid",
            get(books::get_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/user/:user_uid", get(books::books_for_user))
        // Review endpoints
        .route("/review/", get(reviews::list_all_reviews))
        .route(
            "/review/book/:book_uid",
            get(reviews::reviews_for_book).post(reviews::add_review),
        )
        .route("/review/:review_uid", delete(reviews::delete_review))
        .layer(middleware::from_fn_with_state(state, require_access_token));

    Router::new()
        .merge(public_routes)
        .merge(refresh_routes)
        .merge(protected_routes)
}

/// OpenAPI document for the whole surface
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::verify_handler,
        auth::login_handler,
        auth::refresh_handler,
        auth::logout_handler,
        auth::me_handler,
        auth::delete_user_handler,
        auth::password_reset_handler,
        auth::password_reset_confirm_handler,
        books::list_books,
        books::create_book,
        books::get_book,
        books::update_book,
        books::delete_book,
        books::books_for_user,
        reviews::list_all_reviews,
        reviews::add_review,
        reviews::reviews_for_book,
        reviews::delete_review,
        health::health_check,
    ),
    components(schemas(
        crate::auth::models::User,
        crate::auth::models::UserRole,
        crate::auth::models::UserWithBooks,
        crate::auth::models::SignupRequest,
        crate::auth::models::LoginRequest,
        crate::auth::models::LoginUser,
        crate::auth::models::LoginResponse,
        crate::auth::models::TokenRefreshResponse,
        crate::auth::models::MessageResponse,
        crate::auth::models::PasswordResetRequest,
        crate::auth::models::PasswordResetConfirmRequest,
        auth::SignupResponse,
        crate::books::models::Book,
        crate::books::models::Language,
        crate::books::models::CreateBookRequest,
        crate::books::models::UpdateBookRequest,
        crate::reviews::models::Review,
        crate::reviews::models::CreateReviewRequest,
        crate::error::ApiError,
        health::HealthResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Accounts, tokens, and email links"),
        (name = "books", description = "Book catalog CRUD"),
        (name = "reviews", description = "Per-book reviews"),
        (name = "health", description = "Liveness and metrics"),
    ),
    info(
        title = "Booklynn API",
        description = "Book review service with JWT authentication",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
