//! Review API handlers
//!
//! Any verified account can add reviews and read a book's reviews; the
//! system-wide listing and deletion are administrator operations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{require_principal, AuthenticatedUser, UserRole};
use crate::error::AppError;
use crate::reviews::{CreateReviewRequest, Review, ReviewService};
use crate::state::AppState;

/// List every review in the system (administrator only), newest first
#[utoipa::path(
    get,
    path = "/v2/review/",
    tag = "reviews",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All reviews, newest first", body = [Review]),
        (status = 403, description = "Not an administrator", body = crate::error::ApiError),
    )
)]
pub async fn list_all_reviews(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    require_principal(&state, &auth, &[UserRole::Admin]).await?;

    let reviews = ReviewService::new(state.db_pool.clone()).list_all().await?;
    Ok(Json(reviews))
}

/// Add a review to a book
#[utoipa::path(
    post,
    path = "/v2/review/book/{book_uid}",
    tag = "reviews",
    security(("bearer" = [])),
    request_body = CreateReviewRequest,
    params(("book_uid" = Uuid, Path, description = "Book UUID")),
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Rating out of range or text too long", body = crate::error::ApiError),
        (status = 404, description = "Book or account not found", body = crate::error::ApiError),
    )
)]
pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(book_uid): Path<Uuid>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let principal = require_principal(&state, &auth, &[UserRole::User, UserRole::Admin]).await?;
    request.validate()?;

    let review = ReviewService::new(state.db_pool.clone())
        .add_review_to_book(book_uid, principal.uid, request)
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// List the reviews for one book, newest first
#[utoipa::path(
    get,
    path = "/v2/review/book/{book_uid}",
    tag = "reviews",
    security(("bearer" = [])),
    params(("book_uid" = Uuid, Path, description = "Book UUID")),
    responses(
        (status = 200, description = "Reviews for the book, newest first", body = [Review]),
        (status = 404, description = "Book not found", body = crate::error::ApiError),
    )
)]
pub async fn reviews_for_book(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(book_uid): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_principal(&state, &auth, &[UserRole::User, UserRole::Admin]).await?;

    let reviews = ReviewService::new(state.db_pool.clone())
        .reviews_for_book(book_uid)
        .await?;

    Ok(Json(reviews))
}

/// Delete a review (administrator only)
#[utoipa::path(
    delete,
    path = "/v2/review/{review_uid}",
    tag = "reviews",
    security(("bearer" = [])),
    params(("review_uid" = Uuid, Path, description = "Review UUID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Not an administrator", body = crate::error::ApiError),
        (status = 404, description = "Review not found", body = crate::error::ApiError),
    )
)]
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(review_uid): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_principal(&state, &auth, &[UserRole::Admin]).await?;

    ReviewService::new(state.db_pool.clone())
        .delete(review_uid)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
