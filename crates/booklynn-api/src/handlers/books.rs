//! Book catalog API handlers
//!
//! Every route here sits behind the access-token guard; the role gate
//! admits any verified account.

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
use crate::books::{Book, BookService, CreateBookRequest, UpdateBookRequest};
use crate::error::AppError;
use crate::state::AppState;

const ANY_VERIFIED: &[UserRole] = &[UserRole::User, UserRole::Admin];

/// List all books, newest first
#[utoipa::path(
    get,
    path = "/v2/books/",
    tag = "books",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All books, newest first", body = [Book]),
        (status = 401, description = "Access token missing or invalid", body = crate::error::ApiError),
    )
)]
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    require_principal(&state, &auth, ANY_VERIFIED).await?;

    let books = BookService::new(state.db_pool.clone()).list().await?;
    Ok(Json(books))
}

/// Create a book owned by the authenticated account
#[utoipa::path(
    post,
    path = "/v2/books/",
    tag = "books",
    security(("bearer" = [])),
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
    )
)]
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<CreateBookRequest>,
) -> Result<impl IntoResponse, AppError> {
    let principal = require_principal(&state, &auth, ANY_VERIFIED).await?;
    request.validate()?;

    let book = BookService::new(state.db_pool.clone())
        .create(request, principal.uid)
        .await?;

    Ok((StatusCode::CREATED, Json(book)))
}

/// Fetch one book
#[utoipa::path(
    get,
    path = "/v2/books/{uid}",
    tag = "books",
    security(("bearer" = [])),
    params(("uid" = Uuid, Path, description = "Book UUID")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ApiError),
    )
)]
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(uid): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_principal(&state, &auth, ANY_VERIFIED).await?;

    let book = BookService::new(state.db_pool.clone()).get(uid).await?;
    Ok(Json(book))
}

/// Merge the provided fields into a book
#[utoipa::path(
    patch,
    path = "/v2/books/{uid}",
    tag = "books",
    security(("bearer" = [])),
    request_body = UpdateBookRequest,
    params(("uid" = Uuid, Path, description = "Book UUID")),
    responses(
        (status = 200, description = "Updated book", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ApiError),
    )
)]
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(uid): Path<Uuid>,
    Json(request): Json<UpdateBookRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_principal(&state, &auth, ANY_VERIFIED).await?;
    request.validate()?;

    let book = BookService::new(state.db_pool.clone())
        .update(uid, request)
        .await?;

    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/v2/books/{uid}",
    tag = "books",
    security(("bearer" = [])),
    params(("uid" = Uuid, Path, description = "Book UUID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ApiError),
        (status = 409, description = "Reviews still reference this book", body = crate::error::ApiError),
    )
)]
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(uid): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_principal(&state, &auth, ANY_VERIFIED).await?;

    BookService::new(state.db_pool.clone()).delete(uid).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the books owned by one account, newest first
#[utoipa::path(
    get,
    path = "/v2/books/user/{user_uid}",
    tag = "books",
    security(("bearer" = [])),
    params(("user_uid" = Uuid, Path, description = "Owning account UUID")),
    responses(
        (status = 200, description = "Books owned by the account", body = [Book]),
    )
)]
pub async fn books_for_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_uid): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_principal(&state, &auth, ANY_VERIFIED).await?;

    let books = BookService::new(state.db_pool.clone())
        .books_for_user(user_uid)
        .await?;

    Ok(Json(books))
}
