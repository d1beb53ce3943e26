//! Review service layer
//!
//! Reviews hang off books and record which account wrote them. Creation
//! checks that both ends of the relationship exist before inserting;
//! anything unexpected past that point is reported as a generic server
//! error rather than leaking storage details.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use booklynn_core::{BooklynnError, Result};

use super::models::{CreateReviewRequest, Review};

/// Internal review record from database
#[derive(Debug, Clone, sqlx::FromRow)]
struct ReviewRow {
    uid: Uuid,
    rating: i32,
    review_text: String,
    user_uid: Option<Uuid>,
    book_uid: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            uid: row.uid,
            rating: row.rating,
            review_text: row.review_text,
            user_uid: row.user_uid,
            book_uid: row.book_uid,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Review service
#[derive(Clone)]
pub struct ReviewService {
    db_pool: PgPool,
}

impl ReviewService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    async fn book_exists(&self, book_uid: Uuid) -> Result<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM books WHERE uid = $1)")
                .bind(book_uid)
                .fetch_one(&self.db_pool)
                .await?;
        Ok(exists)
    }

    async fn user_exists(&self, user_uid: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM user_accounts WHERE uid = $1)",
        )
        .bind(user_uid)
        .fetch_one(&self.db_pool)
        .await?;
        Ok(exists)
    }

    /// Attach a review to a book on behalf of an account
    ///
    /// The rating bound was already enforced at the boundary; here both
    /// the book and the acting account must still exist. Insert failures
    /// past those checks surface as a generic internal error.
    pub async fn add_review_to_book(
        &self,
        book_uid: Uuid,
        user_uid: Uuid,
        request: CreateReviewRequest,
    ) -> Result<Review> {
        if !self.book_exists(book_uid).await? {
            return Err(BooklynnError::BookNotFound);
        }
        if !self.user_exists(user_uid).await? {
            return Err(BooklynnError::UserNotFound);
        }

        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (uid, rating, review_text, user_uid, book_uid)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING uid, rating, review_text, user_uid, book_uid, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.rating)
        .bind(&request.review_text)
        .bind(user_uid)
        .bind(book_uid)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, %book_uid, "review insert failed");
            BooklynnError::Other(anyhow::anyhow!("Failed to create review"))
        })?;

        Ok(row.into())
    }

    /// List the reviews attached to one book, newest first
    pub async fn reviews_for_book(&self, book_uid: Uuid) -> Result<Vec<Review>> {
        if !self.book_exists(book_uid).await? {
            return Err(BooklynnError::BookNotFound);
        }

        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT uid, rating, review_text, user_uid, book_uid, created_at, updated_at \
             FROM reviews WHERE book_uid = $1 ORDER BY created_at DESC",
        )
        .bind(book_uid)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// List every review in the system, newest first
    pub async fn list_all(&self) -> Result<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT uid, rating, review_text, user_uid, book_uid, created_at, updated_at \
             FROM reviews ORDER BY created_at DESC",
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Delete a review
    pub async fn delete(&self, uid: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE uid = $1")
            .bind(uid)
            .execute(&self.db_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BooklynnError::ReviewNotFound);
        }

        Ok(())
    }
}
