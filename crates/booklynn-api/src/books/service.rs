//! Book service layer
//!
//! Plain catalog CRUD against the `books` table. Listings come back
//! newest first; updates merge only the provided fields and bump
//! `updated_at` in the same statement.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use booklynn_core::{is_foreign_key_violation, BooklynnError, Result};

use super::models::{Book, CreateBookRequest, Language, UpdateBookRequest};

/// Internal book record from database
#[derive(Debug, Clone, sqlx::FromRow)]
struct BookRow {
    uid: Uuid,
    title: String,
    author: String,
    year: String,
    language: String,
    user_uid: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            uid: row.uid,
            title: row.title,
            author: row.author,
            year: row.year,
            language: Language::from_str(&row.language).unwrap_or(Language::Other),
            user_uid: row.user_uid,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Book service
#[derive(Clone)]
pub struct BookService {
    db_pool: PgPool,
}

impl BookService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// List all books, newest first
    pub async fn list(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(
            "SELECT uid, title, author, year, language, user_uid, created_at, updated_at \
             FROM books ORDER BY created_at DESC",
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Fetch one book by id
    pub async fn get(&self, uid: Uuid) -> Result<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            "SELECT uid, title, author, year, language, user_uid, created_at, updated_at \
             FROM books WHERE uid = $1",
        )
        .bind(uid)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(BooklynnError::BookNotFound)?;

        Ok(row.into())
    }

    /// Create a book owned by the acting account
    pub async fn create(&self, request: CreateBookRequest, owner_uid: Uuid) -> Result<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (uid, title, author, year, language, user_uid)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING uid, title, author, year, language, user_uid, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.title)
        .bind(&request.author)
        .bind(&request.year)
        .bind(request.language.as_str())
        .bind(owner_uid)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(row.into())
    }

    /// Merge the provided fields into a book
    ///
    /// Absent fields keep their stored values; `updated_at` always moves.
    pub async fn update(&self, uid: Uuid, request: UpdateBookRequest) -> Result<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                year = COALESCE($4, year),
                language = COALESCE($5, language),
                updated_at = NOW()
            WHERE uid = $1
            RETURNING uid, title, author, year, language, user_uid, created_at, updated_at
            "#,
        )
        .bind(uid)
        .bind(&request.title)
        .bind(&request.author)
        .bind(&request.year)
        .bind(request.language.map(|l| l.as_str().to_string()))
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(BooklynnError::BookNotFound)?;

        Ok(row.into())
    }

    /// Delete a book
    ///
    /// A book that still has reviews attached reports `IntegrityConflict`
    /// rather than a bare database error.
    pub async fn delete(&self, uid: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM books WHERE uid = $1")
            .bind(uid)
            .execute(&self.db_pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    BooklynnError::IntegrityConflict
                } else {
                    BooklynnError::Database(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(BooklynnError::BookNotFound);
        }

        Ok(())
    }

    /// List the books owned by one account, newest first
    pub async fn books_for_user(&self, user_uid: Uuid) -> Result<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(
            "SELECT uid, title, author, year, language, user_uid, created_at, updated_at \
             FROM books WHERE user_uid = $1 ORDER BY created_at DESC",
        )
        .bind(user_uid)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }
}
