//! Account service layer
//!
//! Business logic for signup, login, verification, password replacement,
//! and account deletion. Queries run against `user_accounts` through the
//! shared pool; only deletion needs an explicit transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use booklynn_core::{
    config::AuthConfig, is_foreign_key_violation, is_unique_violation, BooklynnError, Result,
};

use super::jwt;
use super::models::{LoginRequest, LoginResponse, LoginUser, SignupRequest, User, UserRole};
use super::password::{hash_password, verify_password};

/// Internal account record from database
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    uid: Uuid,
    username: String,
    first_name: Option<String>,
    email: String,
    role: String,
    is_verified: bool,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            uid: row.uid,
            username: row.username,
            first_name: row.first_name,
            email: row.email,
            // The CHECK constraint on the column keeps this total
            role: UserRole::from_str(&row.role).unwrap_or_default(),
            is_verified: row.is_verified,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Account service
#[derive(Clone)]
pub struct AuthService {
    db_pool: PgPool,
}

impl AuthService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Look up an account by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT uid, username, first_name, email, role, is_verified, password_hash, \
             created_at, updated_at FROM user_accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Resolve validated token claims to their account
    ///
    /// Fails with `UserNotFound` when the account was deleted after the
    /// token was issued.
    pub async fn resolve_principal(&self, email: &str) -> Result<User> {
        self.find_by_email(email)
            .await?
            .ok_or(BooklynnError::UserNotFound)
    }

    /// Register a new account
    ///
    /// The password is hashed before any row exists. The existence check
    /// answers the common duplicate case early, but the unique constraint
    /// on email is the authority: two concurrent signups for one address
    /// race past the check, and the loser's insert maps to
    /// `UserAlreadyExists` instead of surfacing a database error.
    pub async fn signup(&self, request: SignupRequest) -> Result<User> {
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_accounts WHERE email = $1")
                .bind(&request.email)
                .fetch_one(&self.db_pool)
                .await?;

        if existing > 0 {
            return Err(BooklynnError::UserAlreadyExists);
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| BooklynnError::Other(e.into()))?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO user_accounts (uid, username, first_name, email, role, is_verified, password_hash)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6)
            RETURNING uid, username, first_name, email, role, is_verified, password_hash, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.username)
        .bind(&request.first_name)
        .bind(&request.email)
        .bind(request.role.as_str())
        .bind(&password_hash)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BooklynnError::UserAlreadyExists
            } else {
                BooklynnError::Database(e)
            }
        })?;

        Ok(row.into())
    }

    /// Login with email and password
    ///
    /// An unknown email and a wrong password are indistinguishable to the
    /// caller; both report `InvalidCredentials`.
    pub async fn login(&self, config: &AuthConfig, request: LoginRequest) -> Result<LoginResponse> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT uid, username, first_name, email, role, is_verified, password_hash, \
             created_at, updated_at FROM user_accounts WHERE email = $1",
        )
        .bind(&request.email)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(BooklynnError::InvalidCredentials)?;

        if !verify_password(&request.password, &row.password_hash) {
            return Err(BooklynnError::InvalidCredentials);
        }

        let access_token = jwt::issue_access_token(config, &row.email, row.uid)
            .map_err(|e| BooklynnError::Other(e.into()))?;
        let refresh_token = jwt::issue_refresh_token(config, &row.email, row.uid)
            .map_err(|e| BooklynnError::Other(e.into()))?;

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            access_token,
            refresh_token,
            user: LoginUser {
                email: row.email,
                uid: row.uid,
            },
        })
    }

    /// Mark an account's email as verified
    pub async fn mark_verified(&self, email: &str) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE user_accounts SET is_verified = TRUE, updated_at = NOW() WHERE email = $1 \
             RETURNING uid, username, first_name, email, role, is_verified, password_hash, \
             created_at, updated_at",
        )
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(BooklynnError::UserNotFound)?;

        Ok(row.into())
    }

    /// Replace an account's password with a fresh hash
    pub async fn replace_password(&self, email: &str, new_password: &str) -> Result<()> {
        let password_hash = hash_password(new_password)
            .map_err(|e| BooklynnError::Other(e.into()))?;

        let result = sqlx::query(
            "UPDATE user_accounts SET password_hash = $1, updated_at = NOW() WHERE email = $2",
        )
        .bind(&password_hash)
        .bind(email)
        .execute(&self.db_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(BooklynnError::UserNotFound);
        }

        Ok(())
    }

    /// Delete an account, detaching its books and reviews first
    ///
    /// Runs as one transaction: owned books and authored reviews have
    /// their `user_uid` nulled, then the account row goes. Any remaining
    /// reference rolls the whole sequence back as `IntegrityConflict`, so
    /// a failed delete never leaves half-orphaned records behind.
    pub async fn delete_user(&self, uid: Uuid) -> Result<()> {
        let mut tx = self.db_pool.begin().await?;

        sqlx::query("UPDATE books SET user_uid = NULL WHERE user_uid = $1")
            .bind(uid)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE reviews SET user_uid = NULL WHERE user_uid = $1")
            .bind(uid)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM user_accounts WHERE uid = $1")
            .bind(uid)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    BooklynnError::IntegrityConflict
                } else {
                    BooklynnError::Database(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(BooklynnError::UserNotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}
