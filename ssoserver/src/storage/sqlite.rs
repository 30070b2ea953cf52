//! SQLite storage for users and applications.
//!
//! Implements the store contracts consumed by `AuthService`. Uniqueness
//! of emails is enforced by the database; the constraint violation is
//! translated here and never leaks as a raw driver error.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::service::{AppProvider, UserProvider, UserSaver};
use shared::model::{App, User};
use shared::AppError;

// SQLite extended result codes surfaced through sqlx.
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";

pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens (creating if missing) the database at `path` and ensures the
    /// schema exists.
    pub async fn connect(path: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(AppError::from)?;

        Self::from_pool(pool).await
    }

    /// Wraps an existing pool, ensuring the schema exists. Used by tests
    /// with in-memory databases.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                pass_hash BLOB NOT NULL,
                is_admin INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS apps (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                secret BLOB NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

fn is_unique_violation(err: &dyn sqlx::error::DatabaseError) -> bool {
    matches!(
        err.code().as_deref(),
        Some(SQLITE_CONSTRAINT_UNIQUE) | Some(SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}

#[async_trait]
impl UserSaver for SqliteStorage {
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> Result<i64, AppError> {
        let result = sqlx::query("INSERT INTO users (email, pass_hash) VALUES (?, ?)")
            .bind(email)
            .bind(pass_hash)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(db_err)) if is_unique_violation(db_err.as_ref()) => {
                Err(AppError::UserExists)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl UserProvider for SqliteStorage {
    async fn user_by_email(&self, email: &str) -> Result<User, AppError> {
        let row: Option<(i64, String, Vec<u8>)> =
            sqlx::query_as("SELECT id, email, pass_hash FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((id, email, pass_hash)) => Ok(User {
                id,
                email,
                pass_hash,
            }),
            None => Err(AppError::UserNotFound),
        }
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, AppError> {
        let row: Option<(bool,)> = sqlx::query_as("SELECT is_admin FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((is_admin,)) => Ok(is_admin),
            None => Err(AppError::UserNotFound),
        }
    }
}

#[async_trait]
impl AppProvider for SqliteStorage {
    async fn app(&self, app_id: i64) -> Result<App, AppError> {
        let row: Option<(i64, String, Vec<u8>)> =
            sqlx::query_as("SELECT id, name, secret FROM apps WHERE id = ?")
                .bind(app_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((id, name, secret_key)) => Ok(App {
                id,
                name,
                secret_key,
            }),
            None => Err(AppError::AppNotFound),
        }
    }
}
