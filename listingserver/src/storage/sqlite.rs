//! SQLite storage for listings.
//!
//! Implements the store contracts consumed by `ListingService`. The
//! partial update is a single COALESCE statement, so a merge is one
//! atomic write. The creator column references the users table; a
//! foreign-key violation means the token subject is not a real user.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::service::{ListingProvider, ListingSaver};
use shared::model::{Listing, ListingPatch, NewListing};
use shared::AppError;

const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";

pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens (creating if missing) the database at `path` and ensures the
    /// schema exists. Foreign keys are switched on per connection; SQLite
    /// leaves them off by default.
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

    /// Wraps an existing pool, ensuring the schema exists. The users
    /// table matches the SSO server's definition so both services can
    /// share one database file.
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
            "CREATE TABLE IF NOT EXISTS listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                category TEXT NOT NULL,
                closed INTEGER NOT NULL,
                price INTEGER NOT NULL,
                creator INTEGER NOT NULL REFERENCES users (id)
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

fn is_foreign_key_violation(err: &dyn sqlx::error::DatabaseError) -> bool {
    err.code().as_deref() == Some(SQLITE_CONSTRAINT_FOREIGNKEY)
}

#[async_trait]
impl ListingSaver for SqliteStorage {
    async fn save_listing(&self, new: &NewListing, creator: i64) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO listings (title, description, quantity, category, closed, price, creator)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.quantity)
        .bind(&new.category)
        .bind(new.closed)
        .bind(new.price)
        .bind(creator)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(db_err)) if is_foreign_key_violation(db_err.as_ref()) => {
                Err(AppError::UserNotFound)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_listing(&self, id: i64, patch: &ListingPatch) -> Result<(), AppError> {
        let done = sqlx::query(
            "UPDATE listings
             SET title = COALESCE(?, title),
                 description = COALESCE(?, description),
                 quantity = COALESCE(?, quantity),
                 category = COALESCE(?, category),
                 closed = COALESCE(?, closed),
                 price = COALESCE(?, price)
             WHERE id = ?",
        )
        .bind(patch.title.as_option().map(String::as_str))
        .bind(patch.description.as_option().map(String::as_str))
        .bind(patch.quantity.as_option().copied())
        .bind(patch.category.as_option().map(String::as_str))
        .bind(patch.closed.as_option().copied())
        .bind(patch.price.as_option().copied())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if done.rows_affected() == 0 {
            return Err(AppError::ListingNotFound);
        }

        Ok(())
    }

    async fn delete_listing(&self, id: i64) -> Result<(), AppError> {
        let done = sqlx::query("DELETE FROM listings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if done.rows_affected() == 0 {
            return Err(AppError::ListingNotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl ListingProvider for SqliteStorage {
    async fn listing(&self, id: i64) -> Result<Listing, AppError> {
        let row: Option<(i64, String, String, i64, String, bool, i64, i64)> = sqlx::query_as(
            "SELECT id, title, description, quantity, category, closed, price, creator
             FROM listings
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((id, title, description, quantity, category, closed, price, creator)) => {
                Ok(Listing {
                    id,
                    title,
                    description,
                    quantity,
                    category,
                    closed,
                    price,
                    creator,
                })
            }
            None => Err(AppError::ListingNotFound),
        }
    }
}
