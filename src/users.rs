// User records - SQLite-backed store with unique username/email

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Missing username or email")]
    MissingFields,

    #[error("User already exists")]
    AlreadyExists,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// RFC 3339, UTC
    pub created_at: String,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
)";

#[derive(Debug, Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    /// Connect and create the schema if needed
    pub async fn connect(url: &str) -> Result<Self, UserError> {
        // Each in-memory connection is its own database
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), UserError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<User>, UserError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, email, created_at FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn create(&self, username: &str, email: &str) -> Result<User, UserError> {
        let (username, email) = (username.trim(), email.trim());
        if username.is_empty() || email.is_empty() {
            return Err(UserError::MissingFields);
        }

        let created_at = OffsetDateTime::now_utc().format(&Rfc3339)?;
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, created_at) VALUES (?, ?, ?)
             RETURNING id, username, email, created_at",
        )
        .bind(username)
        .bind(email)
        .bind(&created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => {
                tracing::info!(id = user.id, username = %user.username, "user created");
                Ok(user)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(UserError::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }
}
