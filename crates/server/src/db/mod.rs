//! Database operations against `PostgreSQL`.
//!
//! ## Tables
//!
//! - `users` - Registered accounts (email + password hash)
//! - `categories` - Product categories
//! - `products` - Catalog products (`available` is a generated column)
//! - `product_images` - Uploaded product images (cascade-deleted)
//! - `orders` / `order_items` - Orders and their line items
//!
//! Queries are runtime-checked (`sqlx::query` / `sqlx::query_as`); no live
//! database is required at compile time. Unique-constraint violations are
//! classified via `DatabaseError::is_unique_violation` rather than by
//! message inspection.
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and run via `sqlx migrate`.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod catalog;
pub mod orders;
pub mod users;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or product name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
