//! Database access for the storefront.
//!
//! # Database: `freshcart_storefront`
//!
//! The remote e-commerce API owns products, carts, wishlists and orders.
//! Locally there is a single table:
//!
//! - `tower_sessions.session` - Durable session records (holds the visitor's
//!   API token), created by [`migrate_sessions`] at startup

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_sessions_sqlx_store::PostgresStore;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Create the session schema and table if they don't exist.
///
/// # Errors
///
/// Returns `sqlx::Error` if the migration fails.
pub async fn migrate_sessions(pool: &PgPool) -> Result<PostgresStore, sqlx::Error> {
    let store = PostgresStore::new(pool.clone());
    store.migrate().await?;
    Ok(store)
}
