/// Store connection pool management
///
/// This module provides the SQLite connection pool used by every model
/// operation. The pool is created once at process start, injected into the
/// managers, and closed at shutdown.
///
/// The store file is created on first open. Foreign-key enforcement is
/// switched on for every connection so that `ON DELETE CASCADE` on
/// `tasks.user_id` is honored.
///
/// # Example
///
/// ```no_run
/// use questlog_shared::db::pool::{create_pool, StoreConfig};
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let config = StoreConfig {
///     url: "sqlite://questlog.db".to_string(),
///     ..Default::default()
/// };
///
/// let pool = create_pool(config).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the store connection pool
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite connection URL (e.g., "sqlite://questlog.db")
    ///
    /// `sqlite::memory:` gives a throwaway in-memory store, useful in tests
    /// together with `max_connections: 1`.
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Timeout for acquiring a connection from the pool (seconds)
    pub acquire_timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://questlog.db".to_string(),
            max_connections: 5,
            acquire_timeout_seconds: 30,
        }
    }
}

/// Creates and initializes the SQLite connection pool
///
/// This function:
/// 1. Opens (creating if missing) the store file named by the URL
/// 2. Enables foreign-key enforcement on every connection
/// 3. Performs a health check to verify the store is usable
///
/// # Errors
///
/// Returns an error if the URL is invalid, the file cannot be opened, or
/// the health check fails.
pub async fn create_pool(config: StoreConfig) -> Result<SqlitePool, sqlx::Error> {
    info!(
        url = %config.url,
        max_connections = config.max_connections,
        "Creating store connection pool"
    );

    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect_with(options)
        .await?;

    health_check(&pool).await?;

    info!("Store connection pool created successfully");
    Ok(pool)
}

/// Performs a health check on the store connection
///
/// Executes a trivial query to verify the store is reachable and responding.
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    debug!("Performing store health check");

    let result: (i64,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if result.0 == 1 {
        debug!("Store health check passed");
        Ok(())
    } else {
        Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ))
    }
}

/// Gracefully closes the connection pool
///
/// Called during shutdown so outstanding writes are flushed to the store
/// file before the process exits.
pub async fn close_pool(pool: SqlitePool) {
    info!("Closing store connection pool");
    pool.close().await;
}
