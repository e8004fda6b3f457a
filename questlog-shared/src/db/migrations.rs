/// Store migration runner
///
/// Migrations live in the `migrations/` directory at this crate's root and
/// are applied with sqlx's migration system. The single initial migration
/// creates the three tables plus the `edited_at` triggers on `attributes`
/// and `users`.
///
/// # Example
///
/// ```no_run
/// use questlog_shared::db::migrations::run_migrations;
/// use questlog_shared::db::pool::{create_pool, StoreConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(StoreConfig::default()).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::SqlitePool;
use tracing::{info, warn};

/// Runs all pending store migrations
///
/// # Errors
///
/// Returns an error if a migration file is malformed or fails to execute.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running store migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("All store migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
