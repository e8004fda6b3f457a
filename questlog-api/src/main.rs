//! # Questlog API Server
//!
//! REST backend for gamified task tracking: users accrue experience and
//! rank, tasks carry experience rewards and completion counts, and tasks
//! are composed of reusable attribute records.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p questlog-api
//! ```

use questlog_api::{
    app::{build_router, AppState},
    config::Config,
};
use questlog_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, StoreConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questlog_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Questlog API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(StoreConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let addr = config.bind_address();
    let state = AppState::new(pool.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves when the process receives ctrl-c
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("Failed to install ctrl-c handler; shutting down");
        return;
    }
    tracing::info!("Shutdown signal received");
}
