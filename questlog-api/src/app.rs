/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use questlog_api::{app::AppState, config::Config};
/// use questlog_shared::db::pool::{create_pool, StoreConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(StoreConfig::default()).await?;
/// let state = AppState::new(pool, config);
/// let app = questlog_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::routes;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Store connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                      # Health check
/// ├── /users                       # User resource
/// │   ├── POST   /                 # Create user
/// │   ├── GET    /                 # List users with nested tasks
/// │   ├── GET    /:id              # Get user with nested tasks
/// │   ├── PATCH  /:id              # Partial update
/// │   └── DELETE /:id              # Delete (cascades to owned tasks)
/// ├── /tasks                       # Task resource
/// │   ├── POST   /                 # Create task, then append id to owner
/// │   ├── GET    /                 # List tasks with resolved attributes
/// │   ├── GET    /user/:user_id    # List a user's tasks (raw rows)
/// │   ├── GET    /:id              # Get task with resolved attributes
/// │   ├── PATCH  /:id              # Partial update
/// │   └── DELETE /:id              # Delete
/// └── /atributos                   # Attribute resource
///     ├── POST   /                 # Create attribute
///     ├── GET    /                 # List attributes
///     ├── GET    /:id              # Get attribute
///     ├── PATCH  /:id              # Partial update
///     └── DELETE /:id              # Delete
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
pub fn build_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route(
            "/",
            post(routes::users::create_user).get(routes::users::list_users),
        )
        .route(
            "/:id",
            get(routes::users::get_user)
                .patch(routes::users::update_user)
                .delete(routes::users::delete_user),
        );

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route("/user/:user_id", get(routes::tasks::list_tasks_by_user))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        );

    let attribute_routes = Router::new()
        .route(
            "/",
            post(routes::attributes::create_attribute)
                .get(routes::attributes::list_attributes),
        )
        .route(
            "/:id",
            get(routes::attributes::get_attribute)
                .patch(routes::attributes::update_attribute)
                .delete(routes::attributes::delete_attribute),
        );

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/users", user_routes)
        .nest("/tasks", task_routes)
        .nest("/atributos", attribute_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
