/// Common test utilities for API integration tests
///
/// Builds the full router over a throwaway in-memory SQLite store with the
/// real schema applied, and provides a small request helper so tests read
/// as request/response pairs.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use questlog_api::app::{build_router, AppState};
use questlog_api::config::{ApiConfig, Config, DatabaseConfig};
use questlog_shared::db::migrations::run_migrations;
use questlog_shared::db::pool::{create_pool, StoreConfig};
use sqlx::SqlitePool;
use tower::Service as _;

/// Test context: the router plus direct pool access for assertions
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a fresh in-memory store and router
    pub async fn new() -> anyhow::Result<Self> {
        let db = create_pool(StoreConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Default::default()
        })
        .await?;

        run_migrations(&db).await?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
        };

        let app = build_router(AppState::new(db.clone(), config));

        Ok(Self { db, app })
    }

    /// Sends a request and returns (status, parsed JSON body)
    ///
    /// Empty bodies (204 responses) come back as `Value::Null`.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("failed to build request"),
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        let response = self
            .app
            .clone()
            .call(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");

        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body was not JSON")
        };

        (status, json)
    }
}

/// Creates a user through the API and returns its id
pub async fn create_user(ctx: &TestContext, name: &str) -> i64 {
    let (status, body) = ctx
        .send(
            "POST",
            "/users",
            Some(serde_json::json!({
                "name": name,
                "level": 1,
                "experience": 0,
                "rank": "novice"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("create user returned no id")
}

/// Creates a task through the API and returns its id
pub async fn create_task(ctx: &TestContext, name: &str, user_id: i64) -> i64 {
    let (status, body) = ctx
        .send(
            "POST",
            "/tasks",
            Some(serde_json::json!({
                "name": name,
                "experience": 10,
                "userId": user_id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("create task returned no id")
}
