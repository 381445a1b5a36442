use axum::Router;
use parley_server::{
    config::Config, db, limiter::RateLimiter, presence::PresenceTracker, routes,
    store::MessageStore, ws, AppState,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Arc;
use std::time::Duration;

/// Create an in-memory SQLite pool with schema applied.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");

    db::apply_schema(&pool)
        .await
        .expect("Failed to apply schema");

    pool
}

/// Zero cooldown by default so tests can post freely; rate-limit tests
/// build their own config.
#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        database_path: ":memory:".into(),
        message_retention: 1000,
        send_cooldown_ms: 0,
        upload_dir: "/tmp/parley-test-uploads".into(),
        max_upload_bytes: 10_485_760,
    }
}

#[allow(dead_code)]
pub fn create_test_state(pool: SqlitePool, config: Config) -> Arc<AppState> {
    Arc::new(AppState {
        store: MessageStore::new(pool, config.message_retention),
        limiter: RateLimiter::new(Duration::from_millis(config.send_cooldown_ms)),
        presence: PresenceTracker::new(),
        gateway: Arc::new(ws::gateway::GatewayState::new()),
        config,
    })
}

/// Build a test Axum app with the given pool.
#[allow(dead_code)]
pub fn create_test_app(pool: SqlitePool) -> Router {
    routes::build_router(create_test_state(pool, test_config()))
}

/// POST a text message and return the created message JSON.
#[allow(dead_code)]
pub async fn post_text(
    server: &axum_test::TestServer,
    sender: &str,
    body: &str,
) -> serde_json::Value {
    let res = server
        .post("/api/messages")
        .json(&serde_json::json!({ "sender": sender, "body": body }))
        .await;
    res.assert_status(axum::http::StatusCode::CREATED);
    res.json()
}
