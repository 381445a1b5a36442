use std::sync::Arc;

use axum::http::{HeaderName, Method};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use parley_server::config::Config;
use parley_server::{db, limiter, presence, routes, store, ws, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley_server=info".into()),
        )
        .init();

    let config = Config::from_env();

    // Initialize database
    let pool = db::init_pool(&config.database_path)
        .await
        .expect("Failed to initialize database");

    let state = Arc::new(AppState {
        store: store::MessageStore::new(pool, config.message_retention),
        limiter: limiter::RateLimiter::new(std::time::Duration::from_millis(
            config.send_cooldown_ms,
        )),
        presence: presence::PresenceTracker::new(),
        gateway: Arc::new(ws::gateway::GatewayState::new()),
        config: config.clone(),
    });

    // Build router
    let app = routes::build_router(state).layer(
        CorsLayer::new()
            .allow_origin(tower_http::cors::AllowOrigin::mirror_request())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([HeaderName::from_static("content-type")])
            .allow_credentials(true),
    );

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");

    tracing::info!("Parley server running on {}", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
