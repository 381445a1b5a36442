pub mod files;
pub mod messages;

use crate::ws;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    // Leave headroom over the attachment ceiling so the handler, not the
    // framework, rejects oversize uploads with the canonical error
    let upload_body_limit = state.config.max_upload_bytes as usize + 1024 * 1024;

    let api_routes = Router::new()
        .route("/messages", get(messages::list_messages))
        .route("/messages", post(messages::create_message))
        .route("/messages/poll", get(messages::poll_messages))
        .route("/validate-username", post(messages::validate_username))
        .route(
            "/upload",
            post(files::upload).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/files/{id}/{filename}", get(files::serve_file));

    Router::new()
        .nest("/api", api_routes)
        .route("/gateway", get(ws::handler::ws_handler))
        .with_state(state)
}
