use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

use parley_shared::constants::MESSAGE_PAGE_SIZE;
use parley_shared::validation;

use crate::error::ApiError;
use crate::models::{Attachment, Message, MessageKind};
use crate::ws::events::ServerEvent;
use crate::AppState;

#[derive(Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct PollQuery {
    pub after: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub sender: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub kind: MessageKind,
    pub file_name: Option<String>,
    pub file_size: Option<String>,
    pub file_url: Option<String>,
}

#[derive(Deserialize)]
pub struct ValidateUsernameRequest {
    pub name: String,
}

/// GET /api/messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let limit = query.limit.unwrap_or(MESSAGE_PAGE_SIZE);
    let items = state.store.recent(limit).await?;
    Ok(Json(items))
}

/// GET /api/messages/poll?after=<timestamp>
pub async fn poll_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PollQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let after = query
        .after
        .ok_or_else(|| ApiError::Validation("Missing 'after' timestamp parameter".into()))?;

    let after = chrono::DateTime::parse_from_rfc3339(&after)
        .map_err(|_| ApiError::Validation("Invalid timestamp format".into()))?
        .with_timezone(&chrono::Utc);

    let items = state.store.since(after).await?;
    Ok(Json(items))
}

/// POST /api/messages
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Everything that can fail validation runs before the rate-limit gate,
    // so a rejected request leaves no state behind
    validation::validate_username(&req.sender).map_err(ApiError::Validation)?;
    validation::validate_message_body(&req.body).map_err(ApiError::Validation)?;

    let attachment = match req.kind {
        MessageKind::Text => {
            if req.file_url.is_some() || req.file_name.is_some() {
                return Err(ApiError::Validation(
                    "Text messages cannot carry an attachment".into(),
                ));
            }
            None
        }
        MessageKind::Image | MessageKind::File => Some(Attachment {
            url: req.file_url.ok_or_else(|| {
                ApiError::Validation("Attachment URL is required for file messages".into())
            })?,
            filename: req.file_name.ok_or_else(|| {
                ApiError::Validation("Attachment filename is required for file messages".into())
            })?,
            size: req.file_size.unwrap_or_else(|| "0 Bytes".into()),
        }),
    };

    if !state.limiter.try_accept(&req.sender, Instant::now()).await {
        return Err(ApiError::RateLimited);
    }

    let message = state
        .store
        .append(&req.sender, &req.body, req.kind, attachment)
        .await?;

    state
        .gateway
        .broadcast_all(
            &ServerEvent::NewMessage {
                message: message.clone(),
            },
            None,
        )
        .await;

    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /api/validate-username
pub async fn validate_username(
    Json(req): Json<ValidateUsernameRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let name = req.name.trim();
    validation::validate_username(name).map_err(ApiError::Validation)?;

    Ok(Json(serde_json::json!({
        "valid": true,
        "message": "Username is valid",
    })))
}
