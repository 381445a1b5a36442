use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Request-scoped failures. One failing send or read never corrupts store
/// state or other clients' sessions; everything maps to a status code and a
/// JSON body here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Rate limit exceeded. Please wait before sending another message.")]
    RateLimited,
    #[error("File too large. Max size: {max_mb} MB")]
    AttachmentTooLarge { max_mb: u64 },
    #[error("Only images, documents, and media files are allowed")]
    AttachmentTypeRejected,
    #[error("Message store unavailable")]
    Store(#[from] sqlx::Error),
    #[error("Failed to save file")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::AttachmentTooLarge { .. }
            | ApiError::AttachmentTypeRejected => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Store(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store(e) => tracing::error!("message store error: {:?}", e),
            ApiError::Io(e) => tracing::error!("upload io error: {:?}", e),
            _ => {}
        }
        (
            self.status(),
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
