use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::io::ReaderStream;

use parley_shared::constants::ALLOWED_UPLOAD_EXTENSIONS;
use parley_shared::validation;

use crate::error::ApiError;
use crate::models::{Attachment, MessageKind};
use crate::ws::events::ServerEvent;
use crate::AppState;

/// POST /api/upload
///
/// Multipart `{file, sender}`. The payload is bounded and type-checked
/// before the rate-limit gate and the store ever see it.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut sender: Option<String> = None;
    let mut file: Option<(String, String, axum::body::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("Malformed multipart body".into()))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("sender") => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| ApiError::Validation("Malformed sender field".into()))?;
                sender = Some(value);
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("file").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::Validation("Failed to read file".into()))?;
                file = Some((filename, content_type, data));
            }
            _ => {}
        }
    }

    let sender = sender.ok_or_else(|| ApiError::Validation("Sender is required".into()))?;
    validation::validate_username(&sender).map_err(ApiError::Validation)?;

    let (filename, content_type, data) =
        file.ok_or_else(|| ApiError::Validation("No file provided".into()))?;

    if data.len() as u64 > state.config.max_upload_bytes {
        return Err(ApiError::AttachmentTooLarge {
            max_mb: state.config.max_upload_bytes / 1_048_576,
        });
    }

    let ext = extension_of(&filename);
    if !ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.as_str()) || !mime_allowed(&ext, &content_type) {
        return Err(ApiError::AttachmentTypeRejected);
    }

    // Uploads create store messages, so they pass the same gate as text sends
    if !state.limiter.try_accept(&sender, Instant::now()).await {
        return Err(ApiError::RateLimited);
    }

    let id = uuid::Uuid::new_v4().to_string();
    let stored_filename = format!("{}.{}", id, ext);

    tokio::fs::create_dir_all(&state.config.upload_dir).await.ok();
    let file_path = std::path::Path::new(&state.config.upload_dir).join(&stored_filename);
    tokio::fs::write(&file_path, &data).await?;

    let kind = if content_type.starts_with("image/") {
        MessageKind::Image
    } else {
        MessageKind::File
    };

    let attachment = Attachment {
        url: format!("/api/files/{}/{}", id, stored_filename),
        filename: filename.clone(),
        size: format_file_size(data.len() as u64),
    };

    // The body carries the original filename, which is what clients render
    let message = match state
        .store
        .append(&sender, &filename, kind, Some(attachment))
        .await
    {
        Ok(m) => m,
        Err(e) => {
            // No message, no file
            let _ = tokio::fs::remove_file(&file_path).await;
            return Err(e);
        }
    };

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

/// GET /api/files/:id/:filename
pub async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path((id, filename)): Path<(String, String)>,
) -> impl IntoResponse {
    // Stored names are {uuid}.{ext}; anything else never touches the disk
    if !id
        .chars()
        .all(|c| c.is_ascii_hexdigit() || c == '-')
    {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "File not found"})),
        )
            .into_response();
    }

    let ext = extension_of(&filename);
    let stored_filename = format!("{}.{}", id, ext);
    let file_path = std::path::Path::new(&state.config.upload_dir).join(&stored_filename);

    let file = match tokio::fs::File::open(&file_path).await {
        Ok(f) => f,
        Err(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "File not found"})),
            )
                .into_response()
        }
    };

    let stream = ReaderStream::new(file);

    (
        [
            (header::CONTENT_TYPE, content_type_for(&ext).to_string()),
            (header::CONTENT_DISPOSITION, "inline".to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Sanitized lowercase extension: short, alphanumeric, or "bin".
fn extension_of(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".into())
}

/// The declared MIME type must agree with the extension; a matching
/// extension alone is not enough.
fn mime_allowed(ext: &str, content_type: &str) -> bool {
    content_type == content_type_for(ext) || content_type.contains(ext)
}

fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "zip" => "application/zip",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".into();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let exp = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    let rounded = format!("{:.2}", value);
    let rounded = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", rounded, UNITS[exp])
}
