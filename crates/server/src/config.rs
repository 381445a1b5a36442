use std::env;

use parley_shared::constants::{DEFAULT_MESSAGE_RETENTION, MAX_UPLOAD_BYTES, SEND_COOLDOWN_MS};

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub message_retention: i64,
    pub send_cooldown_ms: u64,
    pub upload_dir: String,
    pub max_upload_bytes: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./parley.db".into()),
            message_retention: env::var("MESSAGE_RETENTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MESSAGE_RETENTION),
            send_cooldown_ms: env::var("SEND_COOLDOWN_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(SEND_COOLDOWN_MS),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".into()),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_UPLOAD_BYTES),
        }
    }
}
