pub const APP_NAME: &str = "Parley";

// Limits
pub const MAX_MESSAGE_LENGTH: usize = 500;
pub const MAX_USERNAME_LENGTH: usize = 20;
pub const MIN_USERNAME_LENGTH: usize = 2;

pub const MESSAGE_PAGE_SIZE: i64 = 50;

// Minimum elapsed time between two accepted sends from the same sender
pub const SEND_COOLDOWN_MS: u64 = 1_000;

// Retention window: messages kept before the oldest is silently evicted
pub const DEFAULT_MESSAGE_RETENTION: i64 = 1_000;

// Uploads
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &[
    "jpeg", "jpg", "png", "gif", "webp", "pdf", "txt", "doc", "docx", "zip", "mp4", "mp3",
];
