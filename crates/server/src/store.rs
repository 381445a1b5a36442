use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use parley_shared::validation;

use crate::error::ApiError;
use crate::models::{format_timestamp, Attachment, Message, MessageKind};

/// Ordered, append-only record of messages with bounded retention. Owns the
/// `messages` relation; callers never touch the table directly.
pub struct MessageStore {
    pool: SqlitePool,
    retention: i64,
    // Serializes appends and carries the last issued timestamp, so
    // created_at is strictly increasing in insertion order and usable as
    // a gap-free cursor.
    clock: Mutex<DateTime<Utc>>,
}

impl MessageStore {
    pub fn new(pool: SqlitePool, retention: i64) -> Self {
        Self {
            pool,
            retention: retention.max(1),
            clock: Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Validate, assign id + timestamp, insert, and evict beyond the
    /// retention window, all under the append lock with insert and eviction
    /// in one transaction. Returns the canonical stored message so the
    /// caller can broadcast exactly what later reads will return.
    pub async fn append(
        &self,
        sender: &str,
        body: &str,
        kind: MessageKind,
        attachment: Option<Attachment>,
    ) -> Result<Message, ApiError> {
        validation::validate_username(sender).map_err(ApiError::Validation)?;
        validation::validate_message_body(body).map_err(ApiError::Validation)?;
        match (kind, &attachment) {
            (MessageKind::Text, Some(_)) => {
                return Err(ApiError::Validation(
                    "Text messages cannot carry an attachment".into(),
                ))
            }
            (MessageKind::Image | MessageKind::File, None) => {
                return Err(ApiError::Validation(
                    "File messages require an attachment".into(),
                ))
            }
            _ => {}
        }

        let mut clock = self.clock.lock().await;

        let mut now = Utc::now();
        if now <= *clock {
            now = *clock + Duration::milliseconds(1);
        }
        *clock = now;

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            sender: sender.to_string(),
            body: body.to_string(),
            kind,
            file_name: attachment.as_ref().map(|a| a.filename.clone()),
            file_size: attachment.as_ref().map(|a| a.size.clone()),
            file_url: attachment.as_ref().map(|a| a.url.clone()),
            created_at: format_timestamp(now),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO messages (id, sender, body, kind, file_name, file_size, file_url, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&message.id)
        .bind(&message.sender)
        .bind(&message.body)
        .bind(message.kind)
        .bind(&message.file_name)
        .bind(&message.file_size)
        .bind(&message.file_url)
        .bind(&message.created_at)
        .execute(&mut *tx)
        .await?;

        // Silent eviction, oldest first, no tombstone
        sqlx::query(
            r#"DELETE FROM messages WHERE id IN (
                 SELECT id FROM messages
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT -1 OFFSET ?
               )"#,
        )
        .bind(self.retention)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(message)
    }

    /// Up to `limit` most recent messages in ascending timestamp order.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Message>, ApiError> {
        let limit = limit.clamp(1, self.retention);

        let mut items = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        items.reverse(); // chronological order
        Ok(items)
    }

    /// Every retained message with `created_at > after`, ascending. Strict
    /// greater-than: a client re-polling with its last-seen timestamp never
    /// receives that message again.
    pub async fn since(&self, after: DateTime<Utc>) -> Result<Vec<Message>, ApiError> {
        let cursor = format_timestamp(after);

        let items = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE created_at > ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(&cursor)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
