use serde::{Deserialize, Serialize};

use crate::models::Message;

// ── Client → Server Events ──

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinChat { name: String },
    TypingStart { name: String },
    TypingStop { name: String },
    Ping,
}

// ── Server → Client Events ──

/// Only `NewMessage` has durable backing in the store. A client that misses
/// a push recovers message events via the poll endpoint; the transient
/// signals are simply gone.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    NewMessage {
        message: Message,
    },
    UserJoined {
        name: String,
        timestamp: String,
    },
    UserLeft {
        name: String,
        timestamp: String,
    },
    UserCount {
        count: usize,
    },
    UserTyping {
        name: String,
        typing: bool,
    },
    Error {
        message: String,
    },
}
