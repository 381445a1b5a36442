use std::collections::HashSet;

use crate::models::Message;

/// Client-side reconciliation of push delivery with pull-based recovery.
/// Both transports drive the same machine: a live connection feeds
/// `apply_push` while a polling client feeds `merge_since`. A reconnecting
/// client calls `merge_since` with its last cursor before resuming pushes.
///
/// Uninitialized until `seed`; Synced afterwards. The cursor only moves on
/// seed and merge: a push implies freshness and leaves it alone, and the
/// id-dedup makes re-fetching the overlap harmless.
pub struct ClientSync {
    messages: Vec<Message>,
    seen: HashSet<String>,
    cursor: Option<String>,
}

impl ClientSync {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            seen: HashSet::new(),
            cursor: None,
        }
    }

    pub fn is_synced(&self) -> bool {
        self.cursor.is_some()
    }

    /// Seed the local view from a `recent(N)` snapshot. `now` is the cursor
    /// fallback for an empty room.
    pub fn seed(&mut self, recent: Vec<Message>, now: &str) {
        self.cursor = Some(
            recent
                .last()
                .map(|m| m.created_at.clone())
                .unwrap_or_else(|| now.to_string()),
        );
        for message in recent {
            if self.seen.insert(message.id.clone()) {
                self.messages.push(message);
            }
        }
    }

    /// Apply a live `new_message` push. Returns whether it was appended
    /// (false when the id is already present).
    pub fn apply_push(&mut self, message: Message) -> bool {
        if !self.seen.insert(message.id.clone()) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Merge a `since(cursor)` batch: append every message not already
    /// present by id, advance the cursor to the max created_at observed.
    /// Returns the number of messages appended.
    pub fn merge_since(&mut self, batch: Vec<Message>) -> usize {
        let mut appended = 0;
        for message in batch {
            if self
                .cursor
                .as_deref()
                .is_none_or(|c| message.created_at.as_str() > c)
            {
                self.cursor = Some(message.created_at.clone());
            }
            if self.seen.insert(message.id.clone()) {
                self.messages.push(message);
                appended += 1;
            }
        }
        appended
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

impl Default for ClientSync {
    fn default() -> Self {
        Self::new()
    }
}
