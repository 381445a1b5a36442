use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Per-sender cooldown gate, checked before a message is accepted into the
/// store. Entries are purged when the last connection for a name disconnects.
pub struct RateLimiter {
    cooldown: Duration,
    last_send: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_send: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true and records `now` iff the cooldown has elapsed since the
    /// sender's last accepted send. Check and update happen under one lock;
    /// two near-simultaneous sends from the same sender cannot both pass.
    /// A rejection leaves the recorded time untouched.
    pub async fn try_accept(&self, sender: &str, now: Instant) -> bool {
        let mut last_send = self.last_send.lock().await;
        if let Some(&prev) = last_send.get(sender) {
            if now.duration_since(prev) < self.cooldown {
                return false;
            }
        }
        last_send.insert(sender.to_string(), now);
        true
    }

    /// Drop the entry for a sender, called when the name's last connection
    /// goes away.
    pub async fn forget(&self, sender: &str) {
        self.last_send.lock().await.remove(sender);
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
