use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::ws::gateway::ClientId;

/// Outcome of releasing a connection: the name it held (if it ever claimed
/// one) and whether it was the last live connection under that name.
#[derive(Debug, PartialEq, Eq)]
pub struct Released {
    pub name: Option<String>,
    pub last_for_name: bool,
}

#[derive(Default)]
struct PresenceInner {
    // connection -> claimed name (None until join_chat)
    connections: HashMap<ClientId, Option<String>>,
    // name -> number of live connections holding it
    claims: HashMap<String, usize>,
}

/// Maps live connections to claimed display names and deduplicates join
/// notifications per name. All mutation goes through these operations; the
/// maps are never exposed.
pub struct PresenceTracker {
    inner: RwLock<PresenceInner>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(PresenceInner::default()),
        }
    }

    /// Register a live connection before any name claim. Unclaimed
    /// connections still count towards `count()`.
    pub async fn connect(&self, conn: ClientId) {
        self.inner.write().await.connections.insert(conn, None);
    }

    /// Associate `name` with the connection. Returns true iff this is the
    /// first live connection under `name` (only then should a join be
    /// broadcast). Re-claiming under a different name releases the old one.
    pub async fn claim(&self, conn: ClientId, name: &str) -> bool {
        let mut inner = self.inner.write().await;

        let prev = inner.connections.insert(conn, Some(name.to_string()));
        if let Some(Some(prev_name)) = prev {
            if prev_name == name {
                return false;
            }
            drop_claim(&mut inner, &prev_name);
        }

        let count = inner.claims.entry(name.to_string()).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Remove the connection on disconnect. Returns None if it was never
    /// registered.
    pub async fn release(&self, conn: ClientId) -> Option<Released> {
        let mut inner = self.inner.write().await;

        let name = inner.connections.remove(&conn)?;
        match name {
            None => Some(Released {
                name: None,
                last_for_name: false,
            }),
            Some(name) => {
                let last_for_name = drop_claim(&mut inner, &name);
                Some(Released {
                    name: Some(name),
                    last_for_name,
                })
            }
        }
    }

    /// Number of currently live connections (not unique names); this is
    /// what goes out as the online counter.
    pub async fn count(&self) -> usize {
        self.inner.read().await.connections.len()
    }
}

fn drop_claim(inner: &mut PresenceInner, name: &str) -> bool {
    if let Some(count) = inner.claims.get_mut(name) {
        *count -= 1;
        if *count == 0 {
            inner.claims.remove(name);
            return true;
        }
    }
    false
}
