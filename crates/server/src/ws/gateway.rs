use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use crate::ws::events::ServerEvent;

pub type ClientId = u64;

pub struct ConnectedClient {
    pub tx: mpsc::UnboundedSender<String>,
}

/// Fan-out registry of live connections. Events are serialized once and
/// pushed to every client's outbound channel; nothing is persisted, retried,
/// or acknowledged. A client that is disconnected at publish time permanently
/// misses that push.
pub struct GatewayState {
    next_id: RwLock<u64>,
    pub clients: RwLock<HashMap<ClientId, ConnectedClient>>,
}

impl GatewayState {
    pub fn new() -> Self {
        Self {
            next_id: RwLock::new(1),
            clients: RwLock::new(HashMap::new()),
        }
    }

    pub async fn next_client_id(&self) -> ClientId {
        let mut id = self.next_id.write().await;
        let current = *id;
        *id += 1;
        current
    }

    /// Register a new client connection
    pub async fn register(&self, client_id: ClientId, tx: mpsc::UnboundedSender<String>) {
        self.clients
            .write()
            .await
            .insert(client_id, ConnectedClient { tx });
    }

    /// Unregister a client
    pub async fn unregister(&self, client_id: ClientId) -> Option<ConnectedClient> {
        self.clients.write().await.remove(&client_id)
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Broadcast event to ALL connected clients
    pub async fn broadcast_all(&self, event: &ServerEvent, exclude: Option<ClientId>) {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(_) => return,
        };

        let clients = self.clients.read().await;
        for (&cid, client) in clients.iter() {
            if Some(cid) == exclude {
                continue;
            }
            let _ = client.tx.send(msg.clone());
        }
    }

    /// Send event to a specific client
    pub async fn send_to(&self, client_id: ClientId, event: &ServerEvent) {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(_) => return,
        };

        let clients = self.clients.read().await;
        if let Some(client) = clients.get(&client_id) {
            let _ = client.tx.send(msg);
        }
    }
}
