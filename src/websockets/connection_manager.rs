use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use crate::room::ConnectionId;

/// Outbound delivery to live connections. Sends are fire-and-forget: a message
/// for a connection that is gone is dropped.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, connection_id: ConnectionId, sender: mpsc::UnboundedSender<String>);

    async fn remove_connection(&self, connection_id: ConnectionId);

    async fn send_to_connection(&self, connection_id: ConnectionId, message: &str);

    async fn send_to_connections(&self, connection_ids: &[ConnectionId], message: &str);
}

pub struct InMemoryConnectionManager {
    connections: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<String>>>>,
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, connection_id: ConnectionId, sender: mpsc::UnboundedSender<String>) {
        self.connections.write().await.insert(connection_id, sender);
    }

    async fn remove_connection(&self, connection_id: ConnectionId) {
        self.connections.write().await.remove(&connection_id);
    }

    async fn send_to_connection(&self, connection_id: ConnectionId, message: &str) {
        let connections = self.connections.read().await;
        match connections.get(&connection_id) {
            Some(sender) => {
                let _ = sender.send(message.to_string());
            }
            None => debug!(connection_id = %connection_id, "Dropping message for unknown connection"),
        }
    }

    async fn send_to_connections(&self, connection_ids: &[ConnectionId], message: &str) {
        let connections = self.connections.read().await;
        for connection_id in connection_ids {
            if let Some(sender) = connections.get(connection_id) {
                let _ = sender.send(message.to_string());
            }
        }
    }
}
