#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use gomoku_server::websockets::ConnectionManager;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Records every frame per connection instead of writing to a socket
#[derive(Clone, Default)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<Uuid, VecDeque<String>>>>,
    connected: Arc<RwLock<HashSet<Uuid>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_connected(&self, connection_id: Uuid) -> bool {
        self.connected.read().await.contains(&connection_id)
    }

    pub async fn get_messages_for(&self, connection_id: Uuid) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(&connection_id)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Pops the oldest undelivered frame for the connection
    pub async fn consume_message_for(&self, connection_id: Uuid) -> Option<String> {
        self.sent_messages
            .write()
            .await
            .get_mut(&connection_id)
            .and_then(VecDeque::pop_front)
    }

    /// Pops the newest frame for the connection
    pub async fn consume_last_message_for(&self, connection_id: Uuid) -> Option<String> {
        self.sent_messages
            .write()
            .await
            .get_mut(&connection_id)
            .and_then(VecDeque::pop_back)
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(&self, connection_id: Uuid, _sender: mpsc::UnboundedSender<String>) {
        self.connected.write().await.insert(connection_id);
    }

    async fn remove_connection(&self, connection_id: Uuid) {
        self.connected.write().await.remove(&connection_id);
    }

    async fn send_to_connection(&self, connection_id: Uuid, message: &str) {
        self.sent_messages
            .write()
            .await
            .entry(connection_id)
            .or_default()
            .push_back(message.to_string());
    }

    async fn send_to_connections(&self, connection_ids: &[Uuid], message: &str) {
        for connection_id in connection_ids {
            self.send_to_connection(*connection_id, message).await;
        }
    }
}
