use std::collections::HashSet;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::room::ConnectionId;

/// Per-connection identity, resolved once when the socket is upgraded
#[derive(Debug)]
pub struct ConnectionContext {
    pub connection_id: ConnectionId,
    /// Persistent player identity from the session token
    pub player_uuid: String,
    /// Generated session username, used as the default display name
    pub username: String,
    rooms: Mutex<HashSet<String>>,
}

impl ConnectionContext {
    pub fn new(player_uuid: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            player_uuid: player_uuid.into(),
            username: username.into(),
            rooms: Mutex::new(HashSet::new()),
        }
    }

    pub async fn bind_room(&self, room_id: &str) {
        self.rooms.lock().await.insert(room_id.to_string());
    }

    pub async fn unbind_room(&self, room_id: &str) {
        self.rooms.lock().await.remove(room_id);
    }

    /// Rooms this connection has created or joined and not left
    pub async fn bound_rooms(&self) -> Vec<String> {
        self.rooms.lock().await.iter().cloned().collect()
    }
}
