use std::sync::Arc;
use tracing::warn;

use crate::{
    room::{ConnectionId, Room},
    websockets::{connection_manager::ConnectionManager, messages::WebSocketMessage},
};

pub struct MessageBroadcaster;

impl MessageBroadcaster {
    fn serialize(message: &WebSocketMessage) -> Option<String> {
        serde_json::to_string(message)
            .map_err(|e| {
                warn!(message_type = ?message.message_type, error = %e, "Failed to serialize message");
            })
            .ok()
    }

    pub async fn send_to_connection(
        connection_manager: &Arc<dyn ConnectionManager>,
        connection_id: ConnectionId,
        message: &WebSocketMessage,
    ) {
        if let Some(message_json) = Self::serialize(message) {
            connection_manager
                .send_to_connection(connection_id, &message_json)
                .await;
        }
    }

    /// Sends to the identity's live connection, if it has one
    pub async fn send_to_player(
        connection_manager: &Arc<dyn ConnectionManager>,
        room: &Room,
        player_uuid: &str,
        message: &WebSocketMessage,
    ) {
        if let Some(connection_id) = room.connection_of(player_uuid) {
            Self::send_to_connection(connection_manager, connection_id, message).await;
        }
    }

    /// Sends to every connection bound to the room
    pub async fn broadcast_to_room(
        connection_manager: &Arc<dyn ConnectionManager>,
        room: &Room,
        message: &WebSocketMessage,
    ) {
        if let Some(message_json) = Self::serialize(message) {
            connection_manager
                .send_to_connections(&room.connections(), &message_json)
                .await;
        }
    }

    /// Sends to every connection bound to the room except `excluded`
    pub async fn broadcast_to_others(
        connection_manager: &Arc<dyn ConnectionManager>,
        room: &Room,
        excluded: ConnectionId,
        message: &WebSocketMessage,
    ) {
        let recipients: Vec<ConnectionId> = room
            .connections()
            .into_iter()
            .filter(|connection_id| *connection_id != excluded)
            .collect();

        if let Some(message_json) = Self::serialize(message) {
            connection_manager
                .send_to_connections(&recipients, &message_json)
                .await;
        }
    }
}
