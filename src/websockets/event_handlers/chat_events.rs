use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    room::service::RoomService,
    websockets::{
        connection_manager::ConnectionManager,
        context::ConnectionContext,
        messages::{AckData, PostChatPayload, WebSocketMessage},
    },
};

use super::{shared::MessageBroadcaster, HandlerResult};

pub struct ChatEventHandlers {
    room_service: Arc<RoomService>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl ChatEventHandlers {
    pub fn new(room_service: Arc<RoomService>, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self {
            room_service,
            connection_manager,
        }
    }

    /// Appends to the room history and relays to everyone, sender included
    #[instrument(skip_all, fields(player_uuid = %context.player_uuid, room_id = %payload.room_id))]
    pub async fn handle_post_chat(
        &self,
        context: &ConnectionContext,
        payload: PostChatPayload,
    ) -> HandlerResult {
        let mut room = self.room_service.lock_room(&payload.room_id).await?;
        let message = room.post_message(&context.player_uuid, &payload.text)?;
        debug!(history_len = room.messages().len(), "Chat message stored");

        let sent_at = message.sent_at;
        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            &room,
            &WebSocketMessage::chat_message(room.id(), message),
        )
        .await;

        Ok(AckData::new().with("sent_at", sent_at))
    }
}
