use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::{
    room::service::RoomService,
    websockets::{
        connection_manager::ConnectionManager, context::ConnectionContext,
        messages::WebSocketMessage,
    },
};

use super::shared::MessageBroadcaster;

/// Transport-level lifecycle of a connection
pub struct ConnectionEventHandlers {
    room_service: Arc<RoomService>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl ConnectionEventHandlers {
    pub fn new(room_service: Arc<RoomService>, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self {
            room_service,
            connection_manager,
        }
    }

    /// Soft-disconnects the identity from every room this connection is bound to.
    ///
    /// Rooms where the identity has since been rebound to a newer connection are
    /// left untouched.
    #[instrument(skip_all, fields(player_uuid = %context.player_uuid, connection_id = %context.connection_id))]
    pub async fn handle_disconnect(&self, context: &ConnectionContext) {
        for room_id in context.bound_rooms().await {
            let mut room = match self.room_service.lock_room(&room_id).await {
                Ok(room) => room,
                Err(_) => {
                    debug!(room_id = %room_id, "Room already gone");
                    continue;
                }
            };

            let Some(outcome) = room.disconnect(&context.player_uuid, context.connection_id) else {
                debug!(room_id = %room_id, "Identity bound to a newer connection, skipping");
                continue;
            };
            info!(room_id = %room_id, "Player soft-disconnected");

            let Some(remaining) = outcome.remaining else {
                continue;
            };
            MessageBroadcaster::send_to_player(
                &self.connection_manager,
                &room,
                &remaining,
                &WebSocketMessage::opponent_soft_disconnected(&room_id, &context.player_uuid),
            )
            .await;
            if let Some(new_host) = outcome.new_host {
                MessageBroadcaster::send_to_player(
                    &self.connection_manager,
                    &room,
                    &remaining,
                    &WebSocketMessage::host_changed(&room_id, &new_host),
                )
                .await;
            }
        }
    }
}
