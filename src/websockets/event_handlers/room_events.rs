use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::{
    room::{models::Room, service::RoomService},
    websockets::{
        connection_manager::ConnectionManager,
        context::ConnectionContext,
        messages::{AckData, RoomPayload, SetNamePayload, WebSocketMessage},
    },
};

use super::{shared::MessageBroadcaster, HandlerResult};

/// Room membership: create, join, rename, leave, kick
pub struct RoomEventHandlers {
    room_service: Arc<RoomService>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl RoomEventHandlers {
    pub fn new(room_service: Arc<RoomService>, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self {
            room_service,
            connection_manager,
        }
    }

    async fn broadcast_sync_state(&self, room: &Room) {
        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            room,
            &WebSocketMessage::sync_state(room.snapshot()),
        )
        .await;
    }

    #[instrument(skip_all, fields(player_uuid = %context.player_uuid))]
    pub async fn handle_create_room(&self, context: &ConnectionContext) -> HandlerResult {
        let handle = self
            .room_service
            .create_room(&context.player_uuid, context.connection_id, &context.username)
            .await?;
        let room = handle.lock().await;
        context.bind_room(room.id()).await;

        self.broadcast_sync_state(&room).await;

        Ok(AckData::new()
            .with("room_id", room.id())
            .with("role", room.role_of(&context.player_uuid)))
    }

    #[instrument(skip_all, fields(player_uuid = %context.player_uuid, room_id = %payload.room_id))]
    pub async fn handle_join_room(
        &self,
        context: &ConnectionContext,
        payload: RoomPayload,
    ) -> HandlerResult {
        let mut room = self.room_service.lock_room(&payload.room_id).await?;
        let outcome = room.join(&context.player_uuid, context.connection_id, &context.username)?;
        context.bind_room(room.id()).await;

        info!(role = %outcome.role, reconnected = outcome.reconnected, "Player joined room");

        let name = room
            .name_of(&context.player_uuid)
            .unwrap_or(context.username.as_str());
        let joined = WebSocketMessage::player_joined(
            room.id(),
            &context.player_uuid,
            name,
            outcome.role,
            outcome.reconnected,
        );
        MessageBroadcaster::broadcast_to_others(
            &self.connection_manager,
            &room,
            context.connection_id,
            &joined,
        )
        .await;
        self.broadcast_sync_state(&room).await;

        Ok(AckData::new()
            .with("room_id", room.id())
            .with("role", outcome.role)
            .with("reconnected", outcome.reconnected))
    }

    #[instrument(skip_all, fields(player_uuid = %context.player_uuid, room_id = %payload.room_id))]
    pub async fn handle_set_name(
        &self,
        context: &ConnectionContext,
        payload: SetNamePayload,
    ) -> HandlerResult {
        let mut room = self.room_service.lock_room(&payload.room_id).await?;
        room.set_name(&context.player_uuid, &payload.name)?;

        self.broadcast_sync_state(&room).await;

        Ok(AckData::new().with("name", room.name_of(&context.player_uuid)))
    }

    #[instrument(skip_all, fields(player_uuid = %context.player_uuid, room_id = %payload.room_id))]
    pub async fn handle_leave_room(
        &self,
        context: &ConnectionContext,
        payload: RoomPayload,
    ) -> HandlerResult {
        let mut room = self.room_service.lock_room(&payload.room_id).await?;
        let outcome = room.leave(&context.player_uuid)?;
        context.unbind_room(room.id()).await;

        MessageBroadcaster::send_to_connection(
            &self.connection_manager,
            context.connection_id,
            &WebSocketMessage::room_left_confirmation(room.id()),
        )
        .await;

        if let Some(remaining) = &outcome.remaining {
            if let Some(new_host) = &outcome.new_host {
                MessageBroadcaster::send_to_player(
                    &self.connection_manager,
                    &room,
                    remaining,
                    &WebSocketMessage::host_changed(room.id(), new_host),
                )
                .await;
            }
            MessageBroadcaster::send_to_player(
                &self.connection_manager,
                &room,
                remaining,
                &WebSocketMessage::opponent_left_permanently(room.id(), &context.player_uuid),
            )
            .await;
            self.broadcast_sync_state(&room).await;
        }

        if outcome.room_empty {
            self.room_service.remove_if_empty(&mut room).await;
        }

        info!(room_empty = outcome.room_empty, "Player left room");
        Ok(AckData::new().with("room_id", payload.room_id))
    }

    #[instrument(skip_all, fields(player_uuid = %context.player_uuid, room_id = %payload.room_id))]
    pub async fn handle_kick_player(
        &self,
        context: &ConnectionContext,
        payload: RoomPayload,
    ) -> HandlerResult {
        let mut room = self.room_service.lock_room(&payload.room_id).await?;
        let outcome = room.kick(&context.player_uuid)?;

        match outcome.kicked_connection {
            Some(connection_id) => {
                MessageBroadcaster::send_to_connection(
                    &self.connection_manager,
                    connection_id,
                    &WebSocketMessage::kicked(room.id()),
                )
                .await;
            }
            None => debug!(kicked = %outcome.kicked, "Kicked player had no live connection"),
        }
        self.broadcast_sync_state(&room).await;

        info!(kicked = %outcome.kicked, "Player kicked from room");
        Ok(AckData::new().with("kicked", outcome.kicked))
    }
}
