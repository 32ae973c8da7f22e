use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    room::{
        models::{NewGameProposal, ProposalResponse, Room},
        service::RoomService,
    },
    websockets::{
        connection_manager::ConnectionManager,
        context::ConnectionContext,
        messages::{
            AckData, MakeMovePayload, RespondNewGamePayload, RespondSwitchRolesPayload,
            RoomPayload, WebSocketMessage,
        },
    },
};

use super::{shared::MessageBroadcaster, HandlerResult};

/// Moves and the new-game / switch-roles negotiations
pub struct GameEventHandlers {
    room_service: Arc<RoomService>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl GameEventHandlers {
    pub fn new(room_service: Arc<RoomService>, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self {
            room_service,
            connection_manager,
        }
    }

    #[instrument(skip_all, fields(player_uuid = %context.player_uuid, room_id = %payload.room_id))]
    pub async fn handle_make_move(
        &self,
        context: &ConnectionContext,
        payload: MakeMovePayload,
    ) -> HandlerResult {
        let mut room = self.room_service.lock_room(&payload.room_id).await?;
        let outcome = room.make_move(&context.player_uuid, payload.row, payload.col, payload.role)?;

        let message = match &outcome.win {
            Some(win) => {
                info!(winner = %win.role, "Game won");
                WebSocketMessage::game_over(
                    room.id(),
                    outcome.coord,
                    win.role,
                    outcome.turn_number,
                    &context.player_uuid,
                    win.line.clone(),
                    room.scores().clone(),
                )
            }
            None => WebSocketMessage::move_made(
                room.id(),
                outcome.coord,
                outcome.role,
                outcome.turn_number,
            ),
        };
        MessageBroadcaster::broadcast_to_room(&self.connection_manager, &room, &message).await;

        Ok(AckData::new()
            .with("turn_number", outcome.turn_number)
            .with("game_over", outcome.win.is_some()))
    }

    async fn broadcast_new_game_started(&self, room: &Room) {
        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            room,
            &WebSocketMessage::new_game_started(room.id(), room.turn_number()),
        )
        .await;
    }

    #[instrument(skip_all, fields(player_uuid = %context.player_uuid, room_id = %payload.room_id))]
    pub async fn handle_propose_new_game(
        &self,
        context: &ConnectionContext,
        payload: RoomPayload,
    ) -> HandlerResult {
        let mut room = self.room_service.lock_room(&payload.room_id).await?;

        match room.propose_new_game(&context.player_uuid)? {
            NewGameProposal::ResetImmediately => {
                info!("Opponent absent, new game started without handshake");
                self.broadcast_new_game_started(&room).await;
                Ok(AckData::new().with("opponent_gone", true))
            }
            NewGameProposal::Pending {
                opponent_connection,
                ..
            } => {
                MessageBroadcaster::send_to_connection(
                    &self.connection_manager,
                    opponent_connection,
                    &WebSocketMessage::new_game_request(room.id(), &context.player_uuid),
                )
                .await;
                Ok(AckData::new().with("opponent_gone", false))
            }
        }
    }

    #[instrument(skip_all, fields(player_uuid = %context.player_uuid, room_id = %payload.room_id))]
    pub async fn handle_respond_new_game(
        &self,
        context: &ConnectionContext,
        payload: RespondNewGamePayload,
    ) -> HandlerResult {
        let mut room = self.room_service.lock_room(&payload.room_id).await?;

        match room.respond_new_game(&context.player_uuid, payload.accept)? {
            ProposalResponse::Accepted { .. } => {
                self.broadcast_new_game_started(&room).await;
            }
            ProposalResponse::Declined { proposer } => {
                MessageBroadcaster::send_to_player(
                    &self.connection_manager,
                    &room,
                    &proposer,
                    &WebSocketMessage::new_game_declined(room.id(), &context.player_uuid),
                )
                .await;
            }
        }

        Ok(AckData::new().with("accept", payload.accept))
    }

    #[instrument(skip_all, fields(player_uuid = %context.player_uuid, room_id = %payload.room_id))]
    pub async fn handle_propose_switch_roles(
        &self,
        context: &ConnectionContext,
        payload: RoomPayload,
    ) -> HandlerResult {
        let mut room = self.room_service.lock_room(&payload.room_id).await?;
        let proposal = room.propose_switch_roles(&context.player_uuid)?;

        MessageBroadcaster::send_to_connection(
            &self.connection_manager,
            proposal.opponent_connection,
            &WebSocketMessage::switch_roles_request(room.id(), &context.player_uuid),
        )
        .await;

        Ok(AckData::new())
    }

    #[instrument(skip_all, fields(player_uuid = %context.player_uuid, room_id = %payload.room_id))]
    pub async fn handle_respond_switch_roles(
        &self,
        context: &ConnectionContext,
        payload: RespondSwitchRolesPayload,
    ) -> HandlerResult {
        let mut room = self.room_service.lock_room(&payload.room_id).await?;

        match room.respond_switch_roles(&context.player_uuid, payload.accepted)? {
            ProposalResponse::Accepted { .. } => {
                let role_map = room.role_map().clone();
                for (player_uuid, role) in room.players() {
                    MessageBroadcaster::send_to_player(
                        &self.connection_manager,
                        &room,
                        player_uuid,
                        &WebSocketMessage::switch_roles_accepted(room.id(), *role, role_map.clone()),
                    )
                    .await;
                }
                info!("Roles switched");
            }
            ProposalResponse::Declined { proposer } => {
                MessageBroadcaster::send_to_player(
                    &self.connection_manager,
                    &room,
                    &proposer,
                    &WebSocketMessage::switch_roles_declined(room.id(), &context.player_uuid),
                )
                .await;
            }
        }

        Ok(AckData::new()
            .with("accepted", payload.accepted)
            .with("role", room.role_of(&context.player_uuid)))
    }
}
