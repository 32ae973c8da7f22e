use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::room::{RoomError, RoomService};
use crate::shared::{AppError, AppState};
use crate::websockets::{
    connection_manager::ConnectionManager,
    context::ConnectionContext,
    event_handlers::{
        shared::MessageBroadcaster, ChatEventHandlers, ConnectionEventHandlers,
        GameEventHandlers, HandlerResult, RoomEventHandlers,
    },
    messages::{ClientMessage, MessageType, WebSocketMessage},
};

use super::socket::{Connection, MessageHandler};

/// Parses client requests, routes them to the event handlers and acknowledges
/// every request to its sender
pub struct WebsocketReceiveHandler {
    connection_manager: Arc<dyn ConnectionManager>,
    room_events: RoomEventHandlers,
    game_events: GameEventHandlers,
    chat_events: ChatEventHandlers,
    connection_events: ConnectionEventHandlers,
}

impl WebsocketReceiveHandler {
    pub fn new(room_service: Arc<RoomService>, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self {
            room_events: RoomEventHandlers::new(room_service.clone(), connection_manager.clone()),
            game_events: GameEventHandlers::new(room_service.clone(), connection_manager.clone()),
            chat_events: ChatEventHandlers::new(room_service.clone(), connection_manager.clone()),
            connection_events: ConnectionEventHandlers::new(room_service, connection_manager.clone()),
            connection_manager,
        }
    }

    /// Called once the transport for `context` has closed
    pub async fn handle_disconnect(&self, context: &ConnectionContext) {
        self.connection_events.handle_disconnect(context).await;
    }

    async fn dispatch(&self, context: &ConnectionContext, request: &ClientMessage) -> HandlerResult {
        match request.message_type {
            MessageType::CreateRoom => self.room_events.handle_create_room(context).await,
            MessageType::JoinRoom => {
                self.room_events
                    .handle_join_room(context, request.parse_payload()?)
                    .await
            }
            MessageType::SetName => {
                self.room_events
                    .handle_set_name(context, request.parse_payload()?)
                    .await
            }
            MessageType::LeaveRoom => {
                self.room_events
                    .handle_leave_room(context, request.parse_payload()?)
                    .await
            }
            MessageType::KickPlayer => {
                self.room_events
                    .handle_kick_player(context, request.parse_payload()?)
                    .await
            }
            MessageType::MakeMove => {
                self.game_events
                    .handle_make_move(context, request.parse_payload()?)
                    .await
            }
            MessageType::ProposeNewGame => {
                self.game_events
                    .handle_propose_new_game(context, request.parse_payload()?)
                    .await
            }
            MessageType::RespondNewGame => {
                self.game_events
                    .handle_respond_new_game(context, request.parse_payload()?)
                    .await
            }
            MessageType::ProposeSwitchRoles => {
                self.game_events
                    .handle_propose_switch_roles(context, request.parse_payload()?)
                    .await
            }
            MessageType::RespondSwitchRoles => {
                self.game_events
                    .handle_respond_switch_roles(context, request.parse_payload()?)
                    .await
            }
            MessageType::PostChat => {
                self.chat_events
                    .handle_post_chat(context, request.parse_payload()?)
                    .await
            }
            other => Err(RoomError::InvalidRequest(format!(
                "{:?} is not a client request",
                other
            ))),
        }
    }

    async fn send_ack(&self, context: &ConnectionContext, ack: WebSocketMessage) {
        MessageBroadcaster::send_to_connection(&self.connection_manager, context.connection_id, &ack)
            .await;
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, context: &ConnectionContext, message: String) {
        let request = match serde_json::from_str::<ClientMessage>(&message) {
            Ok(request) => request,
            Err(e) => {
                warn!(
                    player_uuid = %context.player_uuid,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                let error = RoomError::InvalidRequest(e.to_string());
                self.send_ack(context, WebSocketMessage::ack_failure(None, &error))
                    .await;
                return;
            }
        };

        debug!(
            player_uuid = %context.player_uuid,
            message_type = ?request.message_type,
            "Received request"
        );

        let ack = match self.dispatch(context, &request).await {
            Ok(data) => WebSocketMessage::ack_success(request.request_id, data),
            Err(error) => {
                debug!(
                    player_uuid = %context.player_uuid,
                    message_type = ?request.message_type,
                    error = %error,
                    "Request rejected"
                );
                WebSocketMessage::ack_failure(request.request_id, &error)
            }
        };
        self.send_ack(context, ack).await;
    }
}

/// WebSocket endpoint that handles authentication via Sec-WebSocket-Protocol header
/// GET /ws with JWT token in Sec-WebSocket-Protocol header
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    let jwt_token = headers
        .get("sec-websocket-protocol")
        .and_then(|h| h.to_str().ok())
        .map(|value| value.split(',').next().unwrap_or_default().trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            warn!("Missing or invalid Sec-WebSocket-Protocol header");
            AppError::Unauthorized("Missing authentication token".to_string())
        })?;

    let claims = app_state.session_service.validate_session(&jwt_token).await?;
    let context = Arc::new(ConnectionContext::new(claims.session_id, claims.username));

    info!(
        player_uuid = %context.player_uuid,
        connection_id = %context.connection_id,
        "WebSocket authentication successful"
    );

    Ok(ws
        .protocols([jwt_token])
        .on_upgrade(move |socket| handle_websocket_connection(socket, context, app_state)))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(
    socket: axum::extract::ws::WebSocket,
    context: Arc<ConnectionContext>,
    app_state: AppState,
) {
    info!(
        player_uuid = %context.player_uuid,
        connection_id = %context.connection_id,
        "WebSocket connection established"
    );

    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    app_state
        .connection_manager
        .add_connection(context.connection_id, outbound_sender)
        .await;

    let message_handler = Arc::new(WebsocketReceiveHandler::new(
        app_state.room_service.clone(),
        app_state.connection_manager.clone(),
    ));

    let connection = Connection::new(
        context.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler.clone(),
    );

    match connection.run().await {
        Ok(()) => info!(connection_id = %context.connection_id, "WebSocket connection closed cleanly"),
        Err(e) => warn!(connection_id = %context.connection_id, error = %e, "WebSocket connection error"),
    }

    app_state
        .connection_manager
        .remove_connection(context.connection_id)
        .await;
    message_handler.handle_disconnect(&context).await;
}
