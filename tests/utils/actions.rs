#![allow(dead_code)]

use serde_json::{json, Value};

use gomoku_server::{
    game::Role,
    websockets::{
        AckPayload, ClientMessage, ConnectionManager, MessageHandler, MessageType,
        WebSocketMessage,
    },
};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a client frame on the player's current connection
    pub async fn send_message(&self, alias: &str, message: ClientMessage) {
        let message_json = serde_json::to_string(&message).unwrap();
        self.send_raw(alias, &message_json).await;
    }

    pub async fn send_raw(&self, alias: &str, text: &str) {
        let context = self.context(alias).clone();
        self.input_handler
            .handle_message(&context, text.to_string())
            .await;
    }

    /// Send a request and take its ack, which is always the newest frame for the sender
    pub async fn request(&self, alias: &str, message_type: MessageType, payload: Value) -> AckPayload {
        self.send_message(alias, ClientMessage::new(message_type, payload))
            .await;
        self.take_ack(alias).await
    }

    pub async fn take_ack(&self, alias: &str) -> AckPayload {
        let frame = self
            .mock_conn_manager
            .consume_last_message_for(self.context(alias).connection_id)
            .await
            .unwrap_or_else(|| panic!("{} should have received an ack", alias));
        let message: WebSocketMessage = serde_json::from_str(&frame).unwrap();
        assert_eq!(message.message_type, MessageType::Ack, "{} expected an ack", alias);
        serde_json::from_value(message.payload).unwrap()
    }

    /// All frames received by the player so far, oldest first. Clears their queue.
    pub async fn drain(&self, alias: &str) -> Vec<WebSocketMessage> {
        let connection_id = self.context(alias).connection_id;
        let mut frames = vec![];
        while let Some(frame) = self.mock_conn_manager.consume_message_for(connection_id).await {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    /// Clear all recorded messages
    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    /// Close the player's current transport the way the socket task does
    pub async fn disconnect(&self, alias: &str) {
        let context = self.context(alias).clone();
        self.mock_conn_manager
            .remove_connection(context.connection_id)
            .await;
        self.input_handler.handle_disconnect(&context).await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Create a room as `alias` and return its id
    pub async fn create_room(&self, alias: &str) -> String {
        let ack = self.request(alias, MessageType::CreateRoom, json!({})).await;
        assert!(ack.success, "create-room failed: {:?}", ack.message);
        ack.data["room_id"].as_str().unwrap().to_string()
    }

    pub async fn join_room(&self, alias: &str, room_id: &str) -> AckPayload {
        self.request(alias, MessageType::JoinRoom, json!({ "room_id": room_id }))
            .await
    }

    /// Host creates a room and the second player joins it. Queues are cleared.
    pub async fn start_two_player_room(&self, host: &str, guest: &str) -> String {
        let room_id = self.create_room(host).await;
        let ack = self.join_room(guest, &room_id).await;
        assert!(ack.success, "join-room failed: {:?}", ack.message);
        self.clear_messages().await;
        room_id
    }

    pub async fn make_move(
        &self,
        alias: &str,
        room_id: &str,
        row: i64,
        col: i64,
        role: Role,
    ) -> AckPayload {
        self.request(
            alias,
            MessageType::MakeMove,
            json!({ "room_id": room_id, "row": row, "col": col, "role": role }),
        )
        .await
    }

    pub async fn leave_room(&self, alias: &str, room_id: &str) -> AckPayload {
        self.request(alias, MessageType::LeaveRoom, json!({ "room_id": room_id }))
            .await
    }

    pub async fn kick_player(&self, alias: &str, room_id: &str) -> AckPayload {
        self.request(alias, MessageType::KickPlayer, json!({ "room_id": room_id }))
            .await
    }

    pub async fn post_chat(&self, alias: &str, room_id: &str, text: &str) -> AckPayload {
        self.request(
            alias,
            MessageType::PostChat,
            json!({ "room_id": room_id, "text": text }),
        )
        .await
    }

    pub async fn propose_new_game(&self, alias: &str, room_id: &str) -> AckPayload {
        self.request(alias, MessageType::ProposeNewGame, json!({ "room_id": room_id }))
            .await
    }

    pub async fn respond_new_game(&self, alias: &str, room_id: &str, accept: bool) -> AckPayload {
        self.request(
            alias,
            MessageType::RespondNewGame,
            json!({ "room_id": room_id, "accept": accept }),
        )
        .await
    }

    pub async fn propose_switch_roles(&self, alias: &str, room_id: &str) -> AckPayload {
        self.request(
            alias,
            MessageType::ProposeSwitchRoles,
            json!({ "room_id": room_id }),
        )
        .await
    }

    pub async fn respond_switch_roles(
        &self,
        alias: &str,
        room_id: &str,
        accepted: bool,
    ) -> AckPayload {
        self.request(
            alias,
            MessageType::RespondSwitchRoles,
            json!({ "room_id": room_id, "accepted": accepted }),
        )
        .await
    }
}
