//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use gomoku_server::websockets::{AckPayload, MessageType, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    players: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for every connected player in the setup
    pub fn for_all_players(setup: &'a TestSetup) -> Self {
        let players = setup.players.keys().map(String::as_str).collect();
        Self { setup, players }
    }

    /// Create an assertion for specific players
    pub fn for_players(setup: &'a TestSetup, players: Vec<&'a str>) -> Self {
        Self { setup, players }
    }

    /// Assert that players received a specific message type next (consumes the message from queue)
    pub async fn received_message_type(self, expected_type: MessageType) -> MessageContent {
        let mut messages = vec![];

        for player in &self.players {
            let connection_id = self.setup.context(player).connection_id;
            let message = self
                .setup
                .mock_conn_manager
                .consume_message_for(connection_id)
                .await
                .unwrap_or_else(|| panic!("{} should have received a message", player));

            let msg: WebSocketMessage = serde_json::from_str(&message).unwrap();
            assert_eq!(
                msg.message_type, expected_type,
                "{} received wrong message type",
                player
            );
            messages.push(msg);
        }

        // Per-player payloads like switch-roles-accepted differ by recipient, so
        // only broadcast types are compared
        if messages.len() > 1 && expected_type != MessageType::SwitchRolesAccepted {
            let first_payload = &messages[0].payload;
            for (i, msg) in messages.iter().enumerate().skip(1) {
                assert_eq!(
                    &msg.payload, first_payload,
                    "Player {} payload differs from player {}",
                    self.players[i], self.players[0]
                );
            }
        }

        MessageContent {
            payload: messages[0].payload.clone(),
        }
    }

    /// Assert that players have no undelivered messages
    pub async fn received_no_messages(self) {
        for player in &self.players {
            let connection_id = self.setup.context(player).connection_id;
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(connection_id)
                .await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                player,
                messages
            );
        }
    }

    /// Assert that players received a sequence of message types in order (consumes them)
    pub async fn received_message_sequence(
        self,
        expected_types: Vec<MessageType>,
    ) -> Vec<MessageContent> {
        let mut result_messages = vec![];

        for player in &self.players {
            let frames = self.setup.drain(player).await;
            let actual: Vec<MessageType> = frames.iter().map(|f| f.message_type).collect();
            assert_eq!(actual, expected_types, "{} received wrong sequence", player);

            // Only collect messages from the first player to avoid duplicates
            if player == &self.players[0] {
                result_messages = frames
                    .into_iter()
                    .map(|msg| MessageContent {
                        payload: msg.payload,
                    })
                    .collect();
            }
        }

        result_messages
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    payload: Value,
}

impl MessageContent {
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Assert a top-level payload field equals the expected JSON value
    pub fn with_field(self, key: &str, expected: impl Into<Value>) -> Self {
        assert_eq!(self.payload[key], expected.into(), "field {}", key);
        self
    }

    pub fn with_room(self, room_id: &str) -> Self {
        self.with_field("room_id", room_id)
    }

    pub fn with_player(self, player_uuid: &str) -> Self {
        self.with_field("player_uuid", player_uuid)
    }
}

// ============================================================================
// Ack Assertions
// ============================================================================

pub struct AckAssertion {
    ack: AckPayload,
}

impl AckAssertion {
    pub fn of(ack: AckPayload) -> Self {
        Self { ack }
    }

    pub fn succeeded(self) -> Self {
        assert!(
            self.ack.success,
            "expected success, got {:?}: {:?}",
            self.ack.error, self.ack.message
        );
        assert!(self.ack.error.is_none());
        self
    }

    pub fn failed_with(self, code: &str) -> Self {
        assert!(!self.ack.success, "expected failure {}", code);
        assert_eq!(self.ack.error.as_deref(), Some(code));
        assert!(self.ack.message.is_some());
        self
    }

    pub fn with_field(self, key: &str, expected: impl Into<Value>) -> Self {
        assert_eq!(
            self.ack.data.get(key).cloned().unwrap_or(Value::Null),
            expected.into(),
            "ack field {}",
            key
        );
        self
    }

    pub fn with_request_id(self, expected: impl Into<Value>) -> Self {
        assert_eq!(self.ack.request_id, Some(expected.into()));
        self
    }
}
