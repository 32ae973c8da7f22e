use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::game::{Coord, Role};
use crate::room::{models::ChatMessage, RoomError, RoomSnapshot};

/// Message types for WebSocket communication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    // Client -> Server
    CreateRoom,
    SetName,
    JoinRoom,
    MakeMove,
    ProposeNewGame,
    RespondNewGame,
    ProposeSwitchRoles,
    RespondSwitchRoles,
    KickPlayer,
    LeaveRoom,
    PostChat,

    // Server -> Client
    SyncState,
    PlayerJoined,
    OpponentSoftDisconnected,
    HostChanged,
    MoveMade,
    GameOver,
    NewGameRequest,
    NewGameStarted,
    NewGameDeclined,
    SwitchRolesRequest,
    SwitchRolesAccepted,
    SwitchRolesDeclined,
    OpponentLeftPermanently,
    RoomLeftConfirmation,
    ChatMessage,
    Kicked,
    Ack,
}

/// Request frame sent by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: Value,
    /// Opaque correlation id echoed back in the ack
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Value>,
}

impl ClientMessage {
    pub fn new(message_type: MessageType, payload: Value) -> Self {
        Self {
            message_type,
            payload,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<Value>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Deserializes the payload into the shape expected for this request type
    pub fn parse_payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, RoomError> {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| RoomError::InvalidRequest(e.to_string()))
    }
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Event frame sent by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub payload: Value,
    pub meta: Option<WebSocketMessageMeta>,
}

// ---------------------------------------------------------------------------
// Client-to-Server message payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomPayload {
    pub room_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetNamePayload {
    pub room_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakeMovePayload {
    pub room_id: String,
    pub row: i64,
    pub col: i64,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondNewGamePayload {
    pub room_id: String,
    pub accept: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondSwitchRolesPayload {
    pub room_id: String,
    pub accepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostChatPayload {
    pub room_id: String,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Server-to-Client message payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerJoinedPayload {
    pub room_id: String,
    pub player_uuid: String,
    pub name: String,
    pub role: Role,
    pub reconnected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPayload {
    pub room_id: String,
    pub player_uuid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostChangedPayload {
    pub room_id: String,
    pub host_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveMadePayload {
    pub room_id: String,
    pub row: usize,
    pub col: usize,
    pub role: Role,
    /// Turn number after the move
    pub turn_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameOverPayload {
    pub room_id: String,
    pub row: usize,
    pub col: usize,
    /// Role that played the winning mark
    pub role: Role,
    /// Turn number after the winning move
    pub turn_number: u32,
    pub winner: Role,
    pub winner_id: String,
    pub line: Vec<Coord>,
    pub scores: HashMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGameStartedPayload {
    pub room_id: String,
    pub turn_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchRolesAcceptedPayload {
    pub room_id: String,
    pub new_role: Role,
    pub role_map: BTreeMap<Role, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessagePayload {
    pub room_id: String,
    #[serde(flatten)]
    pub message: ChatMessage,
}

/// Request acknowledgment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckPayload {
    pub request_id: Option<Value>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// Extra fields attached to a successful ack
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AckData(Map<String, Value>);

impl AckData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        self.0
            .insert(key.to_string(), serde_json::to_value(value).unwrap_or_default());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    fn from_payload(message_type: MessageType, payload: impl Serialize) -> Self {
        Self::new(message_type, serde_json::to_value(payload).unwrap_or_default())
    }

    pub fn sync_state(snapshot: RoomSnapshot) -> Self {
        Self::from_payload(MessageType::SyncState, snapshot)
    }

    pub fn player_joined(
        room_id: &str,
        player_uuid: &str,
        name: &str,
        role: Role,
        reconnected: bool,
    ) -> Self {
        Self::from_payload(
            MessageType::PlayerJoined,
            PlayerJoinedPayload {
                room_id: room_id.to_string(),
                player_uuid: player_uuid.to_string(),
                name: name.to_string(),
                role,
                reconnected,
            },
        )
    }

    pub fn opponent_soft_disconnected(room_id: &str, player_uuid: &str) -> Self {
        Self::player_event(MessageType::OpponentSoftDisconnected, room_id, player_uuid)
    }

    pub fn opponent_left_permanently(room_id: &str, player_uuid: &str) -> Self {
        Self::player_event(MessageType::OpponentLeftPermanently, room_id, player_uuid)
    }

    pub fn new_game_request(room_id: &str, from: &str) -> Self {
        Self::player_event(MessageType::NewGameRequest, room_id, from)
    }

    pub fn new_game_declined(room_id: &str, by: &str) -> Self {
        Self::player_event(MessageType::NewGameDeclined, room_id, by)
    }

    pub fn switch_roles_request(room_id: &str, from: &str) -> Self {
        Self::player_event(MessageType::SwitchRolesRequest, room_id, from)
    }

    pub fn switch_roles_declined(room_id: &str, by: &str) -> Self {
        Self::player_event(MessageType::SwitchRolesDeclined, room_id, by)
    }

    fn player_event(message_type: MessageType, room_id: &str, player_uuid: &str) -> Self {
        Self::from_payload(
            message_type,
            PlayerPayload {
                room_id: room_id.to_string(),
                player_uuid: player_uuid.to_string(),
            },
        )
    }

    pub fn host_changed(room_id: &str, host_id: &str) -> Self {
        Self::from_payload(
            MessageType::HostChanged,
            HostChangedPayload {
                room_id: room_id.to_string(),
                host_id: host_id.to_string(),
            },
        )
    }

    pub fn move_made(room_id: &str, coord: Coord, role: Role, turn_number: u32) -> Self {
        Self::from_payload(
            MessageType::MoveMade,
            MoveMadePayload {
                room_id: room_id.to_string(),
                row: coord.row,
                col: coord.col,
                role,
                turn_number,
            },
        )
    }

    pub fn game_over(
        room_id: &str,
        coord: Coord,
        winner: Role,
        turn_number: u32,
        winner_id: &str,
        line: Vec<Coord>,
        scores: HashMap<String, u32>,
    ) -> Self {
        Self::from_payload(
            MessageType::GameOver,
            GameOverPayload {
                room_id: room_id.to_string(),
                row: coord.row,
                col: coord.col,
                role: winner,
                turn_number,
                winner,
                winner_id: winner_id.to_string(),
                line,
                scores,
            },
        )
    }

    pub fn new_game_started(room_id: &str, turn_number: u32) -> Self {
        Self::from_payload(
            MessageType::NewGameStarted,
            NewGameStartedPayload {
                room_id: room_id.to_string(),
                turn_number,
            },
        )
    }

    pub fn switch_roles_accepted(
        room_id: &str,
        new_role: Role,
        role_map: BTreeMap<Role, String>,
    ) -> Self {
        Self::from_payload(
            MessageType::SwitchRolesAccepted,
            SwitchRolesAcceptedPayload {
                room_id: room_id.to_string(),
                new_role,
                role_map,
            },
        )
    }

    pub fn room_left_confirmation(room_id: &str) -> Self {
        Self::from_payload(
            MessageType::RoomLeftConfirmation,
            RoomPayload {
                room_id: room_id.to_string(),
            },
        )
    }

    pub fn kicked(room_id: &str) -> Self {
        Self::from_payload(
            MessageType::Kicked,
            RoomPayload {
                room_id: room_id.to_string(),
            },
        )
    }

    pub fn chat_message(room_id: &str, message: ChatMessage) -> Self {
        Self::from_payload(
            MessageType::ChatMessage,
            ChatMessagePayload {
                room_id: room_id.to_string(),
                message,
            },
        )
    }

    pub fn ack_success(request_id: Option<Value>, data: AckData) -> Self {
        Self::from_payload(
            MessageType::Ack,
            AckPayload {
                request_id,
                success: true,
                error: None,
                message: None,
                data: data.0,
            },
        )
    }

    pub fn ack_failure(request_id: Option<Value>, error: &RoomError) -> Self {
        Self::from_payload(
            MessageType::Ack,
            AckPayload {
                request_id,
                success: false,
                error: Some(error.code().to_string()),
                message: Some(error.to_string()),
                data: Map::new(),
            },
        )
    }
}
