// Library crate for the five-in-a-row game server
// This file exposes the public API for integration tests

pub mod config;
pub mod game;
pub mod room;
pub mod session;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::ServerConfig;
pub use room::{repository::RoomRepository, Room, RoomError, RoomService};
pub use shared::{AppError, AppState};
pub use websockets::{
    ClientMessage, ConnectionContext, ConnectionManager, MessageHandler, MessageType,
    WebSocketMessage, WebsocketReceiveHandler,
};
