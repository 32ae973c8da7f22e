// Public API
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use context::ConnectionContext;
pub use handler::{websocket_handler, WebsocketReceiveHandler};
pub use messages::{AckPayload, ClientMessage, MessageType, WebSocketMessage};
pub use socket::MessageHandler;

// Internal modules
mod connection_manager;
mod context;
pub mod event_handlers;
mod handler;
pub mod messages;
mod socket;
