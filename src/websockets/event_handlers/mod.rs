pub mod chat_events;
pub mod connection_events;
pub mod game_events;
pub mod room_events;
pub mod shared;

pub use chat_events::ChatEventHandlers;
pub use connection_events::ConnectionEventHandlers;
pub use game_events::GameEventHandlers;
pub use room_events::RoomEventHandlers;

use crate::room::RoomError;
use crate::websockets::messages::AckData;

/// Outcome of one client request: extra ack fields, or the error to report
pub type HandlerResult = Result<AckData, RoomError>;
