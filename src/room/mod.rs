// Public API - what other modules can use
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use errors::RoomError;
pub use models::{ConnectionId, Room, RoomPhase, RoomSnapshot};
pub use service::RoomService;

// Internal modules
pub mod cleanup_task;
mod errors;
pub mod models;
pub mod repository;
pub mod service;
