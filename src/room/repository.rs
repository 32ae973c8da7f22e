use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument, warn};

use super::models::Room;

/// Shared, independently lockable room state
pub type RoomHandle = Arc<Mutex<Room>>;

/// Result of attempting to register a new room
pub enum CreateRoomResult {
    Created(RoomHandle),
    /// Another room already uses this identifier
    IdTaken,
}

/// Trait for room repository operations
#[async_trait]
pub trait RoomRepository {
    async fn create_room(&self, room: Room) -> CreateRoomResult;
    async fn get_room(&self, room_id: &str) -> Option<RoomHandle>;
    async fn delete_room(&self, room_id: &str) -> Option<RoomHandle>;
    async fn list_rooms(&self) -> Vec<RoomHandle>;
}

/// In-memory room registry. Rooms live for the lifetime of the process.
pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<String, RoomHandle>>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self, room), fields(room_id = %room.id()))]
    async fn create_room(&self, room: Room) -> CreateRoomResult {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(room.id()) {
            warn!("Room id already taken");
            return CreateRoomResult::IdTaken;
        }

        let room_id = room.id().to_string();
        let handle = Arc::new(Mutex::new(room));
        rooms.insert(room_id, Arc::clone(&handle));

        debug!(room_count = rooms.len(), "Room stored in memory");
        CreateRoomResult::Created(handle)
    }

    async fn get_room(&self, room_id: &str) -> Option<RoomHandle> {
        self.rooms.read().await.get(room_id).cloned()
    }

    #[instrument(skip(self))]
    async fn delete_room(&self, room_id: &str) -> Option<RoomHandle> {
        let removed = self.rooms.write().await.remove(room_id);
        if removed.is_some() {
            debug!("Room removed from memory");
        }
        removed
    }

    async fn list_rooms(&self) -> Vec<RoomHandle> {
        self.rooms.read().await.values().cloned().collect()
    }
}
