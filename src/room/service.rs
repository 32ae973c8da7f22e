use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, instrument, warn};

use super::{
    errors::RoomError,
    models::{ConnectionId, Room},
    repository::{CreateRoomResult, RoomHandle, RoomRepository},
};

/// Attempts at finding an unused room id before giving up
const MAX_ID_ATTEMPTS: usize = 16;

/// Service for room lifecycle: creation, lookup and teardown
pub struct RoomService {
    repository: Arc<dyn RoomRepository + Send + Sync>,
    chat_limit: Option<usize>,
}

impl RoomService {
    pub fn new(repository: Arc<dyn RoomRepository + Send + Sync>, chat_limit: Option<usize>) -> Self {
        Self {
            repository,
            chat_limit,
        }
    }

    /// Creates a room with a fresh id and seats `host` in it as X
    #[instrument(skip(self, connection, default_name))]
    pub async fn create_room(
        &self,
        host: &str,
        connection: ConnectionId,
        default_name: &str,
    ) -> Result<RoomHandle, RoomError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let room_id = generate_room_id();
            let mut room = Room::new(room_id.clone(), self.chat_limit);
            room.join(host, connection, default_name)?;

            match self.repository.create_room(room).await {
                CreateRoomResult::Created(handle) => {
                    info!(room_id = %room_id, "Room created");
                    return Ok(handle);
                }
                CreateRoomResult::IdTaken => {
                    debug!(room_id = %room_id, attempt, "Room id collision, retrying");
                }
            }
        }

        warn!(attempts = MAX_ID_ATTEMPTS, "Could not find a free room id");
        Err(RoomError::Internal)
    }

    /// Locks a live room. A room torn down while the caller waited is reported
    /// as missing.
    pub async fn lock_room(&self, room_id: &str) -> Result<OwnedMutexGuard<Room>, RoomError> {
        let handle = self
            .repository
            .get_room(room_id)
            .await
            .ok_or_else(|| RoomError::RoomNotFound(room_id.to_string()))?;

        let room = handle.lock_owned().await;
        if room.is_closed() {
            return Err(RoomError::RoomNotFound(room_id.to_string()));
        }
        Ok(room)
    }

    /// Tears the room down once nobody holds a role in it. Returns whether it was removed.
    #[instrument(skip(self, room), fields(room_id = %room.id()))]
    pub async fn remove_if_empty(&self, room: &mut Room) -> bool {
        if !room.is_empty() {
            return false;
        }
        self.remove(room).await;
        true
    }

    /// Closes and unregisters the room regardless of its contents
    pub(crate) async fn remove(&self, room: &mut Room) {
        room.close();
        self.repository.delete_room(room.id()).await;
        info!(room_id = %room.id(), "Room destroyed");
    }

    pub async fn list_rooms(&self) -> Vec<RoomHandle> {
        self.repository.list_rooms().await
    }
}

/// Two-word pet name, e.g. `brave-otter`
pub fn generate_room_id() -> String {
    petname::Petnames::default().generate_one(2, "-")
}
