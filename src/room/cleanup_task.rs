use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, instrument};

use super::service::RoomService;

/// Configuration for the cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run the cleanup task
    pub cleanup_interval: Duration,
    /// How long a room without connections must be idle before deletion.
    /// `None` disables reaping, so rooms live until their last player leaves.
    pub inactivity_threshold: Option<Duration>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(30 * 60),
            inactivity_threshold: None,
        }
    }
}

/// Periodically removes rooms that nobody is connected to
#[instrument(skip(room_service))]
pub async fn start_cleanup_task(room_service: Arc<RoomService>, config: CleanupConfig) {
    let Some(inactivity_threshold) = config.inactivity_threshold else {
        info!("Room idle timeout not set, cleanup task disabled");
        return;
    };
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        inactivity_threshold_secs = inactivity_threshold.as_secs(),
        "Starting room cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);
    // The first tick completes immediately
    cleanup_interval.tick().await;

    loop {
        cleanup_interval.tick().await;

        let deleted_count = cleanup_inactive_rooms(&room_service, inactivity_threshold).await;
        info!(deleted_count, "Room cleanup completed");
    }
}

/// Deletes rooms with no live connection whose last activity is older than the threshold
pub async fn cleanup_inactive_rooms(
    room_service: &RoomService,
    inactivity_threshold: Duration,
) -> usize {
    let now = Utc::now();
    let mut deleted_count = 0;

    for handle in room_service.list_rooms().await {
        let mut room = handle.lock().await;
        if room.is_closed() || room.has_live_connections() {
            continue;
        }
        let idle_for = (now - room.last_activity_at()).to_std().unwrap_or_default();
        if idle_for <= inactivity_threshold {
            continue;
        }

        debug!(room_id = %room.id(), last_activity_at = %room.last_activity_at(), "Reaping idle room");
        room_service.remove(&mut room).await;
        deleted_count += 1;
    }

    deleted_count
}
