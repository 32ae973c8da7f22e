use axum::{extract::State, Json};
use tracing::{info, instrument};

use super::types::SessionResponse;
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a new session
///
/// POST /session
/// Returns a JWT token as session_id, the generated username and the player identity
#[instrument(name = "create_session", skip(state))]
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.session_service.create_session().await?;

    info!(
        username = %session.username,
        session_id_length = session.session_id.len(),
        "Session created successfully"
    );

    Ok(Json(session))
}
