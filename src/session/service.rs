use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    generators::UsernameGenerator,
    models::SessionModel,
    repository::SessionRepository,
    token::TokenConfig,
    types::{SessionClaims, SessionResponse},
};
use crate::shared::AppError;

/// Issues and validates player sessions
pub struct SessionService {
    token_config: TokenConfig,
    repository: Arc<dyn SessionRepository + Send + Sync>,
    username_generator: Arc<dyn UsernameGenerator>,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn SessionRepository + Send + Sync>,
        username_generator: Arc<dyn UsernameGenerator>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            token_config,
            repository,
            username_generator,
        }
    }

    /// Creates a new session with a generated username and JWT token
    #[instrument(skip(self))]
    pub async fn create_session(&self) -> Result<SessionResponse, AppError> {
        let username = self.username_generator.generate().await;
        let session = SessionModel::new(username, self.token_config.expiration_days);

        self.repository.create_session(&session).await?;
        let token = self
            .token_config
            .create_token(session.id.clone(), session.username.clone())?;

        info!(player_uuid = %session.id, username = %session.username, "Session created");

        Ok(SessionResponse {
            session_id: token,
            username: session.username,
            player_uuid: session.id,
        })
    }

    /// Validates a session token and returns the claims if valid
    #[instrument(skip(self, token))]
    pub async fn validate_session(&self, token: &str) -> Result<SessionClaims, AppError> {
        let claims = self.token_config.validate_token(token)?;

        match self.repository.get_session(&claims.session_id).await? {
            Some(session) if session.is_expired() => {
                warn!(session_id = %claims.session_id, "Session has expired");
                Err(AppError::Unauthorized("Session has expired".to_string()))
            }
            Some(_) => Ok(claims),
            None => {
                warn!(session_id = %claims.session_id, "Session not found");
                Err(AppError::Unauthorized(
                    "Session not found or has been revoked".to_string(),
                ))
            }
        }
    }
}
