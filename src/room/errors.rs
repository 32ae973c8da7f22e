use thiserror::Error;

use crate::game::BoardError;

/// Errors surfaced to the requesting player only, never broadcast.
///
/// The variant name doubles as the stable error code sent in acknowledgments.
#[derive(Error, Debug, Clone, PartialEq, Eq, strum_macros::IntoStaticStr)]
pub enum RoomError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Room is full")]
    RoomFull,

    #[error("You are not playing that role")]
    WrongRole,

    #[error("It is not your turn")]
    WrongTurn,

    #[error("Cell ({row}, {col}) is already occupied")]
    CellOccupied { row: usize, col: usize },

    #[error("Move is outside the board")]
    OutOfBounds,

    #[error("The game is over")]
    GameOver,

    #[error("No opponent is connected")]
    NoOpponent,

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("You are not a player in this room")]
    NotInRoom,

    #[error("Only the host can do that")]
    NotHost,

    #[error("There is no pending proposal to respond to")]
    NoPendingProposal,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error")]
    Internal,
}

impl RoomError {
    /// Stable machine-readable code, e.g. `"WrongTurn"`
    pub fn code(&self) -> &'static str {
        self.into()
    }
}

impl From<BoardError> for RoomError {
    fn from(error: BoardError) -> Self {
        match error {
            BoardError::CellOccupied { row, col } => RoomError::CellOccupied { row, col },
        }
    }
}
