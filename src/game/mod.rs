// Public API - what other modules can use
pub use board::{Board, BoardError, Coord, Role, Win, BOARD_COLS, BOARD_ROWS, WIN_LENGTH};

// Internal modules
mod board;
