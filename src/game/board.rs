use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BOARD_ROWS: usize = 25;
pub const BOARD_COLS: usize = 18;

/// Minimum run of identical marks that wins a game
pub const WIN_LENGTH: usize = 5;

/// Axes examined by the win check, in evaluation order:
/// horizontal, vertical, diagonal down-right, diagonal up-right
const AXES: [(i64, i64); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

/// One of the two sides of a game. X moves on odd turns, O on even turns.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
pub enum Role {
    X,
    O,
}

impl Role {
    /// Roles in assignment order - a joining player takes the first vacant one
    pub const ALL: [Role; 2] = [Role::X, Role::O];

    /// The role whose turn it is for a given turn number (starting at 1)
    pub fn for_turn(turn_number: u32) -> Self {
        if turn_number % 2 == 1 {
            Role::X
        } else {
            Role::O
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Role::X => Role::O,
            Role::O => Role::X,
        }
    }
}

/// A cell position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Builds a coordinate from client-supplied values, rejecting anything off the grid
    pub fn checked(row: i64, col: i64) -> Option<Self> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= BOARD_ROWS || col >= BOARD_COLS {
            return None;
        }
        Some(Self { row, col })
    }

    fn step(self, d_row: i64, d_col: i64) -> Option<Self> {
        Self::checked(self.row as i64 + d_row, self.col as i64 + d_col)
    }
}

/// A completed winning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Win {
    pub role: Role,
    /// Coordinates of exactly the winning run, ordered from one end to the other
    pub line: Vec<Coord>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Cell ({row}, {col}) is already occupied")]
    CellOccupied { row: usize, col: usize },
}

/// Fixed-size grid of marks. Serializes as rows of `null | "X" | "O"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Option<Role>; BOARD_COLS]; BOARD_ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[None; BOARD_COLS]; BOARD_ROWS],
        }
    }

    pub fn get(&self, coord: Coord) -> Option<Role> {
        self.cells[coord.row][coord.col]
    }

    pub fn is_empty_at(&self, coord: Coord) -> bool {
        self.get(coord).is_none()
    }

    /// Places a mark. Cells are append-only until the board is cleared.
    pub fn place(&mut self, coord: Coord, role: Role) -> Result<(), BoardError> {
        if !self.is_empty_at(coord) {
            return Err(BoardError::CellOccupied {
                row: coord.row,
                col: coord.col,
            });
        }
        self.cells[coord.row][coord.col] = Some(role);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.cells = [[None; BOARD_COLS]; BOARD_ROWS];
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Checks whether the mark at `origin` completes a run of at least `WIN_LENGTH`.
    ///
    /// Axes are examined in a fixed order and the first qualifying run is returned,
    /// so a move completing runs on two axes at once reports the earlier axis.
    pub fn check_win(&self, origin: Coord) -> Option<Win> {
        let role = self.get(origin)?;

        AXES.iter().find_map(|&(d_row, d_col)| {
            let backward = self.run_from(origin, role, -d_row, -d_col);
            let forward = self.run_from(origin, role, d_row, d_col);

            if backward.len() + 1 + forward.len() < WIN_LENGTH {
                return None;
            }

            let line = backward
                .into_iter()
                .rev()
                .chain(std::iter::once(origin))
                .chain(forward)
                .collect();
            Some(Win { role, line })
        })
    }

    /// Contiguous cells holding `role`, walking away from `origin` (exclusive)
    fn run_from(&self, origin: Coord, role: Role, d_row: i64, d_col: i64) -> Vec<Coord> {
        let mut run = Vec::new();
        let mut cursor = origin.step(d_row, d_col);
        while let Some(coord) = cursor {
            if self.get(coord) != Some(role) {
                break;
            }
            run.push(coord);
            cursor = coord.step(d_row, d_col);
        }
        run
    }
}
