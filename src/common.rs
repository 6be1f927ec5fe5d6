//! Common types for the game core: cell states, fire outcomes, side and role
//! identifiers and board errors.

use core::fmt;

use crate::bitboard::BitBoardError;
use crate::config::BOARD_SIZE;

/// State of one grid cell as seen by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Occupied,
    Hit,
    Miss,
}

/// Result of applying a shot to a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// Shot landed on an occupied cell.
    Hit,
    /// Shot landed on open water.
    Miss,
    /// Cell was already fired upon or lies off the board; nothing changed.
    Invalid,
}

/// Which of the two participants a piece of state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideId {
    Local,
    Opponent,
}

impl SideId {
    pub fn other(self) -> SideId {
        match self {
            SideId::Local => SideId::Opponent,
            SideId::Opponent => SideId::Local,
        }
    }
}

/// Network role of this process. Assigned once per connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Unset,
    Host,
    Client,
}

/// Errors returned by grid and fleet operations.
#[derive(Debug, PartialEq, Eq)]
pub enum BoardError {
    /// Underlying bitboard error (bad index).
    BitBoardError(BitBoardError),
    /// Coordinates lie outside the board.
    OutOfBounds { row: i32, col: i32 },
    /// Placement leaves the board or overlaps another ship.
    IllegalPlacement,
    /// No unplaced ship of the requested length remains.
    NoShipOfLength(usize),
    /// Every ship in the fleet is already placed.
    FleetComplete,
    /// Random placement gave up.
    UnableToPlaceShip,
}

impl From<BitBoardError> for BoardError {
    fn from(err: BitBoardError) -> Self {
        BoardError::BitBoardError(err)
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::BitBoardError(e) => write!(f, "BitBoard error: {}", e),
            BoardError::OutOfBounds { row, col } => {
                write!(f, "Coordinates ({}, {}) are off the board", row, col)
            }
            BoardError::IllegalPlacement => {
                write!(f, "Ship placement is out of bounds or overlaps another ship")
            }
            BoardError::NoShipOfLength(len) => write!(f, "No unplaced ship of length {}", len),
            BoardError::FleetComplete => write!(f, "All ships are already placed"),
            BoardError::UnableToPlaceShip => write!(f, "Unable to place ship"),
        }
    }
}

impl std::error::Error for BoardError {}

/// Check signed coordinates and convert them to board indices.
pub fn board_index(row: i32, col: i32) -> Option<(usize, usize)> {
    let size = BOARD_SIZE as i32;
    if (0..size).contains(&row) && (0..size).contains(&col) {
        Some((row as usize, col as usize))
    } else {
        None
    }
}

/// Human label for a cell: column letter then 1-based row, so `(3, 4)`
/// becomes `"E4"`. Off-board cells print as `"(row, col)"`.
pub fn coord_label(row: usize, col: usize) -> String {
    if !on_board(row, col) {
        return format!("({}, {})", row, col);
    }
    let letter = (b'A' + col as u8) as char;
    format!("{}{}", letter, row + 1)
}

pub fn on_board(row: usize, col: usize) -> bool {
    let size = BOARD_SIZE as usize;
    row < size && col < size
}

/// Parse a label produced by [`coord_label`] (case-insensitive).
pub fn parse_coord_label(label: &str) -> Option<(usize, usize)> {
    let label = label.trim();
    let mut chars = label.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if !letter.is_ascii_uppercase() {
        return None;
    }
    let col = (letter as u8 - b'A') as i32;
    let row: i32 = chars.as_str().parse().ok()?;
    board_index(row - 1, col)
}
