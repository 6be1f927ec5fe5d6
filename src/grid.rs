//! 10×10 grid state backed by three `BitBoard` layers.

use core::fmt;
use rand::Rng;

use crate::bitboard::BitBoard;
use crate::common::{BoardError, Cell};
use crate::config::BOARD_SIZE;
use crate::ship::{Orientation, Ship};

const N: usize = BOARD_SIZE as usize;
type BB = BitBoard<u128, N>;

/// Upper bound on random placement attempts for one ship.
const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// One side's board: which cells hold ships and which were fired upon.
///
/// Invariant: `hits ⊆ occupied` and `misses ∩ occupied = ∅`.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Grid {
    occupied: BB,
    hits: BB,
    misses: BB,
}

impl Grid {
    pub fn new() -> Self {
        Grid {
            occupied: BB::new(),
            hits: BB::new(),
            misses: BB::new(),
        }
    }

    /// Cell state at `(row, col)`, `None` off the board.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        if row >= N || col >= N {
            return None;
        }
        Some(if self.hits.contains(row, col) {
            Cell::Hit
        } else if self.misses.contains(row, col) {
            Cell::Miss
        } else if self.occupied.contains(row, col) {
            Cell::Occupied
        } else {
            Cell::Empty
        })
    }

    /// True iff every cell of the run lies on the board and is Empty.
    pub fn can_place(&self, row: usize, col: usize, length: usize, horizontal: bool) -> bool {
        if length == 0 || length > N || row >= N || col >= N {
            return false;
        }
        let orientation = Orientation::from_horizontal(horizontal);
        let (end_r, end_c) = orientation.step(row, col, length - 1);
        if end_r >= N || end_c >= N {
            return false;
        }
        (0..length).all(|i| {
            let (r, c) = orientation.step(row, col, i);
            self.cell(r, c) == Some(Cell::Empty)
        })
    }

    /// Put `ship` on the grid. The run must have passed [`Grid::can_place`].
    pub fn place(&mut self, ship: &mut Ship, row: usize, col: usize, horizontal: bool) {
        debug_assert!(
            self.can_place(row, col, ship.length(), horizontal),
            "place called without a successful can_place"
        );
        ship.mark_placed(row, col, Orientation::from_horizontal(horizontal));
        for &(r, c) in ship.coordinates() {
            let _ = self.occupied.set(r, c);
        }
    }

    /// Checked variant of [`Grid::place`].
    pub fn try_place(
        &mut self,
        ship: &mut Ship,
        row: usize,
        col: usize,
        horizontal: bool,
    ) -> Result<(), BoardError> {
        if ship.is_placed() || !self.can_place(row, col, ship.length(), horizontal) {
            return Err(BoardError::IllegalPlacement);
        }
        self.place(ship, row, col, horizontal);
        Ok(())
    }

    /// Sample (row, col, horizontal) uniformly until the run fits.
    pub fn random_placement<R: Rng>(
        &self,
        rng: &mut R,
        length: usize,
    ) -> Result<(usize, usize, bool), BoardError> {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let horizontal: bool = rng.random();
            let r = rng.random_range(0..N);
            let c = rng.random_range(0..N);
            if self.can_place(r, c, length, horizontal) {
                return Ok((r, c, horizontal));
            }
        }
        Err(BoardError::UnableToPlaceShip)
    }

    pub(crate) fn mark_hit(&mut self, row: usize, col: usize) {
        let _ = self.hits.set(row, col);
    }

    pub(crate) fn mark_miss(&mut self, row: usize, col: usize) {
        let _ = self.misses.set(row, col);
    }

    pub fn is_fired_at(&self, row: usize, col: usize) -> bool {
        self.hits.contains(row, col) || self.misses.contains(row, col)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.count_ones()
    }

    pub fn hit_count(&self) -> usize {
        self.hits.count_ones()
    }

    pub fn miss_count(&self) -> usize {
        self.misses.count_ones()
    }

    /// Cells fired at, hit or miss.
    pub fn fired(&self) -> Vec<(usize, usize)> {
        (self.hits | self.misses).iter_ones().collect()
    }

    /// Row-major snapshot of every cell.
    pub fn to_cells(&self) -> [[Cell; N]; N] {
        core::array::from_fn(|r| core::array::from_fn(|c| self.cell(r, c).unwrap_or(Cell::Empty)))
    }

    /// Same as [`Grid::to_cells`] with Occupied cells shown as Empty, i.e.
    /// what the opponent is allowed to see.
    pub fn to_public_cells(&self) -> [[Cell; N]; N] {
        let mut cells = self.to_cells();
        for row in cells.iter_mut() {
            for cell in row.iter_mut() {
                if *cell == Cell::Occupied {
                    *cell = Cell::Empty;
                }
            }
        }
        cells
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid [")?;
        for r in 0..N {
            write!(f, "  ")?;
            for c in 0..N {
                let ch = match self.cell(r, c) {
                    Some(Cell::Occupied) => 'S',
                    Some(Cell::Hit) => 'X',
                    Some(Cell::Miss) => 'o',
                    _ => '.',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        write!(f, "]")
    }
}
