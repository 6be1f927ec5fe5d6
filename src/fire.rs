//! Shot resolution against one side's grid and fleet.

use crate::common::{Cell, FireOutcome, SideId};
use crate::game::Side;
use crate::grid::Grid;

/// Apply a shot to `grid` only.
///
/// Empty becomes Miss, Occupied becomes Hit. A cell that was already fired
/// upon, or a coordinate off the board, yields `Invalid` and leaves the grid
/// untouched.
pub fn fire(grid: &mut Grid, row: usize, col: usize) -> FireOutcome {
    match grid.cell(row, col) {
        Some(Cell::Empty) => {
            grid.mark_miss(row, col);
            FireOutcome::Miss
        }
        Some(Cell::Occupied) => {
            grid.mark_hit(row, col);
            FireOutcome::Hit
        }
        Some(Cell::Hit) | Some(Cell::Miss) | None => FireOutcome::Invalid,
    }
}

/// Everything a caller needs to narrate and advance after one shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotReport {
    pub outcome: FireOutcome,
    /// Name of the ship this shot finished off.
    pub sunk: Option<&'static str>,
    /// Set when the defending fleet is gone.
    pub loser: Option<SideId>,
}

impl ShotReport {
    pub fn invalid() -> Self {
        ShotReport {
            outcome: FireOutcome::Invalid,
            sunk: None,
            loser: None,
        }
    }
}

/// Fire at `defender`, update its fleet and report sunk/game-over status.
pub fn resolve(defender: &mut Side, row: usize, col: usize) -> ShotReport {
    let outcome = fire(&mut defender.grid, row, col);
    if outcome != FireOutcome::Hit {
        if outcome == FireOutcome::Invalid {
            log::debug!(
                "Ignoring shot at ({}, {}) on {:?} grid: already fired or off board",
                row,
                col,
                defender.id
            );
        }
        return ShotReport {
            outcome,
            sunk: None,
            loser: None,
        };
    }

    let sunk = defender
        .fleet
        .register_hit(row, col)
        .and_then(|i| defender.fleet.ship(i))
        .filter(|ship| ship.is_sunk())
        .map(|ship| ship.name());
    let loser = defender.fleet.is_fleet_sunk().then_some(defender.id);
    ShotReport {
        outcome,
        sunk,
        loser,
    }
}
