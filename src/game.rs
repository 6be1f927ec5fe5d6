use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    common::{BoardError, SideId},
    fire::{self, ShotReport},
    fleet::Fleet,
    grid::Grid,
};

/// One participant's grid together with the fleet placed on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Side {
    pub id: SideId,
    pub grid: Grid,
    pub fleet: Fleet,
}

impl Side {
    pub fn new(id: SideId) -> Self {
        Side {
            id,
            grid: Grid::new(),
            fleet: Fleet::new(),
        }
    }

    /// Place the next unplaced ship in catalog order.
    /// Returns the fleet index of the ship just placed.
    pub fn place_next(&mut self, row: usize, col: usize, horizontal: bool) -> Result<usize, BoardError> {
        let index = self.fleet.next_unplaced().ok_or(BoardError::FleetComplete)?;
        self.place_index(index, row, col, horizontal)?;
        Ok(index)
    }

    /// Place the first unplaced ship with `length` cells. Used to mirror the
    /// peer's `PLACE` announcements.
    pub fn place_segment(
        &mut self,
        row: usize,
        col: usize,
        length: usize,
        horizontal: bool,
    ) -> Result<usize, BoardError> {
        let index = self
            .fleet
            .next_unplaced_of_length(length)
            .ok_or(BoardError::NoShipOfLength(length))?;
        self.place_index(index, row, col, horizontal)?;
        Ok(index)
    }

    fn place_index(&mut self, index: usize, row: usize, col: usize, horizontal: bool) -> Result<(), BoardError> {
        let ship = self.fleet.ship_mut(index).ok_or(BoardError::FleetComplete)?;
        self.grid.try_place(ship, row, col, horizontal)
    }

    /// Randomly place every ship that is still unplaced. Returns
    /// `(row, col, length, horizontal)` for each ship placed here.
    pub fn place_remaining_randomly<R: Rng>(
        &mut self,
        rng: &mut R,
    ) -> Result<Vec<(usize, usize, usize, bool)>, BoardError> {
        let mut placed = Vec::new();
        while let Some(index) = self.fleet.next_unplaced() {
            let length = self.fleet.ship(index).map(|s| s.length()).unwrap_or(0);
            let (r, c, horizontal) = self.grid.random_placement(rng, length)?;
            self.place_index(index, r, c, horizontal)?;
            placed.push((r, c, length, horizontal));
        }
        Ok(placed)
    }

    pub fn is_defeated(&self) -> bool {
        self.fleet.is_fleet_sunk()
    }
}

/// Wins and losses across matches in this process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub wins: u32,
    pub losses: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Won,
    Lost,
    /// Link went away mid-match; the tally is not touched.
    Aborted,
}

/// Both sides of a match plus the running tally.
///
/// In peer mode the opponent side is a mirror built from the peer's `PLACE`
/// announcements, so both processes resolve every shot identically.
#[derive(Debug, Clone)]
pub struct GameEngine {
    local: Side,
    opponent: Side,
    tally: Tally,
    outcome: Option<MatchOutcome>,
}

impl GameEngine {
    pub fn new() -> Self {
        Self {
            local: Side::new(SideId::Local),
            opponent: Side::new(SideId::Opponent),
            tally: Tally::default(),
            outcome: None,
        }
    }

    /// Fresh grids and fleets; the tally carries over.
    pub fn reset(&mut self) {
        self.local = Side::new(SideId::Local);
        self.opponent = Side::new(SideId::Opponent);
        self.outcome = None;
    }

    pub fn side(&self, id: SideId) -> &Side {
        match id {
            SideId::Local => &self.local,
            SideId::Opponent => &self.opponent,
        }
    }

    pub fn side_mut(&mut self, id: SideId) -> &mut Side {
        match id {
            SideId::Local => &mut self.local,
            SideId::Opponent => &mut self.opponent,
        }
    }

    pub fn local(&self) -> &Side {
        &self.local
    }

    pub fn opponent(&self) -> &Side {
        &self.opponent
    }

    /// Our shot at the opponent's grid.
    pub fn fire_at_opponent(&mut self, row: usize, col: usize) -> ShotReport {
        fire::resolve(&mut self.opponent, row, col)
    }

    /// The opponent's shot at our grid.
    pub fn receive_fire(&mut self, row: usize, col: usize) -> ShotReport {
        fire::resolve(&mut self.local, row, col)
    }

    /// Close the match. Only the first outcome counts.
    pub fn record_outcome(&mut self, outcome: MatchOutcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        match outcome {
            MatchOutcome::Won => self.tally.wins += 1,
            MatchOutcome::Lost => self.tally.losses += 1,
            MatchOutcome::Aborted => {}
        }
        self.outcome = Some(outcome);
        true
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}
