//! The five-ship fleet owned by one side.

use crate::config::{NUM_SHIPS, SHIPS};
use crate::ship::Ship;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fleet {
    ships: [Ship; NUM_SHIPS],
}

impl Fleet {
    /// A fresh fleet built from the catalog, nothing placed.
    pub fn new() -> Self {
        Fleet {
            ships: core::array::from_fn(|i| Ship::new(SHIPS[i])),
        }
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ship(&self, index: usize) -> Option<&Ship> {
        self.ships.get(index)
    }

    pub(crate) fn ship_mut(&mut self, index: usize) -> Option<&mut Ship> {
        self.ships.get_mut(index)
    }

    /// Index of the next ship in catalog order that still needs a position.
    pub fn next_unplaced(&self) -> Option<usize> {
        self.ships.iter().position(|s| !s.is_placed())
    }

    /// Index of the first unplaced ship with the given length.
    pub fn next_unplaced_of_length(&self, length: usize) -> Option<usize> {
        self.ships
            .iter()
            .position(|s| !s.is_placed() && s.length() == length)
    }

    pub fn all_placed(&self) -> bool {
        self.ships.iter().all(Ship::is_placed)
    }

    /// Offer a hit at `(row, col)` to every ship. Returns the index of the
    /// ship that took it.
    pub fn register_hit(&mut self, row: usize, col: usize) -> Option<usize> {
        let mut owner = None;
        for (i, ship) in self.ships.iter_mut().enumerate() {
            if ship.register_hit(row, col) {
                owner = Some(i);
            }
        }
        owner
    }

    pub fn is_fleet_sunk(&self) -> bool {
        self.ships.iter().all(Ship::is_sunk)
    }

    /// Lengths of ships still afloat.
    pub fn remaining_lengths(&self) -> Vec<usize> {
        self.ships
            .iter()
            .filter(|s| !s.is_sunk())
            .map(Ship::length)
            .collect()
    }

    pub fn sunk_count(&self) -> usize {
        self.ships.iter().filter(|s| s.is_sunk()).count()
    }
}

impl Default for Fleet {
    fn default() -> Self {
        Self::new()
    }
}
