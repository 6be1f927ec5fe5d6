//! Ship definitions and per-ship hit bookkeeping.

use core::fmt;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn is_horizontal(self) -> bool {
        self == Orientation::Horizontal
    }

    pub fn from_horizontal(horizontal: bool) -> Self {
        if horizontal {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    /// Cell `i` steps from `(row, col)` along this orientation. Saturates,
    /// so a run that would wrap lands off the board instead.
    pub fn step(self, row: usize, col: usize, i: usize) -> (usize, usize) {
        match self {
            Orientation::Horizontal => (row, col.saturating_add(i)),
            Orientation::Vertical => (row.saturating_add(i), col),
        }
    }
}

/// Catalog entry: ship name and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipKind {
    name: &'static str,
    length: usize,
}

impl ShipKind {
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

/// One ship of a fleet.
///
/// Until [`Ship::mark_placed`] is called the ship has no coordinates. After
/// that its head, orientation and coordinates stay fixed for the rest of the
/// match; only the hit counter moves.
#[derive(Clone, PartialEq, Eq)]
pub struct Ship {
    kind: ShipKind,
    orientation: Orientation,
    head: Option<(usize, usize)>,
    coordinates: Vec<(usize, usize)>,
    hits: usize,
}

impl Ship {
    pub fn new(kind: ShipKind) -> Self {
        Ship {
            kind,
            orientation: Orientation::Horizontal,
            head: None,
            coordinates: Vec::with_capacity(kind.length()),
            hits: 0,
        }
    }

    /// Record the placement. Callers validate with
    /// [`Grid::can_place`](crate::grid::Grid::can_place) first.
    pub(crate) fn mark_placed(&mut self, row: usize, col: usize, orientation: Orientation) {
        debug_assert!(!self.is_placed(), "ship {} placed twice", self.kind.name());
        self.orientation = orientation;
        self.head = Some((row, col));
        self.coordinates = (0..self.kind.length())
            .map(|i| orientation.step(row, col, i))
            .collect();
    }

    /// Count a hit if `(row, col)` is one of this ship's cells.
    ///
    /// The grid's Occupied to Hit transition keeps well-formed callers from
    /// reporting the same cell twice; the counter never exceeds the length.
    pub fn register_hit(&mut self, row: usize, col: usize) -> bool {
        if !self.occupies(row, col) {
            return false;
        }
        if self.hits < self.kind.length() {
            self.hits += 1;
        }
        true
    }

    pub fn occupies(&self, row: usize, col: usize) -> bool {
        self.coordinates.contains(&(row, col))
    }

    pub fn is_sunk(&self) -> bool {
        self.is_placed() && self.hits == self.kind.length()
    }

    pub fn is_placed(&self) -> bool {
        self.head.is_some()
    }

    pub fn kind(&self) -> ShipKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn length(&self) -> usize {
        self.kind.length()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn head(&self) -> Option<(usize, usize)> {
        self.head
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn coordinates(&self) -> &[(usize, usize)] {
        &self.coordinates
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ name: \"{}\", head: {:?}, orientation: {:?}, hits: {}/{} }}",
            self.kind.name(),
            self.head,
            self.orientation,
            self.hits,
            self.kind.length(),
        )
    }
}
