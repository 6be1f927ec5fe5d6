use battleship_link::{
    fire, resolve, Cell, FireOutcome, GameEngine, Grid, Side, SideId, Ship, ShipKind, BoardError,
    TOTAL_SHIP_CELLS,
};
use rand::{rngs::SmallRng, SeedableRng};

#[test]
fn test_can_place_bounds_and_overlap() {
    let mut grid = Grid::new();
    assert!(grid.can_place(0, 0, 5, true));
    assert!(grid.can_place(0, 5, 5, true));
    assert!(!grid.can_place(0, 6, 5, true));
    assert!(!grid.can_place(6, 0, 5, false));
    assert!(!grid.can_place(10, 0, 1, true));
    assert!(!grid.can_place(0, 0, 0, true));

    let mut ship = Ship::new(ShipKind::new("Cruiser", 3));
    grid.place(&mut ship, 2, 2, true);
    assert!(!grid.can_place(0, 3, 3, false));
    assert!(grid.can_place(3, 2, 3, true));
}

#[test]
fn test_try_place_rejects_illegal() {
    let mut grid = Grid::new();
    let mut a = Ship::new(ShipKind::new("A", 3));
    let mut b = Ship::new(ShipKind::new("B", 3));
    grid.try_place(&mut a, 0, 0, true).unwrap();
    assert_eq!(grid.try_place(&mut b, 0, 2, false), Err(BoardError::IllegalPlacement));
    assert!(!b.is_placed());
    // a placed ship keeps its coordinates
    assert_eq!(grid.try_place(&mut a, 5, 5, true), Err(BoardError::IllegalPlacement));
    assert_eq!(a.head(), Some((0, 0)));
}

#[test]
fn test_fire_transitions() {
    let mut grid = Grid::new();
    let mut ship = Ship::new(ShipKind::new("Destroyer", 3));
    grid.place(&mut ship, 3, 0, true);

    assert_eq!(fire(&mut grid, 3, 1), FireOutcome::Hit);
    assert_eq!(grid.cell(3, 1), Some(Cell::Hit));
    assert_eq!(fire(&mut grid, 0, 0), FireOutcome::Miss);
    assert_eq!(grid.cell(0, 0), Some(Cell::Miss));
    assert_eq!(fire(&mut grid, 3, 1), FireOutcome::Invalid);
    assert_eq!(fire(&mut grid, 0, 0), FireOutcome::Invalid);
    assert_eq!(fire(&mut grid, 11, 0), FireOutcome::Invalid);
}

#[test]
fn test_resolve_reports_sunk_and_loser() {
    let mut side = Side::new(SideId::Opponent);
    side.place_segment(0, 0, 2, true).unwrap();
    let first = resolve(&mut side, 0, 0);
    assert_eq!(first.outcome, FireOutcome::Hit);
    assert_eq!(first.sunk, None);
    let second = resolve(&mut side, 0, 1);
    assert_eq!(second.sunk, Some("Submarine"));
    // the rest of the fleet is still unplaced, hence not sunk
    assert_eq!(second.loser, None);
}

#[test]
fn test_place_segment_picks_matching_length() {
    let mut side = Side::new(SideId::Opponent);
    assert_eq!(side.place_segment(0, 0, 3, true), Ok(2));
    assert_eq!(side.place_segment(1, 0, 3, true), Ok(3));
    assert_eq!(side.place_segment(2, 0, 3, true), Err(BoardError::NoShipOfLength(3)));
    assert_eq!(side.place_segment(9, 9, 2, true), Err(BoardError::IllegalPlacement));
}

#[test]
fn test_seventeen_hits_sink_the_fleet() {
    let mut rng = SmallRng::seed_from_u64(7);
    let mut engine = GameEngine::new();
    engine
        .side_mut(SideId::Opponent)
        .place_remaining_randomly(&mut rng)
        .unwrap();
    let targets: Vec<_> = engine
        .opponent()
        .fleet
        .ships()
        .iter()
        .flat_map(|s| s.coordinates().to_vec())
        .collect();
    assert_eq!(targets.len(), TOTAL_SHIP_CELLS);

    for (i, &(r, c)) in targets.iter().enumerate() {
        let report = engine.fire_at_opponent(r, c);
        assert_eq!(report.outcome, FireOutcome::Hit);
        if i + 1 < targets.len() {
            assert!(report.loser.is_none());
        } else {
            assert_eq!(report.loser, Some(SideId::Opponent));
        }
    }
    assert!(engine.opponent().is_defeated());
}

#[test]
fn test_engine_reset_keeps_tally() {
    let mut engine = GameEngine::new();
    assert!(engine.record_outcome(battleship_link::MatchOutcome::Won));
    assert!(!engine.record_outcome(battleship_link::MatchOutcome::Lost));
    engine.reset();
    assert!(engine.record_outcome(battleship_link::MatchOutcome::Aborted));
    assert_eq!(engine.tally().wins, 1);
    assert_eq!(engine.tally().losses, 0);
    assert_eq!(engine.local().grid.occupied_count(), 0);
}

#[test]
fn test_public_cells_hide_ships() {
    let mut grid = Grid::new();
    let mut ship = Ship::new(ShipKind::new("Sub", 2));
    grid.place(&mut ship, 0, 0, true);
    fire(&mut grid, 0, 0);
    let public = grid.to_public_cells();
    assert_eq!(public[0][0], Cell::Hit);
    assert_eq!(public[0][1], Cell::Empty);
    assert_eq!(grid.to_cells()[0][1], Cell::Occupied);
}

#[test]
fn test_coord_labels() {
    assert_eq!(battleship_link::coord_label(3, 4), "E4");
    assert_eq!(battleship_link::parse_coord_label("e4"), Some((3, 4)));
    assert_eq!(battleship_link::parse_coord_label("J10"), Some((9, 9)));
    assert_eq!(battleship_link::parse_coord_label("K1"), None);
    assert_eq!(battleship_link::parse_coord_label("A0"), None);
    assert_eq!(battleship_link::coord_label(0, 200), "(0, 200)");
    assert_eq!(battleship_link::coord_label(usize::MAX, 3), format!("({}, 3)", usize::MAX));
}

#[test]
fn test_can_place_rejects_huge_indices() {
    let grid = Grid::new();
    assert!(!grid.can_place(0, usize::MAX, 5, true));
    assert!(!grid.can_place(usize::MAX, 0, 5, false));
    assert!(!grid.can_place(0, 0, usize::MAX, true));
    assert!(!grid.can_place(9, 9, 11, false));
    assert!(grid.can_place(9, 9, 1, false));
}
