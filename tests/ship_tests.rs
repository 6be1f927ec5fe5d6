use battleship_link::{Fleet, Grid, Orientation, Ship, ShipKind, NUM_SHIPS, SHIPS, TOTAL_SHIP_CELLS};

#[test]
fn test_new_ship_is_unplaced() {
    let ship = Ship::new(ShipKind::new("Test", 3));
    assert!(!ship.is_placed());
    assert!(!ship.is_sunk());
    assert!(ship.coordinates().is_empty());
    assert_eq!(ship.head(), None);
}

#[test]
fn test_place_records_head_and_coordinates() {
    let mut grid = Grid::new();
    let mut ship = Ship::new(ShipKind::new("Test", 4));
    grid.place(&mut ship, 0, 0, false);
    assert!(ship.is_placed());
    assert_eq!(ship.head(), Some((0, 0)));
    assert_eq!(ship.orientation(), Orientation::Vertical);
    assert_eq!(ship.coordinates(), &[(0, 0), (1, 0), (2, 0), (3, 0)]);
}

#[test]
fn test_register_hit_and_sunk() {
    let mut grid = Grid::new();
    let mut ship = Ship::new(ShipKind::new("Test", 2));
    grid.place(&mut ship, 1, 1, true);

    assert!(!ship.register_hit(0, 0));
    assert_eq!(ship.hits(), 0);

    assert!(ship.register_hit(1, 1));
    assert!(!ship.is_sunk());
    assert!(ship.register_hit(1, 2));
    assert!(ship.is_sunk());

    // counter never passes the length
    assert!(ship.register_hit(1, 2));
    assert_eq!(ship.hits(), 2);
}

#[test]
fn test_fleet_catalog() {
    let fleet = Fleet::new();
    assert_eq!(fleet.ships().len(), NUM_SHIPS);
    let names: Vec<_> = fleet.ships().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["Carrier", "Battleship", "Cruiser", "Destroyer", "Submarine"]);
    let cells: usize = SHIPS.iter().map(|s| s.length()).sum();
    assert_eq!(cells, TOTAL_SHIP_CELLS);
    assert_eq!(fleet.next_unplaced(), Some(0));
    assert_eq!(fleet.next_unplaced_of_length(3), Some(2));
    assert!(!fleet.all_placed());
    assert!(!fleet.is_fleet_sunk());
}

#[test]
fn test_ship_name_static() {
    assert_eq!(battleship_link::ship_name_static("carrier"), Some("Carrier"));
    assert_eq!(battleship_link::ship_name_static("Dinghy"), None);
}
