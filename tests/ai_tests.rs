use battleship_link::{calc_pdf, choose_target, fire, Grid, Side, SideId, BOARD_SIZE, SHIPS};
use rand::{rngs::SmallRng, SeedableRng};

fn lengths() -> Vec<usize> {
    SHIPS.iter().map(|s| s.length()).collect()
}

#[test]
fn test_pdf_is_normalized_and_zero_on_fired_cells() {
    let mut grid = Grid::new();
    fire(&mut grid, 0, 0);
    fire(&mut grid, 5, 5);
    let pdf = calc_pdf(&grid, &lengths());
    let total: f64 = pdf.iter().flatten().sum();
    assert!((total - 1.0).abs() < 1e-6);
    assert_eq!(pdf[0][0], 0.0);
    assert_eq!(pdf[5][5], 0.0);
}

#[test]
fn test_choose_target_never_repeats_a_cell() {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut side = Side::new(SideId::Opponent);
    side.place_remaining_randomly(&mut rng).unwrap();

    let cells = (BOARD_SIZE as usize).pow(2);
    for _ in 0..cells {
        let remaining = side.fleet.remaining_lengths();
        let (r, c) = choose_target(&side.grid, &remaining, &mut rng).expect("open cell left");
        assert!(!side.grid.is_fired_at(r, c), "picked {},{} twice", r, c);
        battleship_link::resolve(&mut side, r, c);
    }
    assert!(side.is_defeated());
    assert!(choose_target(&side.grid, &[], &mut rng).is_none());
}
