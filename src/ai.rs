//! Scripted opponent for local mode: hunt/target shot selection driven by a
//! probability density over the cells not yet fired at.

use crate::{
    common::Cell,
    config::BOARD_SIZE,
    grid::Grid,
    ship::Orientation,
};
use rand::Rng;

const GRID_SIZE: usize = BOARD_SIZE as usize;

/// Placements covering known hits get `HIT_BIAS^hits` weight, which pulls
/// the next shot next to a wounded ship.
const HIT_BIAS: f64 = 10.0;

/// Lower temperature favours the densest cells.
const TEMPERATURE: f64 = 0.5;

pub type Pdf = [[f64; GRID_SIZE]; GRID_SIZE];

/// Relative likelihood of a ship segment sitting on each unfired cell of
/// `target`, given the lengths of ships still afloat.
///
/// Only the public part of the grid is read (hits and misses), so the
/// scripted opponent never peeks at ship positions.
pub fn calc_pdf(target: &Grid, remaining_lengths: &[usize]) -> Pdf {
    let mut matrix = [[0.0f64; GRID_SIZE]; GRID_SIZE];
    let cells = target.to_public_cells();

    for &len in remaining_lengths.iter().filter(|&&l| l > 0 && l <= GRID_SIZE) {
        for orient in [Orientation::Horizontal, Orientation::Vertical] {
            let (max_row, max_col) = match orient {
                Orientation::Vertical => (GRID_SIZE - len + 1, GRID_SIZE),
                Orientation::Horizontal => (GRID_SIZE, GRID_SIZE - len + 1),
            };
            for r in 0..max_row {
                for c in 0..max_col {
                    let mut n_hits = 0i32;
                    let valid = (0..len).all(|k| {
                        let (rr, cc) = orient.step(r, c, k);
                        match cells[rr][cc] {
                            Cell::Miss => false,
                            Cell::Hit => {
                                n_hits += 1;
                                true
                            }
                            _ => true,
                        }
                    });
                    if !valid {
                        continue;
                    }

                    let weight = HIT_BIAS.powi(n_hits);
                    for k in 0..len {
                        let (rr, cc) = orient.step(r, c, k);
                        if cells[rr][cc] == Cell::Empty {
                            matrix[rr][cc] += weight;
                        }
                    }
                }
            }
        }
    }

    normalize(matrix)
}

fn normalize(mut matrix: Pdf) -> Pdf {
    let total: f64 = matrix.iter().flatten().sum();
    if total == 0.0 {
        return matrix;
    }
    for v in matrix.iter_mut().flatten() {
        *v /= total;
    }
    matrix
}

/// Sample a coordinate from `pdf`. Returns `None` when every weight is zero.
pub fn sample_pdf<R: Rng + ?Sized>(pdf: &Pdf, temperature: f64, rng: &mut R) -> Option<(usize, usize)> {
    let mut adjusted = [[0.0f64; GRID_SIZE]; GRID_SIZE];
    let mut total = 0.0;
    for r in 0..GRID_SIZE {
        for c in 0..GRID_SIZE {
            let v = pdf[r][c].powf(1.0 / temperature);
            adjusted[r][c] = v;
            total += v;
        }
    }
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    let threshold: f64 = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for r in 0..GRID_SIZE {
        for c in 0..GRID_SIZE {
            if adjusted[r][c] <= 0.0 {
                continue;
            }
            cumulative += adjusted[r][c];
            last_positive = Some((r, c));
            if threshold < cumulative {
                return Some((r, c));
            }
        }
    }
    last_positive
}

/// Pick the scripted opponent's next shot at `target`.
///
/// Never returns a cell that was already fired upon. Returns `None` only
/// when the whole grid has been fired at.
pub fn choose_target<R: Rng + ?Sized>(
    target: &Grid,
    remaining_lengths: &[usize],
    rng: &mut R,
) -> Option<(usize, usize)> {
    let pdf = calc_pdf(target, remaining_lengths);
    if let Some((r, c)) = sample_pdf(&pdf, TEMPERATURE, rng) {
        if !target.is_fired_at(r, c) {
            return Some((r, c));
        }
    }
    // no usable density left: any untouched cell will do
    let open: Vec<(usize, usize)> = (0..GRID_SIZE)
        .flat_map(|r| (0..GRID_SIZE).map(move |c| (r, c)))
        .filter(|&(r, c)| !target.is_fired_at(r, c))
        .collect();
    if open.is_empty() {
        return None;
    }
    Some(open[rng.random_range(0..open.len())])
}
