// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Find the cheapest seam through an energy grid
//!
//! A seam is stored as one coordinate per step along it: the column of
//! every row for a vertical seam, the row of every column for a
//! horizontal one.

use crate::energy::EnergyMap;
use crate::flipper::Flipper;
use crate::twodmap::{EnergyAndBackPointer, TwoDimensionalMap};

/// This trait defines how we will return seams from an image.  It's a
/// primitive interface, just enough to make room for multiple seam
/// finders.
pub trait SeamFinder {
    /// Request a horizontal seam: for every column, the row it passes.
    fn find_horizontal_seam(&self) -> Vec<u32>;

    /// Request a vertical seam: for every row, the column it passes.
    fn find_vertical_seam(&self) -> Vec<u32>;
}

/// Anything a seam can be searched through.
pub trait EnergyGrid {
    fn dimensions(&self) -> (u32, u32);
    fn energy(&self, x: u32, y: u32) -> f64;
}

impl EnergyGrid for TwoDimensionalMap<f64> {
    fn dimensions(&self) -> (u32, u32) {
        TwoDimensionalMap::dimensions(self)
    }

    fn energy(&self, x: u32, y: u32) -> f64 {
        self[(x, y)]
    }
}

impl EnergyGrid for EnergyMap {
    fn dimensions(&self) -> (u32, u32) {
        EnergyMap::dimensions(self)
    }

    fn energy(&self, x: u32, y: u32) -> f64 {
        self.as_map()[(x, y)]
    }
}

/// A seam and what it costs, curvature penalties included.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Seam {
    pub path: Vec<u32>,
    pub cost: f64,
}

/// The dynamic-programming seam finder.
///
/// A seam may move at most `step` columns between consecutive rows.
/// Every lateral move of `d` columns costs `rigidity * d^1.5 / length`
/// on top of the energies passed through, `length` being the number
/// of rows, so the total penalty of a seam does not depend on the size
/// of the image.
///
/// Among predecessors of equal cost the straightest wins, and among
/// equally straight ones the leftmost; among seams of equal cost the
/// one ending leftmost wins.  The same grid always yields the same
/// seam.
pub struct SeamSearch<'a, G: EnergyGrid + ?Sized> {
    grid: &'a G,
    step: u32,
    rigidity: f64,
}

impl<'a, G: EnergyGrid + ?Sized> SeamSearch<'a, G> {
    pub fn new(grid: &'a G, step: u32, rigidity: f64) -> Self {
        SeamSearch {
            grid,
            step: step.max(1),
            rigidity,
        }
    }

    pub(crate) fn vertical(&self) -> Seam {
        cheapest_vertical_seam(self.grid, self.step, self.rigidity)
    }

    pub(crate) fn horizontal(&self) -> Seam {
        cheapest_vertical_seam(&Flipper { grid: self.grid }, self.step, self.rigidity)
    }
}

impl<'a, G: EnergyGrid + ?Sized> SeamFinder for SeamSearch<'a, G> {
    fn find_horizontal_seam(&self) -> Vec<u32> {
        self.horizontal().path
    }

    fn find_vertical_seam(&self) -> Vec<u32> {
        self.vertical().path
    }
}

// Lateral offsets in the order they are tried: straight down first,
// then one to the left, one to the right, two to the left, and so on.
fn offsets(step: u32) -> impl Iterator<Item = i64> {
    std::iter::once(0).chain((1..=i64::from(step)).flat_map(|d| [-d, d]))
}

/// Given an energy grid, return the list of x-coordinates that, when
/// mapped with the range (0..height), give the XY coordinates for each
/// pixel in the cheapest seam.
fn cheapest_vertical_seam<G: EnergyGrid + ?Sized>(grid: &G, step: u32, rigidity: f64) -> Seam {
    let (width, height) = grid.dimensions();
    if width == 0 || height == 0 {
        return Seam {
            path: Vec::new(),
            cost: 0.0,
        };
    }
    // No seam can move further sideways than the grid is wide.
    let step = step.min(width.saturating_sub(1)).max(1);
    let penalties: Vec<f64> = (0..=step)
        .map(|d| rigidity * f64::from(d).powf(1.5) / f64::from(height))
        .collect();

    let mut target: TwoDimensionalMap<EnergyAndBackPointer<f64>> =
        TwoDimensionalMap::new(width, height);

    // Populate the first row with their native energies.
    for x in 0..width {
        target[(x, 0)].energy = grid.energy(x, 0);
    }

    // For every subsequent row, populate the target cell with the sum
    // of the *cheapest reachable upper cost* and the *x coordinate of
    // that cost*
    for y in 1..height {
        for x in 0..width {
            let mut best = EnergyAndBackPointer {
                energy: f64::INFINITY,
                parent: x,
            };
            for dx in offsets(step) {
                let px = i64::from(x) + dx;
                if px < 0 || px >= i64::from(width) {
                    continue;
                }
                let px = px as u32;
                let cost = target[(px, y - 1)].energy + penalties[dx.unsigned_abs() as usize];
                if cost < best.energy {
                    best = EnergyAndBackPointer {
                        energy: cost,
                        parent: px,
                    };
                }
            }
            target[(x, y)] = EnergyAndBackPointer {
                energy: grid.energy(x, y) + best.energy,
                parent: best.parent,
            };
        }
    }

    // Find the x coordinate of the bottommost seam with the least
    // cost; the leftmost of equals.
    let last = height - 1;
    let mut seam_col = (1..width).fold(0, |best, x| {
        if target[(x, last)].energy < target[(best, last)].energy {
            x
        } else {
            best
        }
    });
    let cost = target[(seam_col, last)].energy;

    // Working backwards, generate a vec of x coordinates that map to
    // the seam, reverse and return.
    let path = (0..height)
        .rev()
        .fold(Vec::<u32>::with_capacity(height as usize), |mut acc, y| {
            acc.push(seam_col);
            seam_col = target[(seam_col, y)].parent;
            acc
        })
        .into_iter()
        .rev()
        .collect();
    Seam { path, cost }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bias::PROTECT_BIAS;

    const ENERGY_DATA: [f64; 20] = [
        9.0, 9.0, 0.0, 9.0, 9.0, 9.0, 1.0, 9.0, 8.0, 9.0, 9.0, 9.0, 9.0, 9.0, 0.0, 9.0, 9.0, 9.0,
        0.0, 9.0,
    ];

    fn energies() -> EnergyMap {
        EnergyMap::from_values(5, 4, ENERGY_DATA.to_vec()).unwrap()
    }

    #[test]
    fn energy_grid_to_vertical_seam() {
        let grid = energies();
        let search = SeamSearch::new(&grid, 1, 0.0);
        assert_eq!(search.find_vertical_seam(), [2, 3, 4, 3]);
        assert_eq!(search.vertical().cost, 8.0);
    }

    #[test]
    fn energy_grid_to_horizontal_seam() {
        let grid = energies();
        let search = SeamSearch::new(&grid, 1, 0.0);
        assert_eq!(search.find_horizontal_seam(), [1, 1, 0, 1, 2]);
        assert_eq!(search.horizontal().cost, 18.0);
    }

    #[test]
    fn flat_grids_yield_the_leftmost_straight_seam() {
        let grid = TwoDimensionalMap::<f64>::new(6, 5);
        let search = SeamSearch::new(&grid, 3, 0.5);
        assert_eq!(search.find_vertical_seam(), [0; 5]);
        assert_eq!(search.find_horizontal_seam(), [0; 6]);
    }

    #[test]
    fn equal_predecessors_prefer_straight_then_left() {
        let grid = TwoDimensionalMap::from_raw(3, 2, vec![0.0, 0.0, 0.0, 9.0, 0.0, 9.0]).unwrap();
        assert_eq!(SeamSearch::new(&grid, 1, 0.0).find_vertical_seam(), [1, 1]);
        let grid = TwoDimensionalMap::from_raw(3, 2, vec![0.0, 5.0, 0.0, 9.0, 0.0, 9.0]).unwrap();
        assert_eq!(SeamSearch::new(&grid, 1, 0.0).find_vertical_seam(), [0, 1]);
    }

    #[test]
    fn rigidity_straightens_seams() {
        let grid = TwoDimensionalMap::from_raw(3, 2, vec![0.0, 9.0, 1.0, 9.0, 9.0, 0.0]).unwrap();
        let loose = SeamSearch::new(&grid, 2, 0.0);
        assert_eq!(loose.find_vertical_seam(), [0, 2]);
        let rigid = SeamSearch::new(&grid, 2, 1.0);
        assert_eq!(rigid.find_vertical_seam(), [2, 2]);
        assert_eq!(rigid.vertical().cost, 1.0);
    }

    #[test]
    fn seams_never_jump_further_than_the_step() {
        let mut state = 7u32;
        let grid = TwoDimensionalMap::from_fn(17, 11, |_, _| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            f64::from(state >> 16 & 0xff)
        });
        for step in 1..=4 {
            let search = SeamSearch::new(&grid, step, 0.25);
            let seam = search.find_vertical_seam();
            assert_eq!(seam.len(), 11);
            assert!(seam.iter().all(|&x| x < 17));
            assert!(seam.windows(2).all(|w| w[0].abs_diff(w[1]) <= step));
            let seam = search.find_horizontal_seam();
            assert_eq!(seam.len(), 17);
            assert!(seam.iter().all(|&y| y < 11));
            assert!(seam.windows(2).all(|w| w[0].abs_diff(w[1]) <= step));
        }
    }

    #[test]
    fn steps_wider_than_the_grid_reach_every_column() {
        let mut state = 11u32;
        let grid = TwoDimensionalMap::from_fn(6, 9, |_, _| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            f64::from(state >> 16 & 0xff)
        });
        let widest = SeamSearch::new(&grid, 5, 0.5).vertical();
        for step in [6, 1_000_000, u32::MAX] {
            let seam = SeamSearch::new(&grid, step, 0.5).vertical();
            assert_eq!(seam.path, widest.path);
            assert_eq!(seam.cost, widest.cost);
        }
        let flat = TwoDimensionalMap::<f64>::new(1, 3);
        assert_eq!(SeamSearch::new(&flat, u32::MAX, 1.0).find_vertical_seam(), [0; 3]);
    }

    #[test]
    fn protected_cells_are_avoided() {
        let mut grid = TwoDimensionalMap::<f64>::new(5, 5);
        for y in 0..5 {
            grid[(0, y)] = 1.0;
        }
        grid[(1, 2)] = PROTECT_BIAS;
        let seam = SeamSearch::new(&grid, 1, 0.0).find_vertical_seam();
        assert_ne!(seam[2], 1);
        assert_eq!(seam, [2, 2, 2, 1, 1]);
    }
}
