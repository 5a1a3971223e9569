// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Energy grid dimensional flipper
//!
//! A read-only proxy over an energy grid that maps the width to the
//! original height, and vice versa, as well as every x to y and vice
//! versa.  Searching the flipped grid for a vertical seam finds the
//! horizontal seam of the original, so only one dynamic programme has
//! to exist.

use crate::seamfinder::EnergyGrid;

pub struct Flipper<'a, G: EnergyGrid + ?Sized> {
    pub grid: &'a G,
}

impl<'a, G: EnergyGrid + ?Sized> EnergyGrid for Flipper<'a, G> {
    fn dimensions(&self) -> (u32, u32) {
        let (x, y) = self.grid.dimensions();
        (y, x)
    }

    fn energy(&self, x: u32, y: u32) -> f64 {
        self.grid.energy(y, x)
    }
}
