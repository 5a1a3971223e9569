// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Two-dimensional maps
//!
//! Every layer the carver works on (the pixels, the energies, the map
//! from current to original coordinates, the cumulative cost table)
//! is a row-major grid of some copyable value.  Removing a vertical
//! seam compacts each row in place; horizontal seams are handled by
//! transposing the whole grid first, so only the vertical operations
//! have to be written (and gotten right) once.

use crate::error::{Error, Result};
use std::ops::{Index, IndexMut};

/// An addressable two-dimensional field of values.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoDimensionalMap<P: Copy> {
    width: u32,
    height: u32,
    data: Vec<P>,
}

impl<P: Copy + Default> TwoDimensionalMap<P> {
    /// Define a new map with every cell at its default value.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, P::default())
    }
}

impl<P: Copy> TwoDimensionalMap<P> {
    /// Define a new map with every cell set to `value`.
    pub fn filled(width: u32, height: u32, value: P) -> Self {
        TwoDimensionalMap {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    /// Wrap an existing row-major vector.
    pub fn from_raw(width: u32, height: u32, data: Vec<P>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(TwoDimensionalMap {
            width,
            height,
            data,
        })
    }

    /// Build a map by asking for the value at every address, row by row.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> P,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        TwoDimensionalMap {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Absolutely, the number one name of this game is keep the index
    // math in a singular location and never, ever mess with it.
    fn get_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    fn check(&self, x: u32, y: u32) -> Result<usize> {
        if x < self.width && y < self.height {
            Ok(self.get_index(x, y))
        } else {
            Err(Error::Bounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Get the value at a single address, or a bounds error.
    pub fn get(&self, x: u32, y: u32) -> Result<P> {
        self.check(x, y).map(|i| self.data[i])
    }

    /// Set the value at a single address, or return a bounds error.
    pub fn set(&mut self, x: u32, y: u32, value: P) -> Result<()> {
        let i = self.check(x, y)?;
        self.data[i] = value;
        Ok(())
    }

    /// The value at a row-major offset.
    pub(crate) fn at(&self, offset: usize) -> P {
        self.data[offset]
    }

    pub fn row(&self, y: u32) -> &[P] {
        let start = self.get_index(0, y);
        &self.data[start..start + self.width as usize]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [P] {
        let start = self.get_index(0, y);
        let width = self.width as usize;
        &mut self.data[start..start + width]
    }

    pub fn as_slice(&self) -> &[P] {
        &self.data
    }

    #[cfg(feature = "threaded")]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [P] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<P> {
        self.data
    }

    /// Delete one cell per row, at the column the seam names for that
    /// row, shifting the rest of the row left.  The map loses a column.
    ///
    /// The rows are compacted in place: every cell only ever moves
    /// towards the start of the vector, so a single forward pass with
    /// `copy_within` never overwrites a cell it still has to read.
    pub fn remove_vertical_seam(&mut self, seam: &[u32]) {
        debug_assert_eq!(seam.len(), self.height as usize);
        if self.width == 0 {
            return;
        }
        let width = self.width as usize;
        let mut write = 0;
        for (y, &cut) in seam.iter().enumerate() {
            let start = y * width;
            let cut = (cut as usize).min(width - 1);
            self.data.copy_within(start..start + cut, write);
            write += cut;
            self.data.copy_within(start + cut + 1..start + width, write);
            write += width - cut - 1;
        }
        self.data.truncate(write);
        self.width -= 1;
    }

    /// Build a wider map in which, for every row, a new cell is placed
    /// in front of each marked column.  The new cell's value is
    /// `blend(left, current)`, where `left` is the cell to the left of
    /// the marked one (or the marked cell itself in the first column).
    ///
    /// Every row must carry the same number of marks, sorted and
    /// without duplicates.
    pub fn insert_vertical_seams<F>(&self, marks: &[Vec<u32>], blend: F) -> Self
    where
        F: Fn(P, P) -> P,
    {
        debug_assert_eq!(marks.len(), self.height as usize);
        let added = marks.first().map_or(0, |m| m.len()) as u32;
        let width = self.width + added;
        let mut data = Vec::with_capacity(width as usize * self.height as usize);
        for (y, row_marks) in marks.iter().enumerate() {
            let row = self.row(y as u32);
            let mut pending = row_marks.iter().peekable();
            for (x, &current) in row.iter().enumerate() {
                while pending.next_if(|&&m| m as usize == x).is_some() {
                    let left = if x == 0 { current } else { row[x - 1] };
                    data.push(blend(left, current));
                }
                data.push(current);
            }
        }
        TwoDimensionalMap {
            width,
            height: self.height,
            data,
        }
    }

    /// Swap rows and columns.
    pub fn transpose(&self) -> Self {
        let (width, height) = (self.height, self.width);
        let mut data = Vec::with_capacity(self.data.len());
        for y in 0..height {
            for x in 0..width {
                data.push(self.data[self.get_index(y, x)]);
            }
        }
        TwoDimensionalMap {
            width,
            height,
            data,
        }
    }
}

impl<P: Copy> Index<(u32, u32)> for TwoDimensionalMap<P> {
    type Output = P;

    /// A convenience addressing mode for getting values.
    fn index(&self, (x, y): (u32, u32)) -> &P {
        let index = self.get_index(x, y);
        &self.data[index]
    }
}

impl<P: Copy> IndexMut<(u32, u32)> for TwoDimensionalMap<P> {
    /// A convenience addressing mode for setting values.
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut P {
        let index = self.get_index(x, y);
        &mut self.data[index]
    }
}

/// One cell of a cumulative cost table: the cheapest cost of any seam
/// reaching this cell, and the column in the previous row it came from.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub(crate) struct EnergyAndBackPointer<P: Default + Copy> {
    pub energy: P,
    pub parent: u32,
}
