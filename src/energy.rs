// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calculate the energy of an image
//!
//! Every pixel is reduced to three gradient samples by an
//! [`EnergyReader`], each sample is compared with the pixel's
//! neighbours to the left and right and above and below, and an
//! [`EnergyFunction`] folds the differences into one number.  Samples
//! are scaled to `[0, 1]` before anything else happens, so an 8-bit
//! buffer and a 16-bit buffer holding the same picture produce the same
//! energies.  A bias weight, if there is one, is added on top.
//!
//! Removing a seam only changes the neighbourhood of the pixels next
//! to it, so after a removal the map can either be recomputed whole or
//! patched along the seam; see [`EnergyUpdate`].

use crate::bias::{self, BiasField, BiasLookup};
use crate::error::{Error, Result};
use crate::pixelbuffer::{Channel, PixelBuffer};
use crate::twodmap::TwoDimensionalMap;
use image::Rgba;
#[cfg(not(feature = "threaded"))]
use itertools::iproduct;

/// How the per-sample gradients of a pixel become its energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyFunction {
    /// Root mean square of the horizontal and vertical gradients.
    GradientNorm,
    /// Mean of the absolute horizontal and vertical gradients.
    SumAbsolute,
    /// Mean of the absolute horizontal gradient only.
    #[default]
    Absolute,
}

/// What a pixel's gradient samples are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyReader {
    /// The red, green and blue channels.
    #[default]
    Rgb,
    /// The mean of the three colour channels.
    Brightness,
    /// Rec. 709 luma.
    Luma,
}

/// What happens to the energy map after a seam is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyUpdate {
    /// Recompute every pixel.
    #[default]
    Full,
    /// Recompute only the pixels whose neighbourhood the seam changed.
    Incremental,
}

const SAMPLES: f64 = 3.0;

impl EnergyReader {
    fn samples<S: Channel>(self, pixel: Rgba<S>) -> [f64; 3] {
        let Rgba([r, g, b, a]) = pixel;
        let alpha = a.to_unit();
        let (r, g, b) = (r.to_unit() * alpha, g.to_unit() * alpha, b.to_unit() * alpha);
        match self {
            EnergyReader::Rgb => [r, g, b],
            EnergyReader::Brightness => [(r + g + b) / 3.0; 3],
            EnergyReader::Luma => [0.2126 * r + 0.7152 * g + 0.0722 * b; 3],
        }
    }
}

impl EnergyFunction {
    fn combine(self, horizontal: [f64; 3], vertical: [f64; 3]) -> f64 {
        let pairs = horizontal.iter().zip(vertical.iter());
        match self {
            EnergyFunction::GradientNorm => {
                (pairs.map(|(h, v)| h * h + v * v).sum::<f64>() / SAMPLES).sqrt()
            }
            EnergyFunction::SumAbsolute => {
                pairs.map(|(h, v)| h + v).sum::<f64>() / (2.0 * SAMPLES)
            }
            EnergyFunction::Absolute => horizontal.iter().sum::<f64>() / SAMPLES,
        }
    }
}

// Mean absolute difference between a pixel's samples and those of the
// neighbours that exist.  A pixel with no neighbour on an axis has no
// gradient along it.
fn mean_difference(here: [f64; 3], neighbours: [Option<[f64; 3]>; 2]) -> [f64; 3] {
    let mut sum = [0.0; 3];
    let mut count = 0.0;
    for there in neighbours.iter().flatten() {
        for (s, (a, b)) in sum.iter_mut().zip(here.iter().zip(there.iter())) {
            *s += (a - b).abs();
        }
        count += 1.0;
    }
    if count > 0.0 {
        sum.map(|s| s / count)
    } else {
        sum
    }
}

/// The gradient part of the energy: which samples and how to fold them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Gradient {
    pub function: EnergyFunction,
    pub reader: EnergyReader,
}

impl Gradient {
    pub fn new(function: EnergyFunction, reader: EnergyReader) -> Self {
        Gradient { function, reader }
    }

    fn at<S: Channel>(&self, pixels: &TwoDimensionalMap<Rgba<S>>, x: u32, y: u32) -> f64 {
        let (width, height) = pixels.dimensions();
        let read = |x: u32, y: u32| self.reader.samples(pixels[(x, y)]);
        let here = read(x, y);
        let horizontal = mean_difference(
            here,
            [
                (x > 0).then(|| read(x - 1, y)),
                (x + 1 < width).then(|| read(x + 1, y)),
            ],
        );
        let vertical = mean_difference(
            here,
            [
                (y > 0).then(|| read(x, y - 1)),
                (y + 1 < height).then(|| read(x, y + 1)),
            ],
        );
        self.function.combine(horizontal, vertical)
    }
}

#[inline]
fn energy_at<S: Channel>(
    pixels: &TwoDimensionalMap<Rgba<S>>,
    gradient: Gradient,
    bias: Option<BiasLookup<'_>>,
    x: u32,
    y: u32,
) -> f64 {
    gradient.at(pixels, x, y) + bias.map_or(0.0, |b| b.at(x, y))
}

// Image -> Energy Map

/// Compute the energy of every pixel of a working layer.
#[cfg(not(feature = "threaded"))]
pub(crate) fn compute<S: Channel>(
    pixels: &TwoDimensionalMap<Rgba<S>>,
    gradient: Gradient,
    bias: Option<BiasLookup<'_>>,
) -> TwoDimensionalMap<f64> {
    let (width, height) = pixels.dimensions();
    let mut energies = TwoDimensionalMap::new(width, height);
    for (y, x) in iproduct!(0..height, 0..width) {
        energies[(x, y)] = energy_at(pixels, gradient, bias, x, y);
    }
    energies
}

// Every pixel only reads the pixel layer, so the rows can be split
// into bands and each band written by its own thread.

/// Compute the energy of every pixel of a working layer.
#[cfg(feature = "threaded")]
pub(crate) fn compute<S: Channel>(
    pixels: &TwoDimensionalMap<Rgba<S>>,
    gradient: Gradient,
    bias: Option<BiasLookup<'_>>,
) -> TwoDimensionalMap<f64> {
    let (width, height) = pixels.dimensions();
    let mut energies = TwoDimensionalMap::new(width, height);
    if energies.is_empty() {
        return energies;
    }
    let row = width as usize;
    let bands = num_cpus::get().max(1);
    let rows_per_band = (height as usize + bands - 1) / bands;
    let outcome = crossbeam::scope(|scope| {
        for (band, chunk) in energies
            .as_mut_slice()
            .chunks_mut(rows_per_band * row)
            .enumerate()
        {
            scope.spawn(move |_| {
                let first = band * rows_per_band * row;
                for (offset, cell) in chunk.iter_mut().enumerate() {
                    let index = first + offset;
                    let (x, y) = ((index % row) as u32, (index / row) as u32);
                    *cell = energy_at(pixels, gradient, bias, x, y);
                }
            });
        }
    });
    if let Err(panic) = outcome {
        std::panic::resume_unwind(panic);
    }
    energies
}

/// Patch an energy map after `seam` was removed from it and from
/// `pixels`.  In row `y` only the columns between the seam's leftmost
/// and rightmost position in rows `y - 1 ..= y + 1`, plus one to the
/// left, can have seen their neighbourhood change.
pub(crate) fn update_after_removal<S: Channel>(
    energies: &mut TwoDimensionalMap<f64>,
    pixels: &TwoDimensionalMap<Rgba<S>>,
    seam: &[u32],
    gradient: Gradient,
    bias: Option<BiasLookup<'_>>,
) {
    let width = pixels.width();
    if width == 0 || seam.is_empty() {
        return;
    }
    let last = seam.len() - 1;
    for (y, &cut) in seam.iter().enumerate() {
        let above = seam[y.saturating_sub(1)];
        let below = seam[(y + 1).min(last)];
        let low = cut.min(above).min(below).saturating_sub(1);
        let high = cut.max(above).max(below).min(width - 1);
        let y = y as u32;
        for x in low..=high {
            energies[(x, y)] = energy_at(pixels, gradient, bias, x, y);
        }
    }
}

/// The energy of every pixel of an image.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyMap {
    energies: TwoDimensionalMap<f64>,
}

impl EnergyMap {
    /// Compute the energy map of a buffer, with an optional bias field
    /// over the same pixels.
    pub fn compute<S: Channel>(
        buffer: &PixelBuffer<S>,
        function: EnergyFunction,
        reader: EnergyReader,
        bias: Option<&dyn BiasField>,
    ) -> Result<Self> {
        let weights = bias::materialize(buffer, bias, false)?;
        let (width, height) = buffer.dimensions();
        let origin = bias::identity_origin(width, height);
        let lookup = weights.as_ref().map(|w| BiasLookup::new(w, &origin));
        Ok(EnergyMap {
            energies: compute(buffer.as_map(), Gradient::new(function, reader), lookup),
        })
    }

    /// Wrap precomputed energies, row by row.
    pub fn from_values(width: u32, height: u32, values: Vec<f64>) -> Result<Self> {
        Ok(EnergyMap {
            energies: TwoDimensionalMap::from_raw(width, height, values)?,
        })
    }

    pub fn get(&self, x: u32, y: u32) -> Result<f64, Error> {
        self.energies.get(x, y)
    }

    pub fn width(&self) -> u32 {
        self.energies.width()
    }

    pub fn height(&self) -> u32 {
        self.energies.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.energies.dimensions()
    }

    pub fn as_slice(&self) -> &[f64] {
        self.energies.as_slice()
    }

    pub(crate) fn as_map(&self) -> &TwoDimensionalMap<f64> {
        &self.energies
    }
}
