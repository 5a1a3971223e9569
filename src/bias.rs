// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bias fields
//!
//! A bias field adds a weight to the energy of individual pixels,
//! addressed in the coordinates of the *original* image.  Large
//! positive weights keep seams away from a pixel, large negative ones
//! pull seams through it.  The field never shrinks or grows with the
//! image; the carver keeps a map from every working pixel back to the
//! original pixel it came from and looks weights up through it.

use crate::error::ConfigError;
use crate::pixelbuffer::{Channel, PixelBuffer};
use crate::twodmap::TwoDimensionalMap;
use image::Rgba;
use std::collections::HashMap;

/// Weight that keeps seams away from a pixel.  It dwarfs any gradient
/// energy, so a protected pixel is only crossed when every seam would
/// have to cross one.
pub const PROTECT_BIAS: f64 = 1_000_000.0;

/// Weight that attracts seams to a pixel.
pub const REMOVE_BIAS: f64 = -1_000_000.0;

/// A per-pixel energy weight in original-image coordinates.
pub trait BiasField {
    /// The weight at `(x, y)`; zero where nothing was painted.
    fn bias_at(&self, x: u32, y: u32) -> f64;

    /// The size of the image the field was painted for, if it has one.
    fn dimensions(&self) -> Option<(u32, u32)> {
        None
    }
}

/// A weight for every pixel of an image.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseBias {
    weights: TwoDimensionalMap<f64>,
}

impl DenseBias {
    pub fn new(width: u32, height: u32) -> Self {
        DenseBias {
            weights: TwoDimensionalMap::new(width, height),
        }
    }

    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: FnMut(u32, u32) -> f64,
    {
        DenseBias {
            weights: TwoDimensionalMap::from_fn(width, height, f),
        }
    }

    /// Convert a painted weight mask.  Opaque pure green marks pixels
    /// to preserve, opaque pure red marks pixels to remove; every other
    /// mask pixel leaves the energy alone.
    pub fn from_mask<S: Channel>(mask: &PixelBuffer<S>) -> Self {
        let (width, height) = mask.dimensions();
        let full = S::max_value();
        let none = S::min_value();
        let map = mask.as_map();
        DenseBias::from_fn(width, height, |x, y| {
            let Rgba([r, g, _, a]) = map[(x, y)];
            if a == none {
                0.0
            } else if r == full && g == none {
                REMOVE_BIAS
            } else if g == full && r == none {
                PROTECT_BIAS
            } else {
                0.0
            }
        })
    }

    /// Add `weight` to the pixel at `(x, y)`.  Writes outside the field
    /// are ignored, the way a brush stroke off the canvas is.
    pub fn paint(&mut self, x: u32, y: u32, weight: f64) {
        if let Ok(current) = self.weights.get(x, y) {
            self.weights[(x, y)] = current + weight;
        }
    }
}

impl BiasField for DenseBias {
    fn bias_at(&self, x: u32, y: u32) -> f64 {
        self.weights.get(x, y).unwrap_or(0.0)
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        Some(self.weights.dimensions())
    }
}

/// Weights for a handful of pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseBias {
    weights: HashMap<(u32, u32), f64>,
}

impl SparseBias {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` to the pixel at `(x, y)`.
    pub fn paint(&mut self, x: u32, y: u32, weight: f64) {
        *self.weights.entry((x, y)).or_insert(0.0) += weight;
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl BiasField for SparseBias {
    fn bias_at(&self, x: u32, y: u32) -> f64 {
        self.weights.get(&(x, y)).copied().unwrap_or(0.0)
    }
}

// Gomez & Morales' RGB-ratio skin classifier, evaluated on channel
// values scaled to [0, 1] so that 8-bit and 16-bit buffers agree.
// The thresholds are empirical.

/// Whether a pixel's colour is close to a skin tone.
pub fn is_skin_tone<S: Channel>(pixel: Rgba<S>) -> bool {
    let Rgba([r, g, b, _]) = pixel;
    let (r, g, b) = (r.to_unit(), g.to_unit(), b.to_unit());
    let s = r + g + b;
    if r == 0.0 || g == 0.0 || s == 0.0 {
        return false;
    }
    b / g < 1.249 && s / (3.0 * r) > 0.696 && 1.0 / 3.0 - b / s > 0.014 && g / (3.0 * s) < 0.108
}

/// Flatten the caller's field and the skin tone weights into one dense
/// map over the source image.  `None` when no pixel carries a weight
/// source at all.
pub(crate) fn materialize<S: Channel>(
    source: &PixelBuffer<S>,
    field: Option<&dyn BiasField>,
    skin_tones: bool,
) -> Result<Option<TwoDimensionalMap<f64>>, ConfigError> {
    let expected = source.dimensions();
    if let Some(actual) = field.and_then(|f| f.dimensions()) {
        if actual != expected {
            return Err(ConfigError::BiasDimensions { expected, actual });
        }
    }
    if field.is_none() && !skin_tones {
        return Ok(None);
    }
    let pixels = source.as_map();
    let (width, height) = expected;
    Ok(Some(TwoDimensionalMap::from_fn(width, height, |x, y| {
        let painted = field.map_or(0.0, |f| f.bias_at(x, y));
        let skin = if skin_tones && is_skin_tone(pixels[(x, y)]) {
            PROTECT_BIAS
        } else {
            0.0
        };
        painted + skin
    })))
}

/// Looks up original-space weights for working-space pixels.
#[derive(Clone, Copy)]
pub(crate) struct BiasLookup<'a> {
    weights: &'a TwoDimensionalMap<f64>,
    origin: &'a TwoDimensionalMap<usize>,
}

impl<'a> BiasLookup<'a> {
    pub fn new(weights: &'a TwoDimensionalMap<f64>, origin: &'a TwoDimensionalMap<usize>) -> Self {
        BiasLookup { weights, origin }
    }

    pub fn at(&self, x: u32, y: u32) -> f64 {
        self.weights.at(self.origin[(x, y)])
    }
}

/// The original-index map of an image nothing has been carved from.
pub(crate) fn identity_origin(width: u32, height: u32) -> TwoDimensionalMap<usize> {
    TwoDimensionalMap::from_fn(width, height, |x, y| {
        y as usize * width as usize + x as usize
    })
}
