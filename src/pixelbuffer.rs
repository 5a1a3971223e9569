// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The pixel store being carved.
//!
//! A [`PixelBuffer`] owns a row-major grid of RGBA pixels.  The sample
//! depth is a type parameter, so a buffer is 8-bit or 16-bit for its
//! whole life and no pixel can ever disagree with its neighbours.

use crate::error::{Error, Result};
use crate::twodmap::TwoDimensionalMap;
use image::{ImageBuffer, Pixel, Primitive, Rgba};
use std::fmt::Debug;

mod imp {
    pub trait ChannelSealed {}

    impl ChannelSealed for u8 {}
    impl ChannelSealed for u16 {}
}

/// Bits per channel of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    Eight,
    Sixteen,
}

impl ColorDepth {
    pub fn bits(self) -> u32 {
        match self {
            ColorDepth::Eight => 8,
            ColorDepth::Sixteen => 16,
        }
    }

    /// The value of a fully saturated channel.
    pub fn max_value(self) -> f64 {
        match self {
            ColorDepth::Eight => f64::from(u8::MAX),
            ColorDepth::Sixteen => f64::from(u16::MAX),
        }
    }
}

/// A channel type the carver can work with: `u8` or `u16`.
pub trait Channel: Primitive + Debug + Send + Sync + 'static + imp::ChannelSealed {
    const DEPTH: ColorDepth;

    /// The channel value scaled to `[0, 1]`.
    fn to_unit(self) -> f64 {
        self.to_f64()
            .map_or(0.0, |v| v / Self::DEPTH.max_value())
    }

    /// The rounded-down mean of two channel values.
    fn midpoint(self, other: Self) -> Self {
        let sum = self.to_u32().unwrap_or(0) + other.to_u32().unwrap_or(0);
        num_traits::cast(sum / 2).unwrap_or(self)
    }
}

impl Channel for u8 {
    const DEPTH: ColorDepth = ColorDepth::Eight;
}

impl Channel for u16 {
    const DEPTH: ColorDepth = ColorDepth::Sixteen;
}

/// Blend two pixels channel by channel; this is what a duplicated
/// seam is filled with.
pub(crate) fn blend<S: Channel>(a: Rgba<S>, b: Rgba<S>) -> Rgba<S> {
    Rgba([
        a.0[0].midpoint(b.0[0]),
        a.0[1].midpoint(b.0[1]),
        a.0[2].midpoint(b.0[2]),
        a.0[3].midpoint(b.0[3]),
    ])
}

/// A mutable, owned grid of RGBA pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer<S: Channel> {
    pixels: TwoDimensionalMap<Rgba<S>>,
}

impl<S: Channel> PixelBuffer<S> {
    /// A buffer of transparent black pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba([S::zero(); 4]))
    }

    /// A buffer with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, pixel: Rgba<S>) -> Self {
        PixelBuffer {
            pixels: TwoDimensionalMap::filled(width, height, pixel),
        }
    }

    /// A buffer whose pixels are produced by `f(x, y)`.
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: FnMut(u32, u32) -> Rgba<S>,
    {
        PixelBuffer {
            pixels: TwoDimensionalMap::from_fn(width, height, f),
        }
    }

    /// Wrap interleaved RGBA samples, four per pixel, row by row.
    pub fn from_raw(width: u32, height: u32, samples: Vec<S>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if samples.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: samples.len(),
            });
        }
        let pixels = samples
            .chunks_exact(4)
            .map(|c| Rgba([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(PixelBuffer {
            pixels: TwoDimensionalMap::from_raw(width, height, pixels)?,
        })
    }

    pub(crate) fn from_map(pixels: TwoDimensionalMap<Rgba<S>>) -> Self {
        PixelBuffer { pixels }
    }

    pub(crate) fn as_map(&self) -> &TwoDimensionalMap<Rgba<S>> {
        &self.pixels
    }

    /// The pixel at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Result<Rgba<S>> {
        self.pixels.get(x, y)
    }

    /// Replace the pixel at `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, pixel: Rgba<S>) -> Result<()> {
        self.pixels.set(x, y, pixel)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn depth(&self) -> ColorDepth {
        S::DEPTH
    }

    /// Row `y` as a slice of pixels.
    pub fn row(&self, y: u32) -> Result<&[Rgba<S>]> {
        if y < self.height() {
            Ok(self.pixels.row(y))
        } else {
            Err(Error::Bounds {
                x: 0,
                y,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    /// Column `x`, top to bottom.
    pub fn column(&self, x: u32) -> Result<Vec<Rgba<S>>> {
        (0..self.height()).map(|y| self.get(x, y)).collect()
    }

    /// Interleaved RGBA samples, row by row.
    pub fn into_raw(self) -> Vec<S> {
        self.pixels
            .into_raw()
            .into_iter()
            .flat_map(|p| p.0)
            .collect()
    }

    pub fn to_image(&self) -> ImageBuffer<Rgba<S>, Vec<S>>
    where
        Rgba<S>: Pixel<Subpixel = S>,
    {
        ImageBuffer::from_fn(self.width(), self.height(), |x, y| self.pixels[(x, y)])
    }
}

impl<S: Channel> From<ImageBuffer<Rgba<S>, Vec<S>>> for PixelBuffer<S>
where
    Rgba<S>: Pixel<Subpixel = S>,
{
    fn from(image: ImageBuffer<Rgba<S>, Vec<S>>) -> Self {
        let (width, height) = image.dimensions();
        PixelBuffer::from_fn(width, height, |x, y| *image.get_pixel(x, y))
    }
}

impl<S: Channel> From<PixelBuffer<S>> for ImageBuffer<Rgba<S>, Vec<S>>
where
    Rgba<S>: Pixel<Subpixel = S>,
{
    fn from(buffer: PixelBuffer<S>) -> Self {
        buffer.to_image()
    }
}
