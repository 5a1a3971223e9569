// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The resize entry point.

use crate::bias::{self, BiasField};
use crate::config::{check_target, ResizeConfiguration};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::pixelbuffer::{Channel, PixelBuffer};
use crate::seamcarver::SeamCarver;
use log::{debug, info};

/// How a resize ended.  A cancelled resize is not an error; it carries
/// the buffer as it stood when the cancellation was noticed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<S: Channel> {
    Complete(PixelBuffer<S>),
    Cancelled(PixelBuffer<S>),
}

impl<S: Channel> Outcome<S> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled(_))
    }

    pub fn buffer(&self) -> &PixelBuffer<S> {
        match self {
            Outcome::Complete(buffer) | Outcome::Cancelled(buffer) => buffer,
        }
    }

    pub fn into_buffer(self) -> PixelBuffer<S> {
        match self {
            Outcome::Complete(buffer) | Outcome::Cancelled(buffer) => buffer,
        }
    }
}

/// Resize `source` to `target_width` by `target_height` pixels by
/// removing and duplicating seams.
///
/// `bias` weights are read in the coordinates of `source`, whatever the
/// carver has removed or inserted in the meantime.  The configuration,
/// the target and the bias are all checked before any pixel is touched.
/// Resizing to the size the source already has returns a copy of it.
///
/// ```
/// use liquidseam::{resize, Context, PixelBuffer, ResizeConfiguration, Rgba};
///
/// let source = PixelBuffer::<u8>::filled(10, 10, Rgba([90, 90, 90, 255]));
/// let outcome = resize(&source, 8, 12, &ResizeConfiguration::default(), None, &Context::new())?;
/// assert_eq!(outcome.buffer().dimensions(), (8, 12));
/// # Ok::<(), liquidseam::Error>(())
/// ```
pub fn resize<S: Channel>(
    source: &PixelBuffer<S>,
    target_width: u32,
    target_height: u32,
    config: &ResizeConfiguration,
    bias: Option<&dyn BiasField>,
    context: &Context<'_>,
) -> Result<Outcome<S>> {
    config.validate()?;
    check_target(target_width, target_height)?;
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::EmptySource { width, height });
    }
    let weights = bias::materialize(source, bias, config.preserve_skin_tones)?;

    if context.is_cancelled() {
        info!("resize cancelled before it started");
        return Ok(Outcome::Cancelled(source.clone()));
    }
    if (target_width, target_height) == (width, height) {
        debug!("{}x{} is already the requested size", width, height);
        return Ok(Outcome::Complete(source.clone()));
    }

    let carver = SeamCarver::new(source, weights.as_ref(), config, context);
    Ok(carver.carve(target_width, target_height))
}
