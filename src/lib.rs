// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Content-aware image resizing.
//!
//! Seam carving shrinks an image by repeatedly removing the connected
//! path of pixels, one per row or one per column, that carries the
//! least energy, and grows it by duplicating such paths.  Flat
//! backgrounds give way while edges and detail stay put.  Bias fields
//! protect regions from being carved or single them out for removal.

pub mod bias;
pub mod config;
pub mod context;
pub mod energy;
pub mod engine;
pub mod error;
mod flipper;
pub mod pixelbuffer;
mod seamcarver;
pub mod seamfinder;
pub mod twodmap;

pub use bias::{BiasField, DenseBias, SparseBias, PROTECT_BIAS, REMOVE_BIAS};
pub use config::{Axis, ResizeConfiguration, ResizeOrder};
pub use context::{CancellationToken, Context, Progress};
pub use energy::{EnergyFunction, EnergyMap, EnergyReader, EnergyUpdate};
pub use engine::{resize, Outcome};
pub use error::{ConfigError, Error, Result};
pub use image::Rgba;
pub use pixelbuffer::{Channel, ColorDepth, PixelBuffer};
pub use seamfinder::{EnergyGrid, SeamFinder, SeamSearch};
