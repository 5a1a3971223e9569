// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors raised by the carver.
//!
//! Cancellation is deliberately absent: a cancelled run is a normal
//! outcome and is reported through [`crate::Outcome`].

/// A configuration the carver refuses to start with.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Both target dimensions must be at least one pixel.
    #[error("target size {width}x{height} must be at least 1x1")]
    ZeroTarget { width: u32, height: u32 },
    /// The maximum transversal seam step must be at least one.
    #[error("seam step must be at least 1, got {0}")]
    InvalidStep(u32),
    /// Rigidity must be finite and non-negative.
    #[error("rigidity must be a finite, non-negative number, got {0}")]
    InvalidRigidity(f32),
    /// The side switch frequency must be at least one seam.
    #[error("side switch frequency must be at least 1, got {0}")]
    InvalidSideSwitch(u32),
    /// A single enlargement pass may grow an axis by at most 2x.
    #[error("enlargement step must lie in (1, 2], got {0}")]
    InvalidEnlargementStep(f32),
    /// A dense bias field must cover exactly the source image.
    #[error("bias field is {}x{} but the source image is {}x{}", .actual.0, .actual.1, .expected.0, .expected.1)]
    BiasDimensions {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// An error arising from this crate
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The resize was asked for with an unusable configuration.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
    /// A coordinate fell outside a buffer.
    #[error("coordinate ({x}, {y}) is outside a {width}x{height} buffer")]
    Bounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    /// The source image has no pixels to carve.
    #[error("source image is empty ({width}x{height})")]
    EmptySource { width: u32, height: u32 },
    /// A raw sample vector did not match the dimensions it came with.
    #[error("buffer holds {actual} values but its dimensions need {expected}")]
    BufferSize { expected: usize, actual: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
