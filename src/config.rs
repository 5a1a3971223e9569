// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Resize configuration

use crate::energy::{EnergyFunction, EnergyReader, EnergyUpdate};
use crate::error::ConfigError;

// Two values and a `turn()`; a bool would do, but reads worse.

/// An image dimension being carved.  Width is carved with vertical
/// seams, height with horizontal ones.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    pub fn turn(self) -> Self {
        if self == Axis::Width {
            Axis::Height
        } else {
            Axis::Width
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Axis::Width => 0,
            Axis::Height => 1,
        }
    }
}

/// Which dimension is carved first when both change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeOrder {
    /// Change the width first.
    #[default]
    HorizontalFirst,
    /// Change the height first.
    VerticalFirst,
}

impl ResizeOrder {
    pub fn first_axis(self) -> Axis {
        match self {
            ResizeOrder::HorizontalFirst => Axis::Width,
            ResizeOrder::VerticalFirst => Axis::Height,
        }
    }
}

/// How a resize is carried out.  The target size is not part of it;
/// it is passed to [`crate::resize`] alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeConfiguration {
    /// The furthest a seam may move sideways between neighbouring rows
    /// (or columns).
    pub step: u32,
    /// Strength of the penalty on sideways seam moves.
    pub rigidity: f32,
    /// Seams carved on one axis before switching to the other, while
    /// both still shrink.
    pub side_switch_frequency: u32,
    pub energy_function: EnergyFunction,
    pub reader: EnergyReader,
    pub resize_order: ResizeOrder,
    /// Protect pixels whose colour looks like skin.
    pub preserve_skin_tones: bool,
    /// The most one enlargement pass may grow an axis by, as a factor.
    /// Growing further takes several passes.
    pub enlargement_step: f32,
    pub energy_update: EnergyUpdate,
}

impl Default for ResizeConfiguration {
    fn default() -> Self {
        ResizeConfiguration {
            step: 1,
            rigidity: 0.0,
            side_switch_frequency: 4,
            energy_function: EnergyFunction::default(),
            reader: EnergyReader::default(),
            resize_order: ResizeOrder::default(),
            preserve_skin_tones: false,
            enlargement_step: 1.5,
            energy_update: EnergyUpdate::default(),
        }
    }
}

impl ResizeConfiguration {
    /// Check every field, reporting the first bad one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step == 0 {
            return Err(ConfigError::InvalidStep(self.step));
        }
        if !self.rigidity.is_finite() || self.rigidity < 0.0 {
            return Err(ConfigError::InvalidRigidity(self.rigidity));
        }
        if self.side_switch_frequency == 0 {
            return Err(ConfigError::InvalidSideSwitch(self.side_switch_frequency));
        }
        if !(self.enlargement_step > 1.0 && self.enlargement_step <= 2.0) {
            return Err(ConfigError::InvalidEnlargementStep(self.enlargement_step));
        }
        Ok(())
    }

    /// How many seams one enlargement pass may insert into an axis of
    /// `size` pixels.  Always at least one.
    pub(crate) fn enlargement_limit(&self, size: u32) -> u32 {
        let factor = f64::from(self.enlargement_step) - 1.0;
        let limit = (factor * f64::from(size)).floor() as i64 - 1;
        limit.clamp(1, i64::from(u32::MAX)) as u32
    }
}

pub(crate) fn check_target(width: u32, height: u32) -> Result<(), ConfigError> {
    if width == 0 || height == 0 {
        Err(ConfigError::ZeroTarget { width, height })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ResizeConfiguration::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.step, 1);
        assert_eq!(config.side_switch_frequency, 4);
        assert_eq!(config.energy_function, EnergyFunction::Absolute);
        assert_eq!(config.resize_order, ResizeOrder::HorizontalFirst);
    }

    #[test]
    fn bad_fields_are_named() {
        let bad = |f: fn(&mut ResizeConfiguration)| {
            let mut config = ResizeConfiguration::default();
            f(&mut config);
            config.validate().unwrap_err()
        };
        assert_eq!(bad(|c| c.step = 0), ConfigError::InvalidStep(0));
        assert_eq!(bad(|c| c.rigidity = -1.0), ConfigError::InvalidRigidity(-1.0));
        assert!(matches!(
            bad(|c| c.rigidity = f32::NAN),
            ConfigError::InvalidRigidity(_)
        ));
        assert_eq!(
            bad(|c| c.side_switch_frequency = 0),
            ConfigError::InvalidSideSwitch(0)
        );
        assert_eq!(
            bad(|c| c.enlargement_step = 1.0),
            ConfigError::InvalidEnlargementStep(1.0)
        );
        assert_eq!(
            bad(|c| c.enlargement_step = 2.5),
            ConfigError::InvalidEnlargementStep(2.5)
        );
    }

    #[test]
    fn targets_must_be_positive() {
        assert_eq!(check_target(3, 1), Ok(()));
        assert_eq!(
            check_target(3, 0),
            Err(ConfigError::ZeroTarget {
                width: 3,
                height: 0
            })
        );
    }

    #[test]
    fn enlargement_passes_are_bounded() {
        let config = ResizeConfiguration::default();
        assert_eq!(config.enlargement_limit(100), 49);
        assert_eq!(config.enlargement_limit(3), 1);
        assert_eq!(config.enlargement_limit(1), 1);
        let doubling = ResizeConfiguration {
            enlargement_step: 2.0,
            ..ResizeConfiguration::default()
        };
        assert_eq!(doubling.enlargement_limit(10), 9);
    }

    #[test]
    fn axes_turn() {
        assert_eq!(Axis::Width.turn(), Axis::Height);
        assert_eq!(Axis::Height.turn().turn(), Axis::Height);
        assert_eq!(ResizeOrder::VerticalFirst.first_axis(), Axis::Height);
    }
}
