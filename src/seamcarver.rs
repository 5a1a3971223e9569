// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seamcarve - the carving loop
//!
//! The carver keeps three layers of the same size: the pixels, the map
//! from every pixel to the original pixel it came from, and the
//! energies.  Only vertical seams are ever removed or inserted.  When
//! the height has to change, all the layers are transposed first, so
//! that horizontal seams of the image are vertical seams of the layers;
//! the result is transposed back at the end.
//!
//! Shrinking alternates between the axes every `side_switch_frequency`
//! seams while both still have seams to lose.  Growing goes one
//! enlargement pass at a time.  Shrinking comes first, unless the axis
//! the resize order names first is the one that grows.  A pass finds
//! all of its seams on a scratch copy by removing them one after the
//! other, then duplicates every one of them in the real layers at once,
//! so that the same seam is never picked twice.

use crate::bias::{self, BiasLookup};
use crate::config::{Axis, ResizeConfiguration};
use crate::context::{Context, Tally};
use crate::energy::{self, EnergyUpdate, Gradient};
use crate::engine::Outcome;
use crate::pixelbuffer::{blend, Channel, PixelBuffer};
use crate::seamfinder::{Seam, SeamSearch};
use crate::twodmap::TwoDimensionalMap;
use image::Rgba;
use log::{debug, info, trace, warn};

/// What every seam search and energy update needs to know.
struct Settings<'a> {
    gradient: Gradient,
    update: EnergyUpdate,
    step: u32,
    rigidity: f64,
    weights: Option<&'a TwoDimensionalMap<f64>>,
}

/// The working layers, laid out so that the axis being carved runs
/// along the rows.
#[derive(Clone)]
struct Layers<S: Channel> {
    pixels: TwoDimensionalMap<Rgba<S>>,
    origin: TwoDimensionalMap<usize>,
    energies: TwoDimensionalMap<f64>,
}

impl<S: Channel> Layers<S> {
    fn new(pixels: TwoDimensionalMap<Rgba<S>>, settings: &Settings<'_>) -> Self {
        let (width, height) = pixels.dimensions();
        let mut layers = Layers {
            pixels,
            origin: bias::identity_origin(width, height),
            energies: TwoDimensionalMap::new(0, 0),
        };
        layers.recompute(settings);
        layers
    }

    fn recompute(&mut self, settings: &Settings<'_>) {
        let lookup = settings.weights.map(|w| BiasLookup::new(w, &self.origin));
        self.energies = energy::compute(&self.pixels, settings.gradient, lookup);
    }

    fn transpose(&mut self, settings: &Settings<'_>) {
        self.pixels = self.pixels.transpose();
        self.origin = self.origin.transpose();
        self.recompute(settings);
    }

    fn cheapest_seam(&self, settings: &Settings<'_>) -> Seam {
        SeamSearch::new(&self.energies, settings.step, settings.rigidity).vertical()
    }

    fn remove_seam(&mut self, seam: &[u32], settings: &Settings<'_>) {
        self.pixels.remove_vertical_seam(seam);
        self.origin.remove_vertical_seam(seam);
        match settings.update {
            EnergyUpdate::Full => self.recompute(settings),
            EnergyUpdate::Incremental => {
                self.energies.remove_vertical_seam(seam);
                let lookup = settings.weights.map(|w| BiasLookup::new(w, &self.origin));
                energy::update_after_removal(
                    &mut self.energies,
                    &self.pixels,
                    seam,
                    settings.gradient,
                    lookup,
                );
            }
        }
    }
}

/// A struct for holding the image being carved.
pub(crate) struct SeamCarver<'a, 'c, S: Channel> {
    layers: Layers<S>,
    facing: Axis,
    settings: Settings<'a>,
    config: &'a ResizeConfiguration,
    context: &'a Context<'c>,
    tally: Tally,
}

impl<'a, 'c, S: Channel> SeamCarver<'a, 'c, S> {
    /// Creates a new SeamCarver with an image to be carved and the
    /// original-space bias weights, if any.
    pub fn new(
        source: &PixelBuffer<S>,
        weights: Option<&'a TwoDimensionalMap<f64>>,
        config: &'a ResizeConfiguration,
        context: &'a Context<'c>,
    ) -> Self {
        let settings = Settings {
            gradient: Gradient::new(config.energy_function, config.reader),
            update: config.energy_update,
            step: config.step,
            rigidity: f64::from(config.rigidity),
            weights,
        };
        SeamCarver {
            layers: Layers::new(source.as_map().clone(), &settings),
            facing: Axis::Width,
            settings,
            config,
            context,
            tally: Tally::new(0, 0),
        }
    }

    /// Carve or grow the image until it is `width` by `height`.
    pub fn carve(mut self, width: u32, height: u32) -> Outcome<S> {
        let (source_width, source_height) = self.layers.pixels.dimensions();
        let shrink = [
            source_width.saturating_sub(width),
            source_height.saturating_sub(height),
        ];
        let grow = [
            width.saturating_sub(source_width),
            height.saturating_sub(source_height),
        ];
        debug!(
            "carving {}x{} to {}x{}: width {:+}, height {:+}",
            source_width,
            source_height,
            width,
            height,
            i64::from(width) - i64::from(source_width),
            i64::from(height) - i64::from(source_height),
        );
        self.tally = Tally::new(
            source_width.abs_diff(width),
            source_height.abs_diff(height),
        );

        // When one axis grows and the other shrinks, the first axis of
        // the resize order is done first.
        let first = self.config.resize_order.first_axis();
        let finished = if grow[first.index()] > 0 && shrink[first.turn().index()] > 0 {
            self.grow(grow) && self.shrink(shrink)
        } else {
            self.shrink(shrink) && self.grow(grow)
        };
        if !finished {
            let partial = self.finish();
            info!(
                "resize cancelled at {}x{}",
                partial.width(),
                partial.height()
            );
            return Outcome::Cancelled(partial);
        }
        Outcome::Complete(self.finish())
    }

    fn first_axis(&self, remaining: [u32; 2]) -> Axis {
        let axis = self.config.resize_order.first_axis();
        if remaining[axis.index()] == 0 {
            axis.turn()
        } else {
            axis
        }
    }

    // Make `axis` run along the rows of every layer.
    fn face(&mut self, axis: Axis) {
        if self.facing != axis {
            self.layers.transpose(&self.settings);
            self.facing = axis;
        }
    }

    /// Remove seams until neither axis has any left to lose.  False if
    /// cancelled on the way.
    fn shrink(&mut self, mut remaining: [u32; 2]) -> bool {
        let mut axis = self.first_axis(remaining);
        let mut run = 0;
        while remaining.iter().any(|&r| r > 0) {
            if self.context.is_cancelled() {
                return false;
            }
            let other = axis.turn();
            if remaining[axis.index()] == 0
                || (run >= self.config.side_switch_frequency && remaining[other.index()] > 0)
            {
                debug!("switching from {:?} to {:?} after {} seams", axis, other, run);
                axis = other;
                run = 0;
            }
            self.face(axis);
            if self.layers.pixels.width() <= 1 {
                warn!(
                    "cannot carve {:?} below one pixel, {} seams left undone",
                    axis,
                    remaining[axis.index()]
                );
                remaining[axis.index()] = 0;
                continue;
            }
            let seam = self.layers.cheapest_seam(&self.settings);
            trace!("removing {:?} seam of cost {}", axis, seam.cost);
            self.layers.remove_seam(&seam.path, &self.settings);
            remaining[axis.index()] -= 1;
            run += 1;
            self.context.report(self.tally.advance(axis));
        }
        true
    }

    /// Insert seams in enlargement passes, alternating the axes between
    /// passes.  False if cancelled on the way.
    fn grow(&mut self, mut remaining: [u32; 2]) -> bool {
        let mut axis = self.first_axis(remaining);
        while remaining.iter().any(|&r| r > 0) {
            if remaining[axis.index()] == 0 {
                axis = axis.turn();
            }
            self.face(axis);
            let size = self.layers.pixels.width();
            let count = remaining[axis.index()].min(self.config.enlargement_limit(size));
            debug!("enlarging {:?} from {} by {} seams", axis, size, count);
            if !self.enlarge(axis, count) {
                return false;
            }
            remaining[axis.index()] -= count;
            if remaining[axis.turn().index()] > 0 {
                axis = axis.turn();
            }
        }
        true
    }

    /// One enlargement pass of `count` seams along the rows.  Leaves
    /// the layers untouched if cancelled.
    fn enlarge(&mut self, axis: Axis, count: u32) -> bool {
        let (width, height) = self.layers.pixels.dimensions();
        let mut scratch = self.layers.clone();
        // Where every scratch pixel sits in the layers before the pass.
        let mut columns = TwoDimensionalMap::from_fn(width, height, |x, _| x);
        let mut marks = vec![Vec::with_capacity(count as usize); height as usize];

        for _ in 0..count {
            if self.context.is_cancelled() {
                return false;
            }
            let seam = scratch.cheapest_seam(&self.settings);
            trace!("duplicating {:?} seam of cost {}", axis, seam.cost);
            for (y, (&x, row)) in seam.path.iter().zip(marks.iter_mut()).enumerate() {
                row.push(columns[(x, y as u32)]);
            }
            columns.remove_vertical_seam(&seam.path);
            scratch.remove_seam(&seam.path, &self.settings);
            self.context.report(self.tally.advance(axis));
        }

        for row in marks.iter_mut() {
            row.sort_unstable();
        }
        self.layers.pixels = self.layers.pixels.insert_vertical_seams(&marks, blend);
        self.layers.origin = self
            .layers
            .origin
            .insert_vertical_seams(&marks, |_, current| current);
        self.layers.recompute(&self.settings);
        true
    }

    /// The pixels in natural orientation.
    fn finish(mut self) -> PixelBuffer<S> {
        if self.facing == Axis::Height {
            self.layers.pixels = self.layers.pixels.transpose();
        }
        PixelBuffer::from_map(self.layers.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancellationToken;
    use std::sync::Mutex;

    fn grey(v: u8) -> Rgba<u8> {
        Rgba([v, v, v, 255])
    }

    // Two flat bands, dark on the left and light on the right.
    fn bands(width: u32, height: u32) -> PixelBuffer<u8> {
        PixelBuffer::from_fn(width, height, |x, _| grey(if x < width / 2 { 0 } else { 200 }))
    }

    #[test]
    fn shrinking_alternates_axes() {
        let axes = Mutex::new(Vec::new());
        let context = Context::new().with_progress(|p| axes.lock().unwrap().push(p.axis));
        let config = ResizeConfiguration {
            side_switch_frequency: 2,
            ..ResizeConfiguration::default()
        };
        let outcome = SeamCarver::new(&bands(10, 10), None, &config, &context).carve(6, 7);
        assert_eq!(outcome.buffer().dimensions(), (6, 7));
        use Axis::{Height as H, Width as W};
        assert_eq!(*axes.lock().unwrap(), vec![W, W, H, H, W, W, H]);
    }

    #[test]
    fn vertical_first_starts_with_height() {
        let axes = Mutex::new(Vec::new());
        let context = Context::new().with_progress(|p| axes.lock().unwrap().push(p.axis));
        let config = ResizeConfiguration {
            resize_order: crate::config::ResizeOrder::VerticalFirst,
            side_switch_frequency: 1,
            ..ResizeConfiguration::default()
        };
        let outcome = SeamCarver::new(&bands(5, 5), None, &config, &context).carve(3, 4);
        assert_eq!(outcome.buffer().dimensions(), (3, 4));
        assert_eq!(
            *axes.lock().unwrap(),
            vec![Axis::Height, Axis::Width, Axis::Width]
        );
    }

    #[test]
    fn opposite_changes_follow_the_resize_order() {
        use crate::config::ResizeOrder;
        use Axis::{Height as H, Width as W};
        for (order, expected) in [
            (ResizeOrder::HorizontalFirst, [W, W, W, W, H, H, H, H]),
            (ResizeOrder::VerticalFirst, [H, H, H, H, W, W, W, W]),
        ] {
            let axes = Mutex::new(Vec::new());
            let context = Context::new().with_progress(|p| axes.lock().unwrap().push(p.axis));
            let config = ResizeConfiguration {
                resize_order: order,
                ..ResizeConfiguration::default()
            };
            let outcome = SeamCarver::new(&bands(10, 10), None, &config, &context).carve(14, 6);
            assert_eq!(outcome.buffer().dimensions(), (14, 6));
            assert_eq!(*axes.lock().unwrap(), expected);
        }
    }

    #[test]
    fn an_enlargement_pass_duplicates_flat_columns() {
        let config = ResizeConfiguration::default();
        let context = Context::new();
        let mut carver = SeamCarver::new(&bands(4, 2), None, &config, &context);
        assert!(carver.enlarge(Axis::Width, 1));
        let grown = carver.finish();
        assert_eq!(grown.dimensions(), (5, 2));
        let row: Vec<u8> = grown.row(0).unwrap().iter().map(|p| p.0[0]).collect();
        assert_eq!(row, vec![0, 0, 0, 200, 200]);
    }

    #[test]
    fn inserted_pixels_keep_an_origin() {
        let config = ResizeConfiguration::default();
        let context = Context::new();
        let mut carver = SeamCarver::new(&bands(6, 3), None, &config, &context);
        assert!(carver.enlarge(Axis::Width, 2));
        let origin = &carver.layers.origin;
        assert_eq!(origin.dimensions(), (8, 3));
        assert!(origin.as_slice().iter().all(|&i| i < 18));
        for y in 0..3 {
            assert!(origin.row(y).windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn a_cancelled_pass_leaves_the_layers_alone() {
        let token = CancellationToken::new();
        token.cancel();
        let context = Context::new().with_cancellation(token);
        let config = ResizeConfiguration::default();
        let mut carver = SeamCarver::new(&bands(6, 3), None, &config, &context);
        assert!(!carver.enlarge(Axis::Width, 2));
        assert_eq!(carver.layers.pixels.dimensions(), (6, 3));
        let outcome = carver.carve(8, 3);
        assert!(outcome.is_cancelled());
        assert_eq!(outcome.buffer().dimensions(), (6, 3));
    }

    #[test]
    fn growth_runs_in_passes_until_both_axes_fit() {
        let reports = Mutex::new(Vec::new());
        let context = Context::new().with_progress(|p| reports.lock().unwrap().push(p));
        let config = ResizeConfiguration::default();
        let outcome = SeamCarver::new(&bands(4, 4), None, &config, &context).carve(10, 9);
        assert!(!outcome.is_cancelled());
        assert_eq!(outcome.buffer().dimensions(), (10, 9));
        drop(context);
        let reports = reports.into_inner().unwrap();
        assert_eq!(reports.len(), 11);
        assert!(reports.windows(2).all(|w| w[0].percent <= w[1].percent));
        assert_eq!(reports.last().map(|p| p.percent), Some(100));
    }
}
