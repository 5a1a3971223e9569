// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cancellation and progress
//!
//! Everything a running resize shares with the outside world travels
//! in a [`Context`] handed to it by the caller.  There is no global
//! state, so any number of resizes may run side by side.

use crate::config::Axis;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// A flag another thread can raise to stop a resize.  Clones share the
/// flag.  The carver looks at it before every seam.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A snapshot of a running resize, sent after every seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// The axis the last seam was carved on.
    pub axis: Axis,
    /// Seams carved on that axis so far.
    pub seams_done: u32,
    /// Seams that axis needs in total.
    pub seams_total: u32,
    /// Completion of that axis, 0 to 100.
    pub axis_percent: u8,
    /// Completion of the whole resize, 0 to 100.  When both axes
    /// change, each contributes half.
    pub percent: u8,
}

type Sink<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// The cancellation token and progress sink of one resize.
#[derive(Default)]
pub struct Context<'a> {
    cancellation: CancellationToken,
    progress: Option<Sink<'a>>,
}

impl<'a> Context<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Report progress to a callback.  It runs on the resizing thread.
    pub fn with_progress<F>(mut self, sink: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'a,
    {
        self.progress = Some(Box::new(sink));
        self
    }

    /// Report progress down a channel.  A hung-up receiver is ignored.
    pub fn with_channel(self, sender: Sender<Progress>) -> Self {
        self.with_progress(move |progress| {
            let _ = sender.send(progress);
        })
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub(crate) fn report(&self, progress: Progress) {
        if let Some(sink) = &self.progress {
            sink(progress);
        }
    }
}

impl<'a> fmt::Debug for Context<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancellation", &self.cancellation)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Counts seams per axis and turns the counts into [`Progress`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Tally {
    total: [u32; 2],
    done: [u32; 2],
}

fn percent(done: u32, total: u32, share: u64) -> u64 {
    if total == 0 {
        0
    } else {
        share * u64::from(done.min(total)) / u64::from(total)
    }
}

impl Tally {
    pub fn new(width_seams: u32, height_seams: u32) -> Self {
        Tally {
            total: [width_seams, height_seams],
            done: [0, 0],
        }
    }

    pub fn advance(&mut self, axis: Axis) -> Progress {
        let i = axis.index();
        self.done[i] += 1;
        let [tw, th] = self.total;
        let [dw, dh] = self.done;
        let overall = if tw > 0 && th > 0 {
            percent(dw, tw, 50) + percent(dh, th, 50)
        } else {
            percent(dw, tw, 100) + percent(dh, th, 100)
        };
        Progress {
            axis,
            seams_done: self.done[i],
            seams_total: self.total[i],
            axis_percent: percent(self.done[i], self.total[i], 100) as u8,
            percent: overall as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::mpsc;

    #[test]
    fn clones_share_the_cancellation_flag() {
        let token = CancellationToken::new();
        let context = Context::new().with_cancellation(token.clone());
        assert!(!context.is_cancelled());
        token.cancel();
        assert!(context.is_cancelled());
        assert!(context.cancellation().is_cancelled());
    }

    #[test]
    fn progress_reaches_callbacks_and_channels() {
        let calls = AtomicU32::new(0);
        let context = Context::new().with_progress(|p| {
            assert_eq!(p.axis, Axis::Height);
            calls.fetch_add(1, Ordering::SeqCst);
        });
        let mut tally = Tally::new(0, 2);
        context.report(tally.advance(Axis::Height));
        context.report(tally.advance(Axis::Height));
        drop(context);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let (sender, receiver) = mpsc::channel();
        let context = Context::new().with_channel(sender);
        context.report(Tally::new(1, 0).advance(Axis::Width));
        drop(context);
        let received: Vec<Progress> = receiver.iter().collect();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].percent, 100);
    }

    #[test]
    fn both_axes_split_the_percentage() {
        let mut tally = Tally::new(2, 4);
        let p = tally.advance(Axis::Width);
        assert_eq!((p.axis_percent, p.percent), (50, 25));
        let p = tally.advance(Axis::Width);
        assert_eq!((p.axis_percent, p.percent), (100, 50));
        for _ in 0..3 {
            tally.advance(Axis::Height);
        }
        let p = tally.advance(Axis::Height);
        assert_eq!((p.seams_done, p.seams_total, p.percent), (4, 4, 100));
    }

    #[test]
    fn one_axis_takes_the_whole_percentage() {
        let mut tally = Tally::new(0, 3);
        let percents: Vec<u8> = (0..3).map(|_| tally.advance(Axis::Height).percent).collect();
        assert_eq!(percents, vec![33, 66, 100]);
    }
}
