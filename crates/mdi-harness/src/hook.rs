// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use mdi_core::{Interval, Signal};

/// Everything a visualization hook gets to see about one detected interval.
#[derive(Clone, Copy, Debug)]
pub struct IntervalContext<'a> {
    pub group: &'a str,
    pub signal_index: usize,
    /// Position of the interval in detector order.
    pub rank: usize,
    /// Number of intervals the detector returned for this signal.
    pub total: usize,
    pub interval: &'a Interval,
    pub signal: &'a Signal,
}

/// Observer called for the first `num_intervals` intervals of every
/// evaluated signal when visualization is enabled.
///
/// Hooks run on the orchestrating thread in corpus order and cannot affect
/// metrics.
pub trait IntervalHook {
    fn on_interval(&mut self, ctx: &IntervalContext<'_>);
}

/// Hook that ignores every interval.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHook;

impl IntervalHook for NoopHook {
    fn on_interval(&mut self, _ctx: &IntervalContext<'_>) {}
}

/// Hook that keeps a copy of every interval it sees, tagged by group and signal.
#[derive(Clone, Debug, Default)]
pub struct CollectingHook {
    pub seen: Vec<(String, usize, Interval)>,
}

impl IntervalHook for CollectingHook {
    fn on_interval(&mut self, ctx: &IntervalContext<'_>) {
        self.seen
            .push((ctx.group.to_string(), ctx.signal_index, *ctx.interval));
    }
}
