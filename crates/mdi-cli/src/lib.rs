// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use mdi_harness::{
    DEFAULT_HISTOGRAM_BINS, IntervalContext, IntervalHistogram, IntervalHook, interval_histogram,
};
use std::io::Write;
use tracing_subscriber::EnvFilter;

const LEVELS: &[u8] = b" .:-=+*#%@";

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` is honored when set; otherwise the level is `warn`, or
/// `debug` with `verbose`.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Visualization hook that prints each interval with a text histogram of
/// dimension 0 inside vs. outside the interval.
pub struct TextHistogramHook<W: Write> {
    out: W,
    bins: usize,
}

impl<W: Write> TextHistogramHook<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            bins: DEFAULT_HISTOGRAM_BINS,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> IntervalHook for TextHistogramHook<W> {
    fn on_interval(&mut self, ctx: &IntervalContext<'_>) {
        let interval = ctx.interval;
        let _ = writeln!(
            self.out,
            "[{} #{}] interval {}/{}: {} - {} (score {})",
            ctx.group,
            ctx.signal_index,
            ctx.rank,
            ctx.total,
            interval.start,
            interval.end,
            interval.score
        );
        match interval_histogram(ctx.signal, interval, self.bins) {
            Ok(histogram) => {
                let _ = writeln!(self.out, "  nominal |{}|", sparkline(&histogram, false));
                let _ = writeln!(self.out, "  extreme |{}|", sparkline(&histogram, true));
            }
            Err(err) => {
                let _ = writeln!(self.out, "  histogram unavailable: {err}");
            }
        }
    }
}

fn sparkline(histogram: &IntervalHistogram, inside: bool) -> String {
    let counts = if inside {
        &histogram.inside_counts
    } else {
        &histogram.outside_counts
    };
    let peak = counts.iter().copied().max().unwrap_or(0);
    counts
        .iter()
        .map(|&count| {
            if peak == 0 || count == 0 {
                return ' ';
            }
            let level = (count * (LEVELS.len() - 1)).div_ceil(peak);
            char::from(LEVELS[level])
        })
        .collect()
}

/// CLI namespace.
pub fn crate_name() -> &'static str {
    let _ = mdi_harness::crate_name();
    "mdi-cli"
}

#[cfg(test)]
mod tests {
    use super::{TextHistogramHook, sparkline};
    use mdi_core::{Interval, Signal};
    use mdi_harness::{IntervalContext, IntervalHistogram, IntervalHook};

    #[test]
    fn sparkline_maps_peak_to_densest_glyph() {
        let histogram = IntervalHistogram {
            bin_centers: vec![0.0, 1.0, 2.0, 3.0],
            inside_counts: vec![0, 1, 8, 0],
            outside_counts: vec![4, 4, 0, 2],
        };
        assert_eq!(sparkline(&histogram, true), " :@ ");
        assert_eq!(sparkline(&histogram, false), "@@ +");
    }

    #[test]
    fn hook_writes_header_and_two_histogram_rows() {
        let signal =
            Signal::univariate((0..20).map(|t| t as f64).collect()).expect("signal should be valid");
        let interval = Interval::new(5, 10, 2.5);
        let mut hook = TextHistogramHook::new(Vec::new());
        hook.on_interval(&IntervalContext {
            group: "meander",
            signal_index: 3,
            rank: 0,
            total: 2,
            interval: &interval,
            signal: &signal,
        });

        let text = String::from_utf8(hook.into_inner()).expect("output should be utf-8");
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "[meander #3] interval 0/2: 5 - 10 (score 2.5)");
        assert!(lines[1].starts_with("  nominal |"));
        assert!(lines[2].starts_with("  extreme |"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn hook_reports_unavailable_histogram_for_full_cover() {
        let signal = Signal::univariate(vec![1.0, 2.0]).expect("signal should be valid");
        let interval = Interval::new(0, 2, 1.0);
        let mut hook = TextHistogramHook::new(Vec::new());
        hook.on_interval(&IntervalContext {
            group: "g",
            signal_index: 0,
            rank: 0,
            total: 1,
            interval: &interval,
            signal: &signal,
        });
        let text = String::from_utf8(hook.into_inner()).expect("output should be utf-8");
        assert!(text.contains("histogram unavailable"), "{text}");
    }
}
