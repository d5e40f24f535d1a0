// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use mdi_core::{Interval, MdiError, Signal};
use serde::Serialize;

pub const DEFAULT_HISTOGRAM_BINS: usize = 40;

/// Value distribution of dimension 0 inside and outside one interval.
///
/// Bin edges span the outside values; inside values falling beyond those
/// edges are not counted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IntervalHistogram {
    pub bin_centers: Vec<f64>,
    pub inside_counts: Vec<usize>,
    pub outside_counts: Vec<usize>,
}

impl IntervalHistogram {
    pub fn bins(&self) -> usize {
        self.bin_centers.len()
    }
}

/// Histograms dimension 0 of `signal` for `interval` against the rest of the series.
pub fn interval_histogram(
    signal: &Signal,
    interval: &Interval,
    bins: usize,
) -> Result<IntervalHistogram, MdiError> {
    if bins == 0 {
        return Err(MdiError::invalid_input("histogram bins must be >= 1; got 0"));
    }
    let n = signal.n();
    if interval.start > interval.end || interval.end > n {
        return Err(MdiError::invalid_input(format!(
            "interval [{}, {}) does not fit a signal of length n={n}",
            interval.start, interval.end
        )));
    }

    let values = signal.dimension(0);
    let outside = values[..interval.start]
        .iter()
        .chain(values[interval.end..].iter())
        .copied()
        .collect::<Vec<_>>();
    if outside.is_empty() {
        return Err(MdiError::invalid_input(
            "interval covers the whole signal; nothing to compare against",
        ));
    }

    let mut low = outside.iter().copied().fold(f64::INFINITY, f64::min);
    let mut high = outside.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if low == high {
        low -= 0.5;
        high += 0.5;
    }
    let width = (high - low) / bins as f64;

    let bin_of = |value: f64| -> Option<usize> {
        if value < low || value > high {
            return None;
        }
        let index = ((value - low) / width) as usize;
        Some(index.min(bins - 1))
    };

    let mut outside_counts = vec![0usize; bins];
    for value in &outside {
        if let Some(index) = bin_of(*value) {
            outside_counts[index] += 1;
        }
    }
    let mut inside_counts = vec![0usize; bins];
    for value in &values[interval.start..interval.end] {
        if let Some(index) = bin_of(*value) {
            inside_counts[index] += 1;
        }
    }

    let bin_centers = (0..bins)
        .map(|index| low + width * (index as f64 + 0.5))
        .collect();

    Ok(IntervalHistogram {
        bin_centers,
        inside_counts,
        outside_counts,
    })
}
