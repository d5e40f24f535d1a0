// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::MdiError;

/// Scored half-open range `[start, end)` reported by an interval detector.
///
/// Higher scores mean more anomalous.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

impl Interval {
    pub fn new(start: usize, end: usize, score: f64) -> Self {
        Self { start, end, score }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, t: usize) -> bool {
        self.start <= t && t < self.end
    }

    /// True when the two ranges share at least one timestep.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    /// Intersection-over-union of the two ranges.
    pub fn iou(&self, other: &Interval) -> f64 {
        let intersection = self
            .end
            .min(other.end)
            .saturating_sub(self.start.max(other.start));
        let union = self.len() + other.len() - intersection;
        if union == 0 {
            0.0
        } else {
            intersection as f64 / union as f64
        }
    }
}

/// Checks detector output against the interval contract for a signal of length `n`.
///
/// Every interval must satisfy `start <= end <= n` and carry a finite score.
/// Empty intervals (`start == end`) are tolerated; they cover no timestep.
pub fn validate_intervals(n: usize, intervals: &[Interval]) -> Result<(), MdiError> {
    for (index, interval) in intervals.iter().enumerate() {
        if interval.start > interval.end {
            return Err(MdiError::invalid_input(format!(
                "intervals[{index}] has start={} > end={}",
                interval.start, interval.end
            )));
        }
        if interval.end > n {
            return Err(MdiError::invalid_input(format!(
                "intervals[{index}] end={} exceeds signal length n={n}",
                interval.end
            )));
        }
        if !interval.score.is_finite() {
            return Err(MdiError::invalid_input(format!(
                "intervals[{index}] score must be finite; got {}",
                interval.score
            )));
        }
    }
    Ok(())
}
