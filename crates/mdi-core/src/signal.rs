// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::MdiError;

/// Owned multivariate time series with `n` timesteps and `d` attributes.
///
/// Values are stored time-major (`values[t * d + j]`), so one timestep is a
/// contiguous slice.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    values: Vec<f64>,
    n: usize,
    d: usize,
}

impl Signal {
    /// Constructs a validated signal from time-major values.
    pub fn new(values: Vec<f64>, n: usize, d: usize) -> Result<Self, MdiError> {
        if n == 0 {
            return Err(MdiError::invalid_input("n must be >= 1"));
        }
        if d == 0 {
            return Err(MdiError::invalid_input("d must be >= 1"));
        }

        let expected_len = n
            .checked_mul(d)
            .ok_or_else(|| MdiError::invalid_input("n*d overflow while validating shape"))?;
        if values.len() != expected_len {
            return Err(MdiError::invalid_input(format!(
                "value length mismatch: got {}, expected {expected_len} (n={n}, d={d})",
                values.len()
            )));
        }

        if let Some((idx, value)) = values
            .iter()
            .copied()
            .enumerate()
            .find(|(_, value)| !value.is_finite())
        {
            return Err(MdiError::invalid_input(format!(
                "signal values must be finite: t={}, j={} has {value}",
                idx / d,
                idx % d
            )));
        }

        Ok(Self { values, n, d })
    }

    /// Constructs a signal from attribute-major rows: `rows[j][t]`.
    ///
    /// This is the `D x T` layout used by the corpus file.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MdiError> {
        let d = rows.len();
        if d == 0 {
            return Err(MdiError::invalid_input("d must be >= 1"));
        }
        let n = rows[0].len();
        if let Some((j, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(MdiError::invalid_input(format!(
                "ragged signal rows: row 0 has {n} timesteps but row {j} has {}",
                row.len()
            )));
        }

        let mut values = Vec::with_capacity(n.saturating_mul(d));
        for t in 0..n {
            for row in rows {
                values.push(row[t]);
            }
        }
        Self::new(values, n, d)
    }

    /// Constructs a univariate signal.
    pub fn univariate(values: Vec<f64>) -> Result<Self, MdiError> {
        let n = values.len();
        Self::new(values, n, 1)
    }

    /// Number of timesteps `T`.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of attributes `D`.
    pub fn d(&self) -> usize {
        self.d
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Value of attribute `j` at timestep `t`.
    ///
    /// Panics when out of bounds, like slice indexing.
    pub fn value(&self, t: usize, j: usize) -> f64 {
        self.values[t * self.d + j]
    }

    /// All attributes at timestep `t`.
    pub fn step(&self, t: usize) -> &[f64] {
        let start = t * self.d;
        &self.values[start..start + self.d]
    }

    /// Copies attribute `j` across all timesteps.
    pub fn dimension(&self, j: usize) -> Vec<f64> {
        (0..self.n).map(|t| self.value(t, j)).collect()
    }

    pub fn is_univariate(&self) -> bool {
        self.d == 1
    }

    pub fn is_multivariate(&self) -> bool {
        self.d > 1
    }
}

/// Binary per-timestep labels; `1` marks an extreme timestep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroundTruth {
    labels: Vec<u8>,
}

impl GroundTruth {
    pub fn new(labels: Vec<u8>) -> Result<Self, MdiError> {
        if let Some((idx, value)) = labels
            .iter()
            .copied()
            .enumerate()
            .find(|(_, value)| *value > 1)
        {
            return Err(MdiError::invalid_input(format!(
                "ground truth must contain only 0/1 labels: index {idx} has {value}"
            )));
        }
        Ok(Self { labels })
    }

    /// Builds labels of length `n` that are `1` on every range in `extremes`.
    pub fn from_ranges(n: usize, extremes: &[(usize, usize)]) -> Result<Self, MdiError> {
        let mut labels = vec![0u8; n];
        for &(start, end) in extremes {
            if start > end || end > n {
                return Err(MdiError::invalid_input(format!(
                    "extreme range [{start}, {end}) is invalid for n={n}"
                )));
            }
            labels[start..end].fill(1);
        }
        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of timesteps labeled `1`.
    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&label| label == 1).count()
    }

    pub fn negatives(&self) -> usize {
        self.labels.len() - self.positives()
    }

    /// True when the labels contain only one class, which leaves ROC-AUC undefined.
    pub fn is_single_class(&self) -> bool {
        let positives = self.positives();
        positives == 0 || positives == self.labels.len()
    }
}
