// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::search::RangeScorer;
use mdi_core::{KlMode, MdiError, Signal};

/// Largest series the Parzen scorer accepts; its kernel prefix table holds
/// `n * (n + 1)` values.
pub const MAX_PARZEN_SAMPLES: usize = 4096;

const DENSITY_EPSILON: f64 = f64::EPSILON;

/// Kernel density estimate divergence between a range and its complement.
///
/// Each timestep is scored under two Gaussian-kernel densities, one fit on
/// the range and one on the rest, and log-density ratios are averaged.
pub(crate) struct ParzenScorer {
    n: usize,
    mode: KlMode,
    alpha: f64,
    /// Row `i` holds running sums of `k(x_i, x_j)` over `j`.
    prefix: Vec<f64>,
}

impl ParzenScorer {
    pub(crate) fn new(
        x: &Signal,
        mode: KlMode,
        alpha: f64,
        kernel_sigma_sq: f64,
    ) -> Result<Self, MdiError> {
        let n = x.n();
        if n > MAX_PARZEN_SAMPLES {
            return Err(MdiError::resource_limit(format!(
                "parzen supports at most {MAX_PARZEN_SAMPLES} timesteps; got n={n}"
            )));
        }
        if !kernel_sigma_sq.is_finite() || kernel_sigma_sq <= 0.0 {
            return Err(MdiError::invalid_configuration(format!(
                "kernel_sigma_sq must be finite and > 0.0; got {kernel_sigma_sq}"
            )));
        }

        let gamma = 1.0 / (2.0 * kernel_sigma_sq);
        let width = n + 1;
        let mut prefix = vec![0.0; n * width];
        for i in 0..n {
            let left = x.step(i);
            for j in 0..n {
                let dist_sq = left
                    .iter()
                    .zip(x.step(j))
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f64>();
                let value = (-gamma * dist_sq).exp();
                if !value.is_finite() {
                    return Err(MdiError::numerical_issue(format!(
                        "non-finite kernel value at ({i}, {j})"
                    )));
                }
                prefix[i * width + j + 1] = prefix[i * width + j] + value;
            }
        }

        Ok(Self {
            n,
            mode,
            alpha,
            prefix,
        })
    }

    /// Log densities of timestep `i` under the range model and the complement model.
    fn log_densities(&self, i: usize, start: usize, end: usize) -> (f64, f64) {
        let row = &self.prefix[i * (self.n + 1)..(i + 1) * (self.n + 1)];
        let inner_mass = row[end] - row[start];
        let outer_mass = row[self.n] - inner_mass;
        let inner_count = (end - start) as f64;
        let outer_count = (self.n - (end - start)) as f64;
        (
            (inner_mass / inner_count + DENSITY_EPSILON).ln(),
            (outer_mass / outer_count + DENSITY_EPSILON).ln(),
        )
    }

    fn inner_to_outer(&self, start: usize, end: usize) -> f64 {
        let total = (start..end)
            .map(|i| {
                let (inner, outer) = self.log_densities(i, start, end);
                inner - outer
            })
            .sum::<f64>();
        total / (end - start) as f64
    }

    fn outer_to_inner(&self, start: usize, end: usize) -> f64 {
        let total = (0..start)
            .chain(end..self.n)
            .map(|i| {
                let (inner, outer) = self.log_densities(i, start, end);
                outer - inner
            })
            .sum::<f64>();
        total / (self.n - (end - start)) as f64
    }
}

impl RangeScorer for ParzenScorer {
    fn score(&self, start: usize, end: usize) -> Result<f64, MdiError> {
        let score = match self.mode {
            KlMode::IOmega => self.inner_to_outer(start, end),
            KlMode::OmegaI => self.outer_to_inner(start, end),
            KlMode::Sym => self.inner_to_outer(start, end) + self.outer_to_inner(start, end),
            KlMode::Lambda => {
                self.alpha * self.inner_to_outer(start, end)
                    + (1.0 - self.alpha) * self.outer_to_inner(start, end)
            }
            KlMode::IsIOmega => (end - start) as f64 * self.inner_to_outer(start, end),
        };
        Ok(score)
    }
}
