// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::linalg::Cholesky;
use crate::search::RangeScorer;
use mdi_core::{KlMode, MdiError, Signal};

/// Added to covariance diagonals so short ranges stay positive definite.
const COVARIANCE_RIDGE: f64 = 1.0e-6;

/// How the interval and background covariances are modelled.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CovarianceMode {
    /// Separate covariance estimates inside and outside the range.
    Full,
    /// One covariance estimated over the whole series.
    Shared,
    /// Identity covariance; only the means are compared.
    Identity,
}

/// Closed-form Gaussian KL divergence between a range and its complement,
/// backed by prefix sums of first and second moments.
pub(crate) struct GaussianScorer {
    n: usize,
    d: usize,
    mode: KlMode,
    alpha: f64,
    covariance: CovarianceMode,
    sums: Vec<f64>,
    outer_products: Vec<f64>,
    shared: Option<Cholesky>,
    chi_mean: f64,
    chi_sd: f64,
}

struct Moments {
    count: usize,
    mean: Vec<f64>,
    covariance: Vec<f64>,
}

impl GaussianScorer {
    pub(crate) fn new(
        x: &Signal,
        mode: KlMode,
        alpha: f64,
        covariance: CovarianceMode,
    ) -> Result<Self, MdiError> {
        let (n, d) = (x.n(), x.d());
        let dd = d * d;
        // Moments are shift invariant; centering keeps E[xx'] - mm' from
        // cancelling away the ridge on signals with a large offset.
        let mut center = vec![0.0; d];
        for t in 0..n {
            for (acc, value) in center.iter_mut().zip(x.step(t)) {
                *acc += value;
            }
        }
        for value in &mut center {
            *value /= n.max(1) as f64;
        }

        let mut sums = vec![0.0; (n + 1) * d];
        let mut outer_products = vec![0.0; (n + 1) * dd];
        let mut centered = vec![0.0; d];
        for t in 0..n {
            for ((dst, value), mu) in centered.iter_mut().zip(x.step(t)).zip(&center) {
                *dst = value - mu;
            }
            for j in 0..d {
                sums[(t + 1) * d + j] = sums[t * d + j] + centered[j];
                for k in 0..d {
                    outer_products[(t + 1) * dd + j * d + k] =
                        outer_products[t * dd + j * d + k] + centered[j] * centered[k];
                }
            }
        }

        let chi_mean = (d * (d + 3)) as f64 / 2.0;
        let mut scorer = Self {
            n,
            d,
            mode,
            alpha,
            covariance,
            sums,
            outer_products,
            shared: None,
            chi_mean,
            chi_sd: (2.0 * chi_mean).sqrt(),
        };

        if covariance == CovarianceMode::Shared {
            let global = scorer.moments(0, n, false);
            scorer.shared = Some(Cholesky::factor(global.covariance, d)?);
        }
        Ok(scorer)
    }

    fn moments(&self, start: usize, end: usize, complement: bool) -> Moments {
        let (d, dd) = (self.d, self.d * self.d);
        let mut sum = (0..d)
            .map(|j| self.sums[end * d + j] - self.sums[start * d + j])
            .collect::<Vec<_>>();
        let mut outer = (0..dd)
            .map(|idx| self.outer_products[end * dd + idx] - self.outer_products[start * dd + idx])
            .collect::<Vec<_>>();
        let mut count = end - start;

        if complement {
            for (j, value) in sum.iter_mut().enumerate() {
                *value = self.sums[self.n * d + j] - *value;
            }
            for (idx, value) in outer.iter_mut().enumerate() {
                *value = self.outer_products[self.n * dd + idx] - *value;
            }
            count = self.n - count;
        }

        let inv = 1.0 / count as f64;
        let mean = sum.iter().map(|value| value * inv).collect::<Vec<_>>();
        let mut covariance = vec![0.0; dd];
        for j in 0..d {
            for k in 0..d {
                covariance[j * d + k] = outer[j * d + k] * inv - mean[j] * mean[k];
            }
            covariance[j * d + j] += COVARIANCE_RIDGE;
        }

        Moments {
            count,
            mean,
            covariance,
        }
    }

    fn mean_distance(&self, diff: &[f64], local: Option<&Cholesky>) -> f64 {
        match self.covariance {
            CovarianceMode::Identity => diff.iter().map(|value| value * value).sum(),
            CovarianceMode::Shared => self
                .shared
                .as_ref()
                .map_or(f64::NAN, |chol| chol.mahalanobis(diff)),
            CovarianceMode::Full => local.map_or(f64::NAN, |chol| chol.mahalanobis(diff)),
        }
    }
}

impl RangeScorer for GaussianScorer {
    fn score(&self, start: usize, end: usize) -> Result<f64, MdiError> {
        let inner = self.moments(start, end, false);
        let outer = self.moments(start, end, true);
        let diff = inner
            .mean
            .iter()
            .zip(outer.mean.iter())
            .map(|(a, b)| a - b)
            .collect::<Vec<_>>();

        let (inner_chol, outer_chol) = if self.covariance == CovarianceMode::Full {
            (
                Some(Cholesky::factor(inner.covariance.clone(), self.d)?),
                Some(Cholesky::factor(outer.covariance.clone(), self.d)?),
            )
        } else {
            (None, None)
        };

        let weight = self.mode.inner_weight(self.alpha);
        let need_inner = weight != Some(0.0);
        let need_outer = weight != Some(1.0);
        let dim = self.d as f64;

        let mut inner_to_outer = 0.0;
        if need_inner {
            inner_to_outer += self.mean_distance(&diff, outer_chol.as_ref());
            if let (Some(inner_chol), Some(outer_chol)) = (&inner_chol, &outer_chol) {
                inner_to_outer += outer_chol.trace_solve(&inner.covariance)
                    + outer_chol.log_det()
                    - inner_chol.log_det()
                    - dim;
            }
        }

        let mut outer_to_inner = 0.0;
        if need_outer {
            outer_to_inner += self.mean_distance(&diff, inner_chol.as_ref());
            if let (Some(inner_chol), Some(outer_chol)) = (&inner_chol, &outer_chol) {
                outer_to_inner += inner_chol.trace_solve(&outer.covariance)
                    + inner_chol.log_det()
                    - outer_chol.log_det()
                    - dim;
            }
        }

        let score = match (self.mode, weight) {
            (KlMode::IsIOmega, _) => {
                (inner.count as f64 * inner_to_outer - self.chi_mean) / self.chi_sd
            }
            (_, Some(weight)) if weight == 1.0 => inner_to_outer,
            (_, Some(weight)) if weight == 0.0 => outer_to_inner,
            (_, Some(weight)) => weight * inner_to_outer + (1.0 - weight) * outer_to_inner,
            (_, None) => inner_to_outer + outer_to_inner,
        };
        Ok(score)
    }
}
