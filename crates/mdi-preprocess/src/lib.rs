// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use mdi_core::{MdiError, Preprocessor, Signal};

const DEFAULT_EMBEDDING_DIMENSION: usize = 3;
const DEFAULT_EMBEDDING_LAG: usize = 1;
const SCALE_EPSILON: f64 = 1.0e-12;

/// Per-dimension z-score: subtract the mean, divide by the population
/// standard deviation. Constant dimensions are only centered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Normalize;

impl Preprocessor for Normalize {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn apply(&self, x: &Signal) -> Result<Signal, MdiError> {
        let (n, d) = (x.n(), x.d());
        let mut values = x.values().to_vec();
        for j in 0..d {
            let column = x.dimension(j);
            let mean = column.iter().sum::<f64>() / n as f64;
            let variance = column
                .iter()
                .map(|value| (value - mean) * (value - mean))
                .sum::<f64>()
                / n as f64;
            let scale = if variance.sqrt() > SCALE_EPSILON {
                variance.sqrt()
            } else {
                1.0
            };
            for t in 0..n {
                let idx = t * d + j;
                values[idx] = (values[idx] - mean) / scale;
            }
        }
        Signal::new(values, n, d)
    }
}

/// Per-dimension scaling by the largest absolute value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizeMax;

impl Preprocessor for NormalizeMax {
    fn name(&self) -> &'static str {
        "normalize_max"
    }

    fn apply(&self, x: &Signal) -> Result<Signal, MdiError> {
        let (n, d) = (x.n(), x.d());
        let mut values = x.values().to_vec();
        for j in 0..d {
            let max_abs = (0..n)
                .map(|t| x.value(t, j).abs())
                .fold(0.0_f64, f64::max);
            if max_abs <= SCALE_EPSILON {
                continue;
            }
            for t in 0..n {
                values[t * d + j] /= max_abs;
            }
        }
        Signal::new(values, n, d)
    }
}

/// Removes a least-squares line from every dimension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetrendLinear;

impl Preprocessor for DetrendLinear {
    fn name(&self) -> &'static str {
        "detrend_linear"
    }

    fn apply(&self, x: &Signal) -> Result<Signal, MdiError> {
        let (n, d) = (x.n(), x.d());
        if n < 2 {
            return Err(MdiError::invalid_input(format!(
                "detrend_linear requires at least 2 timesteps; got n={n}"
            )));
        }

        let mut values = x.values().to_vec();
        for j in 0..d {
            let (intercept, slope) = time_trend(x, j).ok_or_else(|| {
                MdiError::numerical_issue(format!(
                    "detrend_linear is ill-conditioned for dimension {j}"
                ))
            })?;
            for t in 0..n {
                values[t * d + j] -= intercept + slope * t as f64;
            }
        }
        Signal::new(values, n, d)
    }
}

/// Least-squares `(intercept, slope)` of dimension `j` against the time
/// index, fitted around the mid-point of `0..n`.
fn time_trend(x: &Signal, j: usize) -> Option<(f64, f64)> {
    let n = x.n();
    let mid = (n as f64 - 1.0) / 2.0;
    let mean = (0..n).map(|t| x.value(t, j)).sum::<f64>() / n as f64;
    let covariance = (0..n)
        .map(|t| (t as f64 - mid) * (x.value(t, j) - mean))
        .sum::<f64>();
    // sum of (t - mid)^2 over 0..n
    let spread = n as f64 * ((n * n) as f64 - 1.0) / 12.0;
    if !spread.is_finite() || spread <= 0.0 || !covariance.is_finite() {
        return None;
    }
    let slope = covariance / spread;
    Some((mean - slope * mid, slope))
}

/// Time-delay embedding: timestep `t` becomes the concatenation of
/// `x[t], x[t - lag], ..., x[t - (k - 1) * lag]`.
///
/// Indices before the start of the series are clamped to `0` (constant
/// padding), so the number of timesteps is unchanged and the output has
/// `k * d` attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeDelayEmbedding {
    pub dimension: usize,
    pub lag: usize,
}

impl Default for TimeDelayEmbedding {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_EMBEDDING_DIMENSION,
            lag: DEFAULT_EMBEDDING_LAG,
        }
    }
}

impl TimeDelayEmbedding {
    pub fn new(dimension: usize, lag: usize) -> Result<Self, MdiError> {
        if dimension == 0 {
            return Err(MdiError::invalid_configuration(
                "time-delay embedding dimension must be >= 1; got 0",
            ));
        }
        if lag == 0 {
            return Err(MdiError::invalid_configuration(
                "time-delay embedding lag must be >= 1; got 0",
            ));
        }
        Ok(Self { dimension, lag })
    }
}

impl Preprocessor for TimeDelayEmbedding {
    fn name(&self) -> &'static str {
        "td"
    }

    fn apply(&self, x: &Signal) -> Result<Signal, MdiError> {
        let (n, d) = (x.n(), x.d());
        let out_d = d.checked_mul(self.dimension).ok_or_else(|| {
            MdiError::resource_limit("time-delay embedding width overflows usize")
        })?;

        let mut values = Vec::with_capacity(n.saturating_mul(out_d));
        for t in 0..n {
            for k in 0..self.dimension {
                let source = t.saturating_sub(k * self.lag);
                values.extend_from_slice(x.step(source));
            }
        }
        Signal::new(values, n, out_d)
    }
}

/// All transforms known to the harness, in registry order.
pub fn builtin_preprocessors() -> Vec<Box<dyn Preprocessor>> {
    vec![
        Box::new(Normalize),
        Box::new(NormalizeMax),
        Box::new(DetrendLinear),
        Box::new(TimeDelayEmbedding::default()),
    ]
}

/// Signal pre-processing namespace.
pub fn crate_name() -> &'static str {
    let _ = mdi_core::crate_name();
    "mdi-preprocess"
}
