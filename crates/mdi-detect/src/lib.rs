// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod gaussian;
mod linalg;
pub mod parzen;
pub mod search;

pub use gaussian::CovarianceMode;
pub use parzen::MAX_PARZEN_SAMPLES;
pub use search::{dense_proposals, non_maximum_suppression};

use gaussian::GaussianScorer;
use mdi_core::{DetectionParams, Interval, IntervalDetector, MdiError, Signal};
use parzen::ParzenScorer;

/// Density model used to compare a candidate range with the rest of the series.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaxDivMethod {
    GaussianCov,
    GaussianGlobalCov,
    GaussianIdCov,
    Parzen,
}

impl MaxDivMethod {
    pub const ALL: [MaxDivMethod; 4] = [
        MaxDivMethod::GaussianCov,
        MaxDivMethod::GaussianGlobalCov,
        MaxDivMethod::GaussianIdCov,
        MaxDivMethod::Parzen,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GaussianCov => "gaussian_cov",
            Self::GaussianGlobalCov => "gaussian_global_cov",
            Self::GaussianIdCov => "gaussian_id_cov",
            Self::Parzen => "parzen",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, MdiError> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == raw)
            .ok_or_else(|| {
                MdiError::invalid_configuration(format!(
                    "unknown maxdiv method '{raw}'; expected one of: gaussian_cov, gaussian_global_cov, gaussian_id_cov, parzen"
                ))
            })
    }

    fn covariance(self) -> Option<CovarianceMode> {
        match self {
            Self::GaussianCov => Some(CovarianceMode::Full),
            Self::GaussianGlobalCov => Some(CovarianceMode::Shared),
            Self::GaussianIdCov => Some(CovarianceMode::Identity),
            Self::Parzen => None,
        }
    }
}

/// Exhaustive maximally divergent interval search.
///
/// Every range with `min_len <= len <= max_len` is scored by the KL
/// divergence selected through `params.mode`, overlapping ranges are
/// suppressed, and the best `params.num_intervals` are returned in
/// descending score order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaxDivDetector {
    method: MaxDivMethod,
}

impl MaxDivDetector {
    pub fn new(method: MaxDivMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> MaxDivMethod {
        self.method
    }
}

impl IntervalDetector for MaxDivDetector {
    fn name(&self) -> &'static str {
        self.method.as_str()
    }

    fn detect(&self, x: &Signal, params: &DetectionParams) -> Result<Vec<Interval>, MdiError> {
        params.validate()?;
        let n = x.n();
        match self.method.covariance() {
            Some(covariance) => {
                let scorer = GaussianScorer::new(x, params.mode, params.alpha, covariance)?;
                search::scan(
                    &scorer,
                    n,
                    params.min_len,
                    params.max_len,
                    params.num_intervals,
                )
            }
            None => {
                let scorer =
                    ParzenScorer::new(x, params.mode, params.alpha, params.kernel_sigma_sq)?;
                search::scan(
                    &scorer,
                    n,
                    params.min_len,
                    params.max_len,
                    params.num_intervals,
                )
            }
        }
    }
}

/// All reference detectors, in registry order.
pub fn builtin_detectors() -> Vec<Box<dyn IntervalDetector>> {
    MaxDivMethod::ALL
        .into_iter()
        .map(|method| Box::new(MaxDivDetector::new(method)) as Box<dyn IntervalDetector>)
        .collect()
}

/// Reference interval detectors namespace.
pub fn crate_name() -> &'static str {
    let _ = mdi_core::crate_name();
    "mdi-detect"
}
