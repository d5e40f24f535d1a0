// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::MdiError;

pub const DEFAULT_KERNEL_SIGMA_SQ: f64 = 1.0;
pub const DEFAULT_MIN_LEN: usize = 12;
pub const DEFAULT_MAX_LEN: usize = 50;
pub const DEFAULT_ALPHA: f64 = 1.0;
pub const DEFAULT_NUM_INTERVALS: usize = 5;

/// Direction in which the divergence between an interval `I` and the rest
/// of the series `Omega` is integrated.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KlMode {
    /// `KL(Omega || I)`: integrate over the nominal range.
    OmegaI,
    /// `KL(I || Omega) + KL(Omega || I)`.
    Sym,
    /// `KL(I || Omega)`: integrate over the extremal range.
    #[default]
    IOmega,
    /// `alpha * KL(I || Omega) + (1 - alpha) * KL(Omega || I)`.
    Lambda,
    /// Size-unbiased `KL(I || Omega)`.
    IsIOmega,
}

impl KlMode {
    pub const ALL: [KlMode; 5] = [
        KlMode::OmegaI,
        KlMode::Sym,
        KlMode::IOmega,
        KlMode::Lambda,
        KlMode::IsIOmega,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OmegaI => "OMEGA_I",
            Self::Sym => "SYM",
            Self::IOmega => "I_OMEGA",
            Self::Lambda => "LAMBDA",
            Self::IsIOmega => "IS_I_OMEGA",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, MdiError> {
        match raw.to_ascii_uppercase().as_str() {
            "OMEGA_I" => Ok(Self::OmegaI),
            "SYM" => Ok(Self::Sym),
            "I_OMEGA" => Ok(Self::IOmega),
            "LAMBDA" => Ok(Self::Lambda),
            "IS_I_OMEGA" => Ok(Self::IsIOmega),
            _ => Err(MdiError::invalid_configuration(format!(
                "invalid mode '{raw}'; expected one of: OMEGA_I, SYM, I_OMEGA, LAMBDA, IS_I_OMEGA"
            ))),
        }
    }

    /// Weight given to `KL(I || Omega)`; the remainder goes to `KL(Omega || I)`.
    ///
    /// Returns `None` for [`KlMode::Sym`], which sums both directions unweighted.
    pub fn inner_weight(self, alpha: f64) -> Option<f64> {
        match self {
            Self::IOmega | Self::IsIOmega => Some(1.0),
            Self::OmegaI => Some(0.0),
            Self::Lambda => Some(alpha),
            Self::Sym => None,
        }
    }
}

/// Named parameters handed to an interval detector for one invocation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionParams {
    pub method: String,
    pub min_len: usize,
    pub max_len: usize,
    pub alpha: f64,
    pub mode: KlMode,
    pub kernel_sigma_sq: f64,
    pub preprocessing: Option<String>,
    pub num_intervals: usize,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            method: String::new(),
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
            alpha: DEFAULT_ALPHA,
            mode: KlMode::default(),
            kernel_sigma_sq: DEFAULT_KERNEL_SIGMA_SQ,
            preprocessing: None,
            num_intervals: DEFAULT_NUM_INTERVALS,
        }
    }
}

impl DetectionParams {
    /// Checks the numeric parameters; identifiers are checked against registries elsewhere.
    pub fn validate(&self) -> Result<(), MdiError> {
        if self.min_len == 0 {
            return Err(MdiError::invalid_configuration(
                "min_len must be >= 1; got 0",
            ));
        }
        if self.min_len > self.max_len {
            return Err(MdiError::invalid_configuration(format!(
                "min_len={} must be <= max_len={}",
                self.min_len, self.max_len
            )));
        }
        if !self.kernel_sigma_sq.is_finite() || self.kernel_sigma_sq <= 0.0 {
            return Err(MdiError::invalid_configuration(format!(
                "kernel_sigma_sq must be finite and > 0.0; got {}",
                self.kernel_sigma_sq
            )));
        }
        if !self.alpha.is_finite() {
            return Err(MdiError::invalid_configuration(format!(
                "alpha must be finite; got {}",
                self.alpha
            )));
        }
        if self.num_intervals == 0 {
            return Err(MdiError::invalid_configuration(
                "num_intervals must be >= 1; got 0",
            ));
        }
        Ok(())
    }
}
