// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::fmt;

/// Error type shared by every mdi-rs crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MdiError {
    /// Run parameters are unsupported or inconsistent.
    InvalidConfiguration(String),
    /// A loaded corpus violates its alignment invariants.
    CorpusIntegrity(String),
    /// A metric is undefined for the given inputs (e.g. single-class labels).
    UndefinedMetric(String),
    /// The interval detector (or its pre-processing step) failed for one signal.
    DetectorFailure(String),
    /// Malformed arguments passed to a library function.
    InvalidInput(String),
    /// A computation produced a non-finite intermediate value.
    NumericalIssue(String),
    /// The input exceeds a size the implementation supports.
    ResourceLimit(String),
}

impl MdiError {
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn corpus_integrity(msg: impl Into<String>) -> Self {
        Self::CorpusIntegrity(msg.into())
    }

    pub fn undefined_metric(msg: impl Into<String>) -> Self {
        Self::UndefinedMetric(msg.into())
    }

    pub fn detector_failure(msg: impl Into<String>) -> Self {
        Self::DetectorFailure(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    pub fn resource_limit(msg: impl Into<String>) -> Self {
        Self::ResourceLimit(msg.into())
    }

    /// Stable snake-case identifier used in structured error output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::CorpusIntegrity(_) => "corpus_integrity",
            Self::UndefinedMetric(_) => "undefined_metric",
            Self::DetectorFailure(_) => "detector_failure",
            Self::InvalidInput(_) => "invalid_input",
            Self::NumericalIssue(_) => "numerical_issue",
            Self::ResourceLimit(_) => "resource_limit",
        }
    }

    /// Returns true for errors that abort a whole run rather than one signal.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_) | Self::CorpusIntegrity(_)
        )
    }

    /// Wraps any error raised while running a detector as a [`MdiError::DetectorFailure`].
    ///
    /// Errors that already are detector failures are returned unchanged.
    pub fn into_detector_failure(self, context: &str) -> Self {
        match self {
            Self::DetectorFailure(_) => self,
            other => Self::DetectorFailure(format!("{context}: {other}")),
        }
    }
}

impl fmt::Display for MdiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration(msg) => write!(f, "invalid configuration: {msg}"),
            Self::CorpusIntegrity(msg) => write!(f, "corpus integrity error: {msg}"),
            Self::UndefinedMetric(msg) => write!(f, "undefined metric: {msg}"),
            Self::DetectorFailure(msg) => write!(f, "detector failure: {msg}"),
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::NumericalIssue(msg) => write!(f, "numerical issue: {msg}"),
            Self::ResourceLimit(msg) => write!(f, "resource limit: {msg}"),
        }
    }
}

impl std::error::Error for MdiError {}
