// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use mdi_core::{DetectionParams, Interval, MdiError};
use mdi_eval::AucSummary;
use serde::Serialize;
use std::fmt::Write as _;

/// Result of evaluating one signal.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignalStatus {
    Scored { auc: f64 },
    Undefined { reason: String },
    DetectorFailed { code: String, message: String },
}

impl SignalStatus {
    pub(crate) fn failed(err: &MdiError) -> Self {
        Self::DetectorFailed {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn auc(&self) -> Option<f64> {
        match self {
            Self::Scored { auc } => Some(*auc),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignalOutcome {
    /// Position of the signal within its group.
    pub index: usize,
    /// Intervals in detector order; empty when the detector failed.
    pub intervals: Vec<Interval>,
    #[serde(flatten)]
    pub status: SignalStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupReport {
    pub group: String,
    pub signals: Vec<SignalOutcome>,
    pub summary: AucSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub params: DetectionParams,
    pub groups: Vec<GroupReport>,
}

impl BenchmarkReport {
    pub fn group(&self, name: &str) -> Option<&GroupReport> {
        self.groups.iter().find(|group| group.group == name)
    }

    pub fn to_json_pretty(&self) -> Result<String, MdiError> {
        serde_json::to_string_pretty(self).map_err(|err| {
            MdiError::invalid_input(format!("failed to serialize benchmark report: {err}"))
        })
    }
}

/// Human-readable report: region lines and the AUC for every signal, then
/// one `group: mean (+/- std)` line per group.
pub fn render_text_report(report: &BenchmarkReport) -> String {
    let mut out = String::new();
    for group in &report.groups {
        for outcome in &group.signals {
            let total = outcome.intervals.len();
            for (rank, interval) in outcome.intervals.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "Region {rank}/{total}: {} - {}",
                    interval.start, interval.end
                );
            }
            match &outcome.status {
                SignalStatus::Scored { auc } => {
                    let _ = writeln!(out, "AUC: {auc}");
                }
                SignalStatus::Undefined { reason } => {
                    let _ = writeln!(out, "AUC: undefined ({reason})");
                }
                SignalStatus::DetectorFailed { message, .. } => {
                    let _ = writeln!(out, "skipped {}[{}]: {message}", group.group, outcome.index);
                }
            }
        }
    }

    for group in &report.groups {
        let summary = &group.summary;
        match (summary.mean, summary.std_dev) {
            (Some(mean), Some(std_dev)) => {
                let _ = write!(out, "{}: {mean} (+/- {std_dev})", group.group);
            }
            _ => {
                let _ = write!(out, "{}: undefined", group.group);
            }
        }
        if summary.undefined > 0 || summary.failed > 0 {
            let _ = write!(
                out,
                " [undefined={}, failed={}]",
                summary.undefined, summary.failed
            );
        }
        out.push('\n');
    }
    out
}
