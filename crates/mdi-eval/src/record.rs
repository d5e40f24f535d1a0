// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::mean_and_std;
use mdi_core::MdiError;

/// AUC values collected for one extremity group, in recording order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupAucs {
    pub group: String,
    pub aucs: Vec<f64>,
    pub undefined: usize,
    pub failed: usize,
}

/// Per-group summary: mean and population standard deviation of the AUCs.
///
/// `mean` and `std_dev` are `None` when no signal in the group produced a
/// defined AUC.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AucSummary {
    pub group: String,
    pub count: usize,
    pub undefined: usize,
    pub failed: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

impl AucSummary {
    pub fn from_values(group: impl Into<String>, values: &[f64]) -> Self {
        let (mean, std_dev) = match mean_and_std(values) {
            Ok((mean, std_dev)) => (Some(mean), Some(std_dev)),
            Err(_) => (None, None),
        };
        Self {
            group: group.into(),
            count: values.len(),
            undefined: 0,
            failed: 0,
            mean,
            std_dev,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.mean.is_some()
    }
}

/// Append-only mapping from group name to recorded AUC values.
///
/// Groups keep the order in which they were first registered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AucRecord {
    groups: Vec<GroupAucs>,
}

impl AucRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `group` if it is not known yet; returns its position.
    pub fn ensure_group(&mut self, group: &str) -> usize {
        if let Some(index) = self.position(group) {
            return index;
        }
        self.groups.push(GroupAucs {
            group: group.to_string(),
            ..GroupAucs::default()
        });
        self.groups.len() - 1
    }

    pub fn record_auc(&mut self, group: &str, auc: f64) -> Result<(), MdiError> {
        if !auc.is_finite() || !(0.0..=1.0).contains(&auc) {
            return Err(MdiError::invalid_input(format!(
                "auc must be within [0, 1]; got {auc} for group '{group}'"
            )));
        }
        let index = self.ensure_group(group);
        self.groups[index].aucs.push(auc);
        Ok(())
    }

    /// Counts a signal whose AUC could not be computed.
    pub fn record_undefined(&mut self, group: &str) {
        let index = self.ensure_group(group);
        self.groups[index].undefined += 1;
    }

    /// Counts a signal skipped because its detector failed.
    pub fn record_failed(&mut self, group: &str) {
        let index = self.ensure_group(group);
        self.groups[index].failed += 1;
    }

    pub fn aucs(&self, group: &str) -> Option<&[f64]> {
        self.position(group)
            .map(|index| self.groups[index].aucs.as_slice())
    }

    pub fn groups(&self) -> &[GroupAucs] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn summaries(&self) -> Vec<AucSummary> {
        self.groups
            .iter()
            .map(|entry| AucSummary {
                undefined: entry.undefined,
                failed: entry.failed,
                ..AucSummary::from_values(entry.group.as_str(), entry.aucs.as_slice())
            })
            .collect()
    }

    fn position(&self, group: &str) -> Option<usize> {
        self.groups.iter().position(|entry| entry.group == group)
    }
}

#[cfg(test)]
mod tests {
    use super::{AucRecord, AucSummary};

    #[test]
    fn summary_of_three_aucs_matches_hand_computation() {
        let summary = AucSummary::from_values("meander", &[0.9, 0.8, 0.7]);
        assert_eq!(summary.count, 3);
        let mean = summary.mean.expect("mean should be defined");
        let std_dev = summary.std_dev.expect("std should be defined");
        assert!((mean - 0.8).abs() < 1e-12);
        assert!((std_dev - 0.081_649_658_092_772_6).abs() < 1e-12);
    }

    #[test]
    fn summary_of_empty_group_is_undefined() {
        let summary = AucSummary::from_values("empty", &[]);
        assert_eq!(summary.count, 0);
        assert!(!summary.is_defined());
        assert!(summary.std_dev.is_none());
    }

    #[test]
    fn record_keeps_first_registration_order() {
        let mut record = AucRecord::new();
        record.ensure_group("mixed");
        record
            .record_auc("amplitude_change", 0.75)
            .expect("auc should record");
        record.record_auc("mixed", 1.0).expect("auc should record");
        record.record_undefined("meander");
        record.record_failed("mixed");

        let names = record
            .groups()
            .iter()
            .map(|entry| entry.group.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["mixed", "amplitude_change", "meander"]);
        assert_eq!(record.aucs("mixed"), Some(&[1.0][..]));
        assert_eq!(record.aucs("unknown"), None);

        let summaries = record.summaries();
        assert_eq!(summaries[0].failed, 1);
        assert_eq!(summaries[2].undefined, 1);
        assert!(!summaries[2].is_defined());
    }

    #[test]
    fn record_rejects_auc_outside_unit_interval() {
        let mut record = AucRecord::new();
        let err = record
            .record_auc("mixed", 1.5)
            .expect_err("auc > 1 must fail");
        assert!(err.to_string().contains("within [0, 1]"));
        assert!(record.is_empty());
    }
}
