// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use mdi_core::{GroundTruth, MdiError, Signal};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One signal with its index-aligned ground truth.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledSignal {
    pub signal: Signal,
    pub truth: GroundTruth,
}

/// Labeled signals partitioned by extremity type.
///
/// Groups iterate in lexical name order. A corpus is immutable once loaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Corpus {
    groups: BTreeMap<String, Vec<LabeledSignal>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CorpusWire {
    #[serde(alias = "f")]
    signals: BTreeMap<String, Vec<Vec<Vec<f64>>>>,
    #[serde(alias = "y")]
    labels: BTreeMap<String, Vec<Vec<LabelWire>>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelWire {
    Flag(bool),
    Number(f64),
}

impl LabelWire {
    fn to_label(&self) -> Option<u8> {
        match *self {
            Self::Flag(flag) => Some(u8::from(flag)),
            Self::Number(value) if value == 0.0 => Some(0),
            Self::Number(value) if value == 1.0 => Some(1),
            Self::Number(_) => None,
        }
    }
}

impl Corpus {
    /// Builds a corpus from already validated groups.
    pub fn from_groups(groups: BTreeMap<String, Vec<LabeledSignal>>) -> Result<Self, MdiError> {
        for (name, samples) in &groups {
            for (index, sample) in samples.iter().enumerate() {
                if sample.truth.len() != sample.signal.n() {
                    return Err(MdiError::corpus_integrity(format!(
                        "group '{name}' signal {index}: {} labels for {} timesteps",
                        sample.truth.len(),
                        sample.signal.n()
                    )));
                }
            }
        }
        Ok(Self { groups })
    }

    /// Parses the JSON corpus format.
    ///
    /// The document has two objects keyed by group name: `signals` (alias
    /// `f`), a list of `D x T` matrices, and `labels` (alias `y`), a list of
    /// length-`T` label sequences of `0`/`1` or booleans.
    pub fn from_json_str(raw: &str) -> Result<Self, MdiError> {
        let wire: CorpusWire = serde_json::from_str(raw)
            .map_err(|err| MdiError::corpus_integrity(format!("malformed corpus JSON: {err}")))?;
        Self::from_wire(wire)
    }

    pub fn load_json(path: &Path) -> Result<Self, MdiError> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            MdiError::corpus_integrity(format!(
                "failed to read corpus '{}': {err}",
                path.display()
            ))
        })?;
        Self::from_json_str(&raw)
    }

    fn from_wire(wire: CorpusWire) -> Result<Self, MdiError> {
        let CorpusWire {
            signals,
            mut labels,
        } = wire;

        if let Some(orphan) = labels.keys().find(|name| !signals.contains_key(*name)) {
            return Err(MdiError::corpus_integrity(format!(
                "group '{orphan}' has labels but no signals"
            )));
        }

        let mut groups = BTreeMap::new();
        for (name, raw_signals) in signals {
            let raw_labels = labels.remove(&name).ok_or_else(|| {
                MdiError::corpus_integrity(format!("group '{name}' has signals but no labels"))
            })?;
            if raw_signals.len() != raw_labels.len() {
                return Err(MdiError::corpus_integrity(format!(
                    "group '{name}' has {} signals but {} label sequences",
                    raw_signals.len(),
                    raw_labels.len()
                )));
            }

            let mut samples = Vec::with_capacity(raw_signals.len());
            for (index, (rows, raw_truth)) in raw_signals.iter().zip(raw_labels.iter()).enumerate()
            {
                samples.push(labeled_signal(&name, index, rows, raw_truth)?);
            }
            groups.insert(name, samples);
        }

        Self::from_groups(groups)
    }

    /// Groups in iteration order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[LabeledSignal])> {
        self.groups
            .iter()
            .map(|(name, samples)| (name.as_str(), samples.as_slice()))
    }

    pub fn group(&self, name: &str) -> Option<&[LabeledSignal]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    /// Total number of signals across groups.
    pub fn signal_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn labeled_signal(
    group: &str,
    index: usize,
    rows: &[Vec<f64>],
    raw_truth: &[LabelWire],
) -> Result<LabeledSignal, MdiError> {
    let signal = Signal::from_rows(rows).map_err(|err| {
        MdiError::corpus_integrity(format!("group '{group}' signal {index}: {err}"))
    })?;

    let labels = raw_truth
        .iter()
        .enumerate()
        .map(|(t, label)| {
            label.to_label().ok_or_else(|| {
                MdiError::corpus_integrity(format!(
                    "group '{group}' signal {index}: label at t={t} is not 0/1"
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if labels.len() != signal.n() {
        return Err(MdiError::corpus_integrity(format!(
            "group '{group}' signal {index}: {} labels for {} timesteps",
            labels.len(),
            signal.n()
        )));
    }
    let truth = GroundTruth::new(labels).map_err(|err| {
        MdiError::corpus_integrity(format!("group '{group}' signal {index}: {err}"))
    })?;

    Ok(LabeledSignal { signal, truth })
}

#[cfg(test)]
mod tests {
    use super::Corpus;

    const SMALL: &str = r#"{
        "signals": {
            "meander": [[[0.0, 1.0, 2.0, 3.0]], [[1.0, 1.0, 1.0, 1.0]]],
            "amplitude_change": [[[0.0, 0.5, 0.0], [1.0, 1.5, 1.0]]]
        },
        "labels": {
            "meander": [[0, 1, 1, 0], [false, false, true, true]],
            "amplitude_change": [[0.0, 1.0, 0.0]]
        }
    }"#;

    #[test]
    fn parses_groups_in_lexical_order() {
        let corpus = Corpus::from_json_str(SMALL).expect("corpus should parse");
        assert_eq!(corpus.group_names(), vec!["amplitude_change", "meander"]);
        assert_eq!(corpus.signal_count(), 3);

        let amplitude = corpus.group("amplitude_change").expect("group should exist");
        assert_eq!(amplitude[0].signal.d(), 2);
        assert_eq!(amplitude[0].signal.n(), 3);
        assert_eq!(amplitude[0].signal.step(1), &[0.5, 1.5]);
        assert_eq!(amplitude[0].truth.labels(), &[0, 1, 0]);

        let meander = corpus.group("meander").expect("group should exist");
        assert_eq!(meander[1].truth.labels(), &[0, 0, 1, 1]);
    }

    #[test]
    fn accepts_short_key_aliases() {
        let corpus = Corpus::from_json_str(r#"{"f": {"g": [[[1.0, 2.0]]]}, "y": {"g": [[0, 1]]}}"#)
            .expect("aliased corpus should parse");
        assert_eq!(corpus.group_names(), vec!["g"]);
    }

    fn assert_integrity_error(raw: &str, needle: &str) {
        let err = Corpus::from_json_str(raw).expect_err("corpus must be rejected");
        assert_eq!(err.code(), "corpus_integrity", "{err}");
        assert!(err.to_string().contains(needle), "{err}");
    }

    #[test]
    fn rejects_mismatched_group_keys() {
        assert_integrity_error(
            r#"{"signals": {"a": [[[1.0]]]}, "labels": {"b": [[0]]}}"#,
            "group 'b' has labels but no signals",
        );
        assert_integrity_error(
            r#"{"signals": {"a": [[[1.0]]], "b": [[[1.0]]]}, "labels": {"a": [[0]]}}"#,
            "group 'b' has signals but no labels",
        );
    }

    #[test]
    fn rejects_mismatched_list_and_label_lengths() {
        assert_integrity_error(
            r#"{"signals": {"a": [[[1.0]], [[2.0]]]}, "labels": {"a": [[0]]}}"#,
            "2 signals but 1 label sequences",
        );
        assert_integrity_error(
            r#"{"signals": {"a": [[[1.0, 2.0, 3.0]]]}, "labels": {"a": [[0, 1]]}}"#,
            "2 labels for 3 timesteps",
        );
    }

    #[test]
    fn rejects_non_binary_labels_and_ragged_signals() {
        assert_integrity_error(
            r#"{"signals": {"a": [[[1.0, 2.0]]]}, "labels": {"a": [[0, 2]]}}"#,
            "label at t=1 is not 0/1",
        );
        assert_integrity_error(
            r#"{"signals": {"a": [[[1.0, 2.0], [1.0]]]}, "labels": {"a": [[0, 1]]}}"#,
            "ragged signal rows",
        );
        assert_integrity_error(
            r#"{"signals": {"a": [[]]}, "labels": {"a": [[]]}}"#,
            "d must be >= 1",
        );
    }

    #[test]
    fn rejects_malformed_json() {
        assert_integrity_error(r#"{"signals": {}"#, "malformed corpus JSON");
        assert_integrity_error(r#"{"signals": {}, "labels": {}, "extra": 1}"#, "malformed corpus JSON");
    }

    #[test]
    fn empty_corpus_is_valid() {
        let corpus = Corpus::from_json_str(r#"{"signals": {}, "labels": {}}"#)
            .expect("empty corpus should parse");
        assert!(corpus.is_empty());
    }
}
