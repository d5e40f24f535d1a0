// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod record;

pub use record::{AucRecord, AucSummary, GroupAucs};

use mdi_core::{GroundTruth, Interval, MdiError};

/// Point on a ROC curve at one score threshold.
///
/// A timestep is predicted extreme when its score is `>= threshold`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RocPoint {
    pub threshold: f64,
    pub true_positive_rate: f64,
    pub false_positive_rate: f64,
    pub true_positives: usize,
    pub false_positives: usize,
}

/// Builds the dense per-timestep score vector for a signal of length `n`.
///
/// Intervals are applied in the given order and each one overwrites
/// `[start, end)`, so on overlaps the later interval wins. Timesteps outside
/// every interval score `0.0`. Empty intervals are no-ops.
pub fn reconstruct_scores(n: usize, intervals: &[Interval]) -> Result<Vec<f64>, MdiError> {
    let mut scores = vec![0.0; n];
    for (index, interval) in intervals.iter().enumerate() {
        if interval.start > interval.end || interval.end > n {
            return Err(MdiError::invalid_input(format!(
                "intervals[{index}] = [{}, {}) does not fit a signal of length n={n}",
                interval.start, interval.end
            )));
        }
        scores[interval.start..interval.end].fill(interval.score);
    }
    Ok(scores)
}

/// Computes the ROC curve of `scores` against `truth`, label `1` positive.
///
/// Thresholds sweep the distinct score values in decreasing order, preceded
/// by a `+inf` threshold at the origin, so false-positive rates are
/// non-decreasing along the returned points.
pub fn roc_curve(truth: &GroundTruth, scores: &[f64]) -> Result<Vec<RocPoint>, MdiError> {
    validate_scored_labels(truth, scores)?;
    let positives = truth.positives();
    let negatives = truth.negatives();
    if positives == 0 || negatives == 0 {
        return Err(MdiError::undefined_metric(format!(
            "ROC is undefined for single-class ground truth (positives={positives}, negatives={negatives})"
        )));
    }

    let labels = truth.labels();
    let mut order = (0..scores.len()).collect::<Vec<_>>();
    order.sort_by(|&left, &right| scores[right].total_cmp(&scores[left]));

    let mut points = Vec::with_capacity(scores.len() + 1);
    points.push(RocPoint {
        threshold: f64::INFINITY,
        true_positive_rate: 0.0,
        false_positive_rate: 0.0,
        true_positives: 0,
        false_positives: 0,
    });

    let mut true_positives = 0usize;
    let mut false_positives = 0usize;
    for (rank, &idx) in order.iter().enumerate() {
        if labels[idx] == 1 {
            true_positives += 1;
        } else {
            false_positives += 1;
        }

        let is_last_of_tie = order
            .get(rank + 1)
            .is_none_or(|&next| scores[next] != scores[idx]);
        if is_last_of_tie {
            points.push(RocPoint {
                threshold: scores[idx],
                true_positive_rate: true_positives as f64 / positives as f64,
                false_positive_rate: false_positives as f64 / negatives as f64,
                true_positives,
                false_positives,
            });
        }
    }

    Ok(points)
}

/// Area under the ROC curve by trapezoidal integration over increasing FPR.
///
/// Ties between positive and negative timesteps contribute half credit, so
/// a constant score vector yields `0.5`. Single-class ground truth returns
/// [`MdiError::UndefinedMetric`].
pub fn roc_auc(truth: &GroundTruth, scores: &[f64]) -> Result<f64, MdiError> {
    let points = roc_curve(truth, scores)?;
    Ok(auc_from_points(points.as_slice()))
}

/// Trapezoidal area under a ROC curve ordered by non-decreasing FPR.
pub fn auc_from_points(points: &[RocPoint]) -> f64 {
    let area = points
        .windows(2)
        .map(|pair| {
            let width = pair[1].false_positive_rate - pair[0].false_positive_rate;
            width * (pair[1].true_positive_rate + pair[0].true_positive_rate) / 2.0
        })
        .sum::<f64>();
    area.clamp(0.0, 1.0)
}

/// Reconstructs scores from `intervals` and computes ROC-AUC against `truth`.
pub fn interval_auc(truth: &GroundTruth, intervals: &[Interval]) -> Result<f64, MdiError> {
    let scores = reconstruct_scores(truth.len(), intervals)?;
    roc_auc(truth, scores.as_slice())
}

/// Arithmetic mean and population standard deviation of `values`.
pub fn mean_and_std(values: &[f64]) -> Result<(f64, f64), MdiError> {
    if values.is_empty() {
        return Err(MdiError::undefined_metric(
            "mean and standard deviation are undefined for an empty sample",
        ));
    }
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values
        .iter()
        .map(|value| {
            let delta = value - mean;
            delta * delta
        })
        .sum::<f64>()
        / count;
    Ok((mean, variance.sqrt()))
}

fn validate_scored_labels(truth: &GroundTruth, scores: &[f64]) -> Result<(), MdiError> {
    if truth.len() != scores.len() {
        return Err(MdiError::invalid_input(format!(
            "labels and scores must have equal length; got labels={}, scores={}",
            truth.len(),
            scores.len()
        )));
    }
    if let Some((index, score)) = scores
        .iter()
        .copied()
        .enumerate()
        .find(|(_, score)| !score.is_finite())
    {
        return Err(MdiError::invalid_input(format!(
            "scores must be finite; scores[{index}]={score}"
        )));
    }
    Ok(())
}

/// Evaluation utilities crate name helper.
pub fn crate_name() -> &'static str {
    let _ = mdi_core::crate_name();
    "mdi-eval"
}
