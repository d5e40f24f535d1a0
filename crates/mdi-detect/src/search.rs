// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use mdi_core::{Interval, MdiError};
use tracing::debug;

/// Divergence of one candidate range from the rest of the series.
pub(crate) trait RangeScorer {
    fn score(&self, start: usize, end: usize) -> Result<f64, MdiError>;
}

/// Every `[start, end)` with `min_len <= end - start <= max_len` that leaves
/// at least one timestep outside the range.
pub fn dense_proposals(n: usize, min_len: usize, max_len: usize) -> Vec<(usize, usize)> {
    let longest = max_len.min(n.saturating_sub(1));
    let mut proposals = vec![];
    for len in min_len.max(1)..=longest {
        for start in 0..=n - len {
            proposals.push((start, start + len));
        }
    }
    proposals
}

/// Greedy non-maximum suppression.
///
/// Candidates are visited by descending score; a candidate is dropped when
/// its IoU with an already accepted interval exceeds `overlap_threshold`.
/// A threshold of `0.0` drops any overlap. At most `limit` intervals are
/// returned, highest score first.
pub fn non_maximum_suppression(
    mut candidates: Vec<Interval>,
    overlap_threshold: f64,
    limit: usize,
) -> Vec<Interval> {
    candidates.sort_by(|left, right| {
        right
            .score
            .total_cmp(&left.score)
            .then_with(|| left.start.cmp(&right.start))
            .then_with(|| left.len().cmp(&right.len()))
    });

    let mut accepted: Vec<Interval> = Vec::with_capacity(limit.min(candidates.len()));
    for candidate in candidates {
        if accepted.len() >= limit {
            break;
        }
        let suppressed = accepted
            .iter()
            .any(|kept| kept.iou(&candidate) > overlap_threshold);
        if !suppressed {
            accepted.push(candidate);
        }
    }
    accepted
}

/// Scores every dense proposal and suppresses overlaps.
///
/// A proposal whose divergence is numerically undefined (singular
/// covariance, non-finite value) is dropped; the scan only fails when no
/// proposal survives.
pub(crate) fn scan<S: RangeScorer>(
    scorer: &S,
    n: usize,
    min_len: usize,
    max_len: usize,
    limit: usize,
) -> Result<Vec<Interval>, MdiError> {
    let proposals = dense_proposals(n, min_len, max_len);
    let total = proposals.len();
    let mut candidates = Vec::with_capacity(total);
    let mut last_issue = None;
    for (start, end) in proposals {
        let score = match scorer.score(start, end) {
            Ok(score) if score.is_finite() => score,
            Ok(score) => {
                last_issue = Some(format!(
                    "non-finite divergence {score} for range [{start}, {end})"
                ));
                continue;
            }
            Err(MdiError::NumericalIssue(msg)) => {
                last_issue = Some(format!("{msg} for range [{start}, {end})"));
                continue;
            }
            Err(err) => return Err(err),
        };
        candidates.push(Interval::new(start, end, score));
    }

    if let Some(issue) = last_issue {
        let dropped = total - candidates.len();
        if candidates.is_empty() {
            return Err(MdiError::numerical_issue(format!(
                "all {total} proposals were numerically undefined; last: {issue}"
            )));
        }
        debug!(dropped, total, last = %issue, "dropped numerically undefined proposals");
    }
    Ok(non_maximum_suppression(candidates, 0.0, limit))
}
