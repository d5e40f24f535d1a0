// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::config::{BenchConfig, ExecutionMode};
use crate::corpus::{Corpus, LabeledSignal};
use crate::hook::{IntervalContext, IntervalHook};
use crate::registry::Registry;
use crate::report::{BenchmarkReport, GroupReport, SignalOutcome, SignalStatus};
use mdi_core::{
    DetectionParams, IntervalDetector, MdiError, Preprocessor, detect_with_preprocessing,
    validate_intervals,
};
use mdi_eval::{AucRecord, interval_auc};
use tracing::{debug, info, warn};

/// Runs detection, contract checks, reconstruction and ROC-AUC for one signal.
///
/// Never fails: detector errors and contract violations become
/// [`SignalStatus::DetectorFailed`], single-class labels become
/// [`SignalStatus::Undefined`].
pub fn evaluate_signal(
    detector: &dyn IntervalDetector,
    preprocessor: Option<&dyn Preprocessor>,
    sample: &LabeledSignal,
    params: &DetectionParams,
    index: usize,
) -> SignalOutcome {
    let detected = detect_with_preprocessing(detector, preprocessor, &sample.signal, params)
        .and_then(|intervals| {
            validate_intervals(sample.signal.n(), &intervals)?;
            Ok(intervals)
        })
        .map_err(|err| err.into_detector_failure(detector.name()));

    let intervals = match detected {
        Ok(intervals) => intervals,
        Err(err) => {
            return SignalOutcome {
                index,
                intervals: vec![],
                status: SignalStatus::failed(&err),
            };
        }
    };

    let status = match interval_auc(&sample.truth, &intervals) {
        Ok(auc) => SignalStatus::Scored { auc },
        Err(MdiError::UndefinedMetric(reason)) => SignalStatus::Undefined { reason },
        Err(err) => SignalStatus::failed(&err.into_detector_failure(detector.name())),
    };

    SignalOutcome {
        index,
        intervals,
        status,
    }
}

/// Evaluates every selected group of `corpus` and summarizes AUCs per group.
///
/// Configuration errors abort before any signal is processed; per-signal
/// failures are recorded in the report and excluded from the summaries.
pub fn run_benchmark(
    corpus: &Corpus,
    registry: &Registry,
    config: &BenchConfig,
    hook: &mut dyn IntervalHook,
) -> Result<BenchmarkReport, MdiError> {
    config.validate(registry)?;
    let detector = registry.detector(&config.params.method)?;
    let preprocessor = config
        .params
        .preprocessing
        .as_deref()
        .map(|name| registry.preprocessor(name))
        .transpose()?;

    for requested in &config.extreme_types {
        if corpus.group(requested).is_none() {
            warn!(group = %requested, "requested extreme type is not in the corpus");
        }
    }

    let mut record = AucRecord::new();
    let mut groups = vec![];
    for (group, samples) in corpus.groups() {
        if !config.selects(group) {
            continue;
        }
        info!(group, signals = samples.len(), method = detector.name(), "evaluating group");
        record.ensure_group(group);

        let outcomes = evaluate_group(
            detector.as_ref(),
            preprocessor.as_deref(),
            samples,
            &config.params,
            config.execution,
        );

        for (sample, outcome) in samples.iter().zip(outcomes.iter()) {
            let total = outcome.intervals.len();
            for (rank, interval) in outcome.intervals.iter().enumerate() {
                debug!(
                    group,
                    signal = outcome.index,
                    region = rank,
                    total,
                    start = interval.start,
                    end = interval.end,
                    score = interval.score,
                    "region"
                );
                if config.visualize && rank < config.params.num_intervals {
                    hook.on_interval(&IntervalContext {
                        group,
                        signal_index: outcome.index,
                        rank,
                        total,
                        interval,
                        signal: &sample.signal,
                    });
                }
            }

            match &outcome.status {
                SignalStatus::Scored { auc } => {
                    debug!(group, signal = outcome.index, auc, "signal scored");
                    record.record_auc(group, *auc)?;
                }
                SignalStatus::Undefined { reason } => {
                    warn!(group, signal = outcome.index, reason = %reason, "AUC undefined; excluded from summary");
                    record.record_undefined(group);
                }
                SignalStatus::DetectorFailed { code, message } => {
                    warn!(group, signal = outcome.index, code = %code, error = %message, "skipping signal");
                    record.record_failed(group);
                }
            }
        }

        groups.push((group.to_string(), outcomes));
    }

    let summaries = record.summaries();
    let groups = groups
        .into_iter()
        .zip(summaries)
        .map(|((group, signals), summary)| {
            info!(
                group = %group,
                count = summary.count,
                mean = ?summary.mean,
                std_dev = ?summary.std_dev,
                undefined = summary.undefined,
                failed = summary.failed,
                "group summary"
            );
            GroupReport {
                group,
                signals,
                summary,
            }
        })
        .collect();

    Ok(BenchmarkReport {
        params: config.params.clone(),
        groups,
    })
}

fn evaluate_group(
    detector: &dyn IntervalDetector,
    preprocessor: Option<&dyn Preprocessor>,
    samples: &[LabeledSignal],
    params: &DetectionParams,
    execution: ExecutionMode,
) -> Vec<SignalOutcome> {
    match execution {
        #[cfg(feature = "rayon")]
        ExecutionMode::Parallel => {
            use rayon::prelude::*;
            samples
                .par_iter()
                .enumerate()
                .map(|(index, sample)| evaluate_signal(detector, preprocessor, sample, params, index))
                .collect()
        }
        _ => samples
            .iter()
            .enumerate()
            .map(|(index, sample)| evaluate_signal(detector, preprocessor, sample, params, index))
            .collect(),
    }
}
