// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use mdi_core::{DetectionParams, Interval, IntervalDetector, MdiError, Signal};
use mdi_eval::reconstruct_scores;
use mdi_harness::{
    BenchConfig, CollectingHook, Corpus, ExecutionMode, NoopHook, Registry, SignalStatus,
    render_text_report, run_benchmark,
};
use serde_json::json;
use std::sync::Arc;

const T: usize = 100;

/// Always reports the planted extreme `[30, 50)` plus two background ranges.
struct PlantedDetector;

impl IntervalDetector for PlantedDetector {
    fn name(&self) -> &'static str {
        "planted"
    }

    fn detect(&self, _x: &Signal, params: &DetectionParams) -> Result<Vec<Interval>, MdiError> {
        let mut intervals = vec![
            Interval::new(30, 50, 1.0),
            Interval::new(0, 10, 0.5),
            Interval::new(80, 90, 0.25),
        ];
        intervals.truncate(params.num_intervals);
        Ok(intervals)
    }
}

struct SilentDetector;

impl IntervalDetector for SilentDetector {
    fn name(&self) -> &'static str {
        "silent"
    }

    fn detect(&self, _x: &Signal, _params: &DetectionParams) -> Result<Vec<Interval>, MdiError> {
        Ok(vec![])
    }
}

/// Fails whenever the first sample of the signal is negative.
struct FlakyDetector;

impl IntervalDetector for FlakyDetector {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn detect(&self, x: &Signal, _params: &DetectionParams) -> Result<Vec<Interval>, MdiError> {
        if x.value(0, 0) < 0.0 {
            return Err(MdiError::numerical_issue("first sample is negative"));
        }
        Ok(vec![Interval::new(30, 50, 1.0)])
    }
}

fn signal_row(offset: f64) -> Vec<f64> {
    (0..T)
        .map(|t| {
            let bump = if (30..50).contains(&t) { 3.0 } else { 0.0 };
            offset + bump + ((t * 37) % 11) as f64 * 0.05
        })
        .collect()
}

fn planted_labels() -> Vec<u8> {
    (0..T).map(|t| u8::from((30..50).contains(&t))).collect()
}

fn corpus() -> Corpus {
    let raw = json!({
        "signals": {
            "meander": [[signal_row(0.0)], [signal_row(1.0)], [signal_row(-1.0)]],
            "amplitude_change": [[signal_row(0.0), signal_row(2.0)]],
            "flat": [[vec![0.0; T]]],
        },
        "labels": {
            "meander": [planted_labels(), planted_labels(), planted_labels()],
            "amplitude_change": [planted_labels()],
            "flat": [vec![0u8; T]],
        }
    });
    Corpus::from_json_str(&raw.to_string()).expect("test corpus should load")
}

fn registry() -> Registry {
    let mut registry = Registry::builtin();
    registry.register_detector(Arc::new(PlantedDetector));
    registry.register_detector(Arc::new(SilentDetector));
    registry.register_detector(Arc::new(FlakyDetector));
    registry
}

fn config(method: &str) -> BenchConfig {
    BenchConfig {
        params: DetectionParams {
            method: method.to_string(),
            ..DetectionParams::default()
        },
        ..BenchConfig::default()
    }
}

#[test]
fn planted_detector_scores_perfect_auc() {
    let report = run_benchmark(&corpus(), &registry(), &config("planted"), &mut NoopHook)
        .expect("benchmark should run");

    let meander = report.group("meander").expect("meander should be reported");
    assert_eq!(meander.signals.len(), 3);
    for outcome in &meander.signals {
        assert_eq!(outcome.status, SignalStatus::Scored { auc: 1.0 });
        let scores = reconstruct_scores(T, &outcome.intervals).expect("scores should rebuild");
        assert!(scores[30..50].iter().all(|score| *score == 1.0));
        assert_eq!(scores[50], 0.0);
    }
    assert_eq!(meander.summary.count, 3);
    assert_eq!(meander.summary.mean, Some(1.0));
    assert_eq!(meander.summary.std_dev, Some(0.0));
}

#[test]
fn groups_follow_corpus_order_and_single_class_is_undefined() {
    let report = run_benchmark(&corpus(), &registry(), &config("planted"), &mut NoopHook)
        .expect("benchmark should run");
    let names = report
        .groups
        .iter()
        .map(|group| group.group.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["amplitude_change", "flat", "meander"]);

    let flat = report.group("flat").expect("flat should be reported");
    assert!(matches!(flat.signals[0].status, SignalStatus::Undefined { .. }));
    assert_eq!(flat.summary.count, 0);
    assert_eq!(flat.summary.undefined, 1);
    assert!(flat.summary.mean.is_none());
}

#[test]
fn empty_detections_give_chance_level_auc() {
    let mut config = config("silent");
    config.extreme_types = vec!["meander".to_string()];
    let report = run_benchmark(&corpus(), &registry(), &config, &mut NoopHook)
        .expect("benchmark should run");
    let meander = report.group("meander").expect("meander should be reported");
    for outcome in &meander.signals {
        assert!(outcome.intervals.is_empty());
        assert_eq!(outcome.status, SignalStatus::Scored { auc: 0.5 });
    }
}

#[test]
fn failing_signal_is_skipped_and_excluded_from_summary() {
    let mut config = config("flaky");
    config.extreme_types = vec!["meander".to_string()];
    let report = run_benchmark(&corpus(), &registry(), &config, &mut NoopHook)
        .expect("benchmark should run");

    let meander = report.group("meander").expect("meander should be reported");
    assert!(matches!(
        meander.signals[2].status,
        SignalStatus::DetectorFailed { .. }
    ));
    assert_eq!(meander.summary.count, 2);
    assert_eq!(meander.summary.failed, 1);
    assert_eq!(meander.summary.mean, Some(1.0));

    let text = render_text_report(&report);
    assert!(text.contains("skipped meander[2]"), "{text}");
    assert!(text.contains("meander: 1 (+/- 0) [undefined=0, failed=1]"), "{text}");
}

#[test]
fn group_filter_limits_evaluated_groups() {
    let mut config = config("planted");
    config.extreme_types = vec!["amplitude_change".to_string(), "missing".to_string()];
    let report = run_benchmark(&corpus(), &registry(), &config, &mut NoopHook)
        .expect("benchmark should run");
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].group, "amplitude_change");
}

#[test]
fn hook_sees_first_num_intervals_only_when_visualizing() {
    let mut config = config("planted");
    config.extreme_types = vec!["amplitude_change".to_string()];
    config.params.num_intervals = 2;

    let mut hook = CollectingHook::default();
    let report =
        run_benchmark(&corpus(), &registry(), &config, &mut hook).expect("benchmark should run");
    assert_eq!(report.groups[0].signals[0].intervals.len(), 2);
    assert_eq!(
        hook.seen,
        vec![
            ("amplitude_change".to_string(), 0, Interval::new(30, 50, 1.0)),
            ("amplitude_change".to_string(), 0, Interval::new(0, 10, 0.5)),
        ]
    );

    config.visualize = false;
    let mut hook = CollectingHook::default();
    run_benchmark(&corpus(), &registry(), &config, &mut hook).expect("benchmark should run");
    assert!(hook.seen.is_empty());
}

#[test]
fn invalid_configuration_aborts_before_any_signal() {
    let mut hook = CollectingHook::default();
    let err = run_benchmark(&corpus(), &registry(), &config("unknown"), &mut hook)
        .expect_err("unknown method must fail");
    assert_eq!(err.code(), "invalid_configuration");
    assert!(hook.seen.is_empty());

    let mut config = config("planted");
    config.params.min_len = 60;
    let err = run_benchmark(&corpus(), &registry(), &config, &mut NoopHook)
        .expect_err("min > max must fail");
    assert!(err.is_fatal());
}

#[test]
fn reference_detector_runs_end_to_end() {
    let mut config = config("gaussian_id_cov");
    config.params.preprocessing = Some("normalize".to_string());
    config.params.num_intervals = 1;
    config.extreme_types = vec!["meander".to_string()];
    let report = run_benchmark(&corpus(), &registry(), &config, &mut NoopHook)
        .expect("benchmark should run");
    let meander = report.group("meander").expect("meander should be reported");
    for outcome in &meander.signals {
        let auc = outcome.status.auc().expect("signal should be scored");
        assert!(auc > 0.9, "auc={auc}");
    }
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_execution_matches_sequential() {
    let sequential = run_benchmark(&corpus(), &registry(), &config("flaky"), &mut NoopHook)
        .expect("sequential run should succeed");
    let mut parallel_config = config("flaky");
    parallel_config.execution = ExecutionMode::Parallel;
    let parallel = run_benchmark(&corpus(), &registry(), &parallel_config, &mut NoopHook)
        .expect("parallel run should succeed");
    assert_eq!(sequential, parallel);
}

#[cfg(not(feature = "rayon"))]
#[test]
fn parallel_execution_requires_rayon_feature() {
    let mut config = config("planted");
    config.execution = ExecutionMode::Parallel;
    let err = run_benchmark(&corpus(), &registry(), &config, &mut NoopHook)
        .expect_err("parallel mode must fail without rayon");
    assert!(err.to_string().contains("rayon"));
}
