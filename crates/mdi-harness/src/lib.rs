// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod config;
pub mod corpus;
pub mod diagnostics;
pub mod hook;
pub mod pipeline;
pub mod registry;
pub mod report;

pub use config::{BenchConfig, ExecutionMode};
pub use corpus::{Corpus, LabeledSignal};
pub use diagnostics::{DEFAULT_HISTOGRAM_BINS, IntervalHistogram, interval_histogram};
pub use hook::{CollectingHook, IntervalContext, IntervalHook, NoopHook};
pub use pipeline::{evaluate_signal, run_benchmark};
pub use registry::Registry;
pub use report::{BenchmarkReport, GroupReport, SignalOutcome, SignalStatus, render_text_report};

/// Benchmark orchestration namespace.
pub fn crate_name() -> &'static str {
    let _ = (
        mdi_core::crate_name(),
        mdi_eval::crate_name(),
        mdi_detect::crate_name(),
        mdi_preprocess::crate_name(),
    );
    "mdi-harness"
}
