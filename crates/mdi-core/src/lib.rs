// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod detectors;
pub mod error;
pub mod interval;
pub mod params;
pub mod signal;

pub use detectors::{IntervalDetector, Preprocessor, detect_with_preprocessing};
pub use error::MdiError;
pub use interval::{Interval, validate_intervals};
pub use params::{
    DEFAULT_ALPHA, DEFAULT_KERNEL_SIGMA_SQ, DEFAULT_MAX_LEN, DEFAULT_MIN_LEN,
    DEFAULT_NUM_INTERVALS, DetectionParams, KlMode,
};
pub use signal::{GroundTruth, Signal};

/// Core shared types and traits for mdi-rs.
pub fn crate_name() -> &'static str {
    "mdi-core"
}
