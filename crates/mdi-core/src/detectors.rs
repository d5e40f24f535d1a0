// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{DetectionParams, Interval, MdiError, Signal};

/// Interval detector contract: full signal in, ordered scored intervals out.
///
/// The returned order is significant: score reconstruction processes
/// intervals in this order and later intervals overwrite earlier ones.
pub trait IntervalDetector: Send + Sync {
    /// Registry identifier of this detector.
    fn name(&self) -> &'static str;

    fn detect(&self, x: &Signal, params: &DetectionParams) -> Result<Vec<Interval>, MdiError>;
}

/// Pre-processing contract: signal in, transformed signal out.
///
/// The number of timesteps must be preserved so labels stay aligned; the
/// number of attributes may change (e.g. time-delay embedding).
pub trait Preprocessor: Send + Sync {
    /// Registry identifier of this transform.
    fn name(&self) -> &'static str;

    fn apply(&self, x: &Signal) -> Result<Signal, MdiError>;
}

/// Runs `preprocessor` (if any) and then `detector`, enforcing that the
/// transform kept the timestep count.
pub fn detect_with_preprocessing(
    detector: &dyn IntervalDetector,
    preprocessor: Option<&dyn Preprocessor>,
    x: &Signal,
    params: &DetectionParams,
) -> Result<Vec<Interval>, MdiError> {
    let Some(preprocessor) = preprocessor else {
        return detector.detect(x, params);
    };

    let prepared = preprocessor.apply(x)?;
    if prepared.n() != x.n() {
        return Err(MdiError::detector_failure(format!(
            "preprocessing '{}' changed the number of timesteps: got {}, expected {}",
            preprocessor.name(),
            prepared.n(),
            x.n()
        )));
    }
    detector.detect(&prepared, params)
}

#[cfg(test)]
mod tests {
    use super::{IntervalDetector, Preprocessor, detect_with_preprocessing};
    use crate::{DetectionParams, Interval, MdiError, Signal};

    struct MaxValueDetector;

    impl IntervalDetector for MaxValueDetector {
        fn name(&self) -> &'static str {
            "max_value"
        }

        fn detect(&self, x: &Signal, _params: &DetectionParams) -> Result<Vec<Interval>, MdiError> {
            let (argmax, max) = x
                .values()
                .iter()
                .copied()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (t, v)| {
                    if v > best.1 { (t, v) } else { best }
                });
            Ok(vec![Interval::new(argmax / x.d(), argmax / x.d() + 1, max)])
        }
    }

    struct Negate;

    impl Preprocessor for Negate {
        fn name(&self) -> &'static str {
            "negate"
        }

        fn apply(&self, x: &Signal) -> Result<Signal, MdiError> {
            Signal::new(x.values().iter().map(|v| -v).collect(), x.n(), x.d())
        }
    }

    struct Truncate;

    impl Preprocessor for Truncate {
        fn name(&self) -> &'static str {
            "truncate"
        }

        fn apply(&self, x: &Signal) -> Result<Signal, MdiError> {
            Signal::univariate(x.dimension(0)[1..].to_vec())
        }
    }

    #[test]
    fn detector_runs_on_raw_signal_without_preprocessing() {
        let x = Signal::univariate(vec![0.0, 3.0, 1.0]).expect("signal should be valid");
        let out = detect_with_preprocessing(&MaxValueDetector, None, &x, &DetectionParams::default())
            .expect("detection should succeed");
        assert_eq!(out, vec![Interval::new(1, 2, 3.0)]);
    }

    #[test]
    fn detector_sees_transformed_signal() {
        let x = Signal::univariate(vec![0.0, 3.0, -5.0]).expect("signal should be valid");
        let out = detect_with_preprocessing(
            &MaxValueDetector,
            Some(&Negate),
            &x,
            &DetectionParams::default(),
        )
        .expect("detection should succeed");
        assert_eq!(out, vec![Interval::new(2, 3, 5.0)]);
    }

    #[test]
    fn length_changing_transform_is_a_detector_failure() {
        let x = Signal::univariate(vec![0.0, 3.0, -5.0]).expect("signal should be valid");
        let err = detect_with_preprocessing(
            &MaxValueDetector,
            Some(&Truncate),
            &x,
            &DetectionParams::default(),
        )
        .expect_err("length change must fail");
        assert_eq!(err.code(), "detector_failure");
        assert!(err.to_string().contains("'truncate'"));
    }
}
