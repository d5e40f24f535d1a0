// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use mdi_core::{IntervalDetector, MdiError, Preprocessor};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Identifier -> implementation tables for detectors and pre-processing transforms.
#[derive(Clone, Default)]
pub struct Registry {
    detectors: BTreeMap<String, Arc<dyn IntervalDetector>>,
    preprocessors: BTreeMap<String, Arc<dyn Preprocessor>>,
}

impl Registry {
    /// Empty registry; see [`Registry::builtin`] for the stock one.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the reference maxdiv detectors and all built-in transforms.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for detector in mdi_detect::builtin_detectors() {
            registry.register_detector(Arc::from(detector));
        }
        for preprocessor in mdi_preprocess::builtin_preprocessors() {
            registry.register_preprocessor(Arc::from(preprocessor));
        }
        registry
    }

    /// Registers `detector` under its own name, replacing any previous entry.
    pub fn register_detector(&mut self, detector: Arc<dyn IntervalDetector>) {
        self.detectors
            .insert(detector.name().to_string(), detector);
    }

    /// Registers `preprocessor` under its own name, replacing any previous entry.
    pub fn register_preprocessor(&mut self, preprocessor: Arc<dyn Preprocessor>) {
        self.preprocessors
            .insert(preprocessor.name().to_string(), preprocessor);
    }

    pub fn detector(&self, name: &str) -> Result<Arc<dyn IntervalDetector>, MdiError> {
        self.detectors.get(name).cloned().ok_or_else(|| {
            MdiError::invalid_configuration(format!(
                "unknown method '{name}'; expected one of: {}",
                self.detector_names().join(", ")
            ))
        })
    }

    pub fn preprocessor(&self, name: &str) -> Result<Arc<dyn Preprocessor>, MdiError> {
        self.preprocessors.get(name).cloned().ok_or_else(|| {
            MdiError::invalid_configuration(format!(
                "unknown preprocessing '{name}'; expected one of: {}",
                self.preprocessor_names().join(", ")
            ))
        })
    }

    pub fn detector_names(&self) -> Vec<&str> {
        self.detectors.keys().map(String::as_str).collect()
    }

    pub fn preprocessor_names(&self) -> Vec<&str> {
        self.preprocessors.keys().map(String::as_str).collect()
    }
}
