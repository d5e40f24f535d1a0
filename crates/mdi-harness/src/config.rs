// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::Registry;
use mdi_core::{DetectionParams, MdiError};
use serde::{Deserialize, Serialize};

/// How signals of one group are evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    /// Signals of a group are evaluated on the rayon pool; results keep
    /// signal order.
    Parallel,
}

/// Validated run parameters for one benchmark invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    pub params: DetectionParams,
    /// Groups to evaluate; empty means every group in the corpus.
    pub extreme_types: Vec<String>,
    /// Whether the interval hook is invoked.
    pub visualize: bool,
    pub execution: ExecutionMode,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            params: DetectionParams::default(),
            extreme_types: vec![],
            visualize: true,
            execution: ExecutionMode::default(),
        }
    }
}

impl BenchConfig {
    pub fn validate(&self, registry: &Registry) -> Result<(), MdiError> {
        self.params.validate()?;
        registry.detector(&self.params.method)?;
        if let Some(preprocessing) = &self.params.preprocessing {
            registry.preprocessor(preprocessing)?;
        }
        if let Some(position) = self.extreme_types.iter().position(|name| name.is_empty()) {
            return Err(MdiError::invalid_configuration(format!(
                "extreme_types[{position}] must not be empty"
            )));
        }
        if self.execution == ExecutionMode::Parallel && !cfg!(feature = "rayon") {
            return Err(MdiError::invalid_configuration(
                "parallel execution requires mdi-harness to be built with the `rayon` feature",
            ));
        }
        Ok(())
    }

    /// True when `group` passes the extreme-type filter.
    pub fn selects(&self, group: &str) -> bool {
        self.extreme_types.is_empty() || self.extreme_types.iter().any(|name| name == group)
    }
}

#[cfg(test)]
mod tests {
    use super::{BenchConfig, ExecutionMode};
    use crate::Registry;
    use mdi_core::DetectionParams;

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
    fn defaults_select_every_group_sequentially() {
        let config = BenchConfig::default();
        assert!(config.visualize);
        assert_eq!(config.execution, ExecutionMode::Sequential);
        assert!(config.selects("meander"));
    }

    #[test]
    fn validate_accepts_registered_identifiers() {
        let registry = Registry::builtin();
        let mut config = config("gaussian_cov");
        config.params.preprocessing = Some("td".to_string());
        config.validate(&registry).expect("config should be valid");
    }

    #[test]
    fn validate_rejects_unknown_method_and_preprocessing() {
        let registry = Registry::builtin();
        let err = config("nope").validate(&registry).expect_err("unknown method must fail");
        assert_eq!(err.code(), "invalid_configuration");

        let mut config = config("parzen");
        config.params.preprocessing = Some("nope".to_string());
        let err = config.validate(&registry).expect_err("unknown preprocessing must fail");
        assert!(err.to_string().contains("unknown preprocessing 'nope'"));
    }

    #[test]
    fn validate_rejects_inverted_length_bounds_before_lookup() {
        let registry = Registry::builtin();
        let mut config = config("gaussian_cov");
        config.params.min_len = 80;
        let err = config.validate(&registry).expect_err("min > max must fail");
        assert!(err.to_string().contains("min_len=80 must be <= max_len=50"));
    }

    #[test]
    fn filter_matches_listed_groups_only() {
        let config = BenchConfig {
            extreme_types: vec!["meander".to_string(), "mixed".to_string()],
            ..BenchConfig::default()
        };
        assert!(config.selects("mixed"));
        assert!(!config.selects("amplitude_change"));

        let mut bad = config.clone();
        bad.params.method = "gaussian_cov".to_string();
        bad.extreme_types.push(String::new());
        assert!(bad.validate(&Registry::builtin()).is_err());
    }
}
