//! Engine configuration.
//!
//! Precedence, highest first:
//! 1. Builder calls / CLI flags
//! 2. TOML file (`EngineConfig::from_toml_file`)
//! 3. Built-in defaults
//!
//! Example TOML:
//! ```toml
//! max_results = 10
//! thread_budget = 4
//! sufficiency_ratio = 0.5
//! straggler_timeout_ms = 1000
//! benchmark_budgets = [1, 2, 4, 8]
//! benchmark_repetitions = 3
//! ```

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Tunables for the scheduler and the benchmark harness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default number of results when the caller does not ask for one
    pub max_results: usize,

    /// Concurrent scorer cap; `None` means one per hardware execution unit
    pub thread_budget: Option<usize>,

    /// Fraction of `max_results` the first finished scorer must fill for
    /// its result to be accepted without waiting for stragglers
    pub sufficiency_ratio: f64,

    /// Upper bound on the straggler wait, in milliseconds
    pub straggler_timeout_ms: u64,

    /// Thread budgets the benchmark always tries (hardware count is added
    /// when larger)
    pub benchmark_budgets: Vec<usize>,

    /// Parallel runs per budget; the median time is reported
    pub benchmark_repetitions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            thread_budget: None,
            sufficiency_ratio: 0.5,
            straggler_timeout_ms: 1000,
            benchmark_budgets: vec![1, 2, 4, 8],
            benchmark_repetitions: 1,
        }
    }
}

impl EngineConfig {
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_thread_budget(mut self, budget: usize) -> Self {
        self.thread_budget = Some(budget);
        self
    }

    pub fn with_sufficiency_ratio(mut self, ratio: f64) -> Self {
        self.sufficiency_ratio = ratio;
        self
    }

    pub fn with_straggler_timeout(mut self, timeout: Duration) -> Self {
        self.straggler_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_benchmark_budgets(mut self, budgets: Vec<usize>) -> Self {
        self.benchmark_budgets = budgets;
        self
    }

    pub fn with_benchmark_repetitions(mut self, repetitions: usize) -> Self {
        self.benchmark_repetitions = repetitions;
        self
    }

    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded engine configuration from {:?}", path);
        Ok(config)
    }

    /// Reject values the scheduler cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(EngineError::InvalidConfig(
                "max_results must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.sufficiency_ratio) {
            return Err(EngineError::InvalidConfig(format!(
                "sufficiency_ratio must be within 0.0..=1.0, got {}",
                self.sufficiency_ratio
            )));
        }
        if self.thread_budget == Some(0) {
            return Err(EngineError::InvalidConfig(
                "thread_budget must be at least 1".to_string(),
            ));
        }
        if self.benchmark_budgets.contains(&0) {
            return Err(EngineError::InvalidConfig(
                "benchmark_budgets must not contain 0".to_string(),
            ));
        }
        if self.benchmark_repetitions == 0 {
            return Err(EngineError::InvalidConfig(
                "benchmark_repetitions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn straggler_timeout(&self) -> Duration {
        Duration::from_millis(self.straggler_timeout_ms)
    }

    /// The configured budget, or the hardware unit count when unset
    pub fn resolved_thread_budget(&self) -> usize {
        self.thread_budget.unwrap_or_else(hardware_units)
    }

    /// Minimum primary result size that skips the straggler wait.
    ///
    /// `ceil(max_results * sufficiency_ratio)`, so 10 results need 5, 5
    /// need 3 and a single requested result needs 1.
    pub fn sufficiency_threshold(&self, max_results: usize) -> usize {
        (max_results as f64 * self.sufficiency_ratio).ceil() as usize
    }
}

/// Number of hardware execution units, at least 1
pub fn hardware_units() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();

        assert_eq!(config.max_results, 10);
        assert_eq!(config.straggler_timeout(), Duration::from_millis(1000));
        assert_eq!(config.sufficiency_threshold(10), 5);
        assert_eq!(config.sufficiency_threshold(5), 3);
        assert_eq!(config.sufficiency_threshold(3), 2);
        assert_eq!(config.sufficiency_threshold(1), 1);
        assert!(config.resolved_thread_budget() >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_str_partial() {
        let config = EngineConfig::from_toml_str("thread_budget = 4\nstraggler_timeout_ms = 250\n").unwrap();

        assert_eq!(config.thread_budget, Some(4));
        assert_eq!(config.resolved_thread_budget(), 4);
        assert_eq!(config.straggler_timeout_ms, 250);
        assert_eq!(config.max_results, 10);
        assert_eq!(config.benchmark_budgets, vec![1, 2, 4, 8]);
    }

    #[test]
    fn test_from_toml_str_rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_toml_str("sufficiency_ratio = 1.5"),
            Err(EngineError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("thread_budget = 0"),
            Err(EngineError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("max_results = \"ten\""),
            Err(EngineError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let err = EngineConfig::from_toml_file(Path::new("no/such/engine.toml")).unwrap_err();
        assert!(matches!(err, EngineError::ConfigIo { .. }));
    }
}
