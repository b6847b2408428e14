//! Backend configuration.
//!
//! Values come from, highest precedence first:
//! 1. `ALCOM_*` environment variables
//! 2. a YAML configuration file
//! 3. defaults

use std::path::Path;

use alcom_dd::MAX_STATEVECTOR_QUBITS;
use alcom_dd::package::DEFAULT_GC_THRESHOLD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings of a [`BddBackend`](crate::BddBackend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BddConfig {
    pub backend_name: String,
    /// Largest accepted circuit.
    pub max_qubits: u32,
    pub max_shots: u32,
    /// Jobs that may run the engine at the same time.
    pub max_concurrent_jobs: usize,
    /// Per-job wall-clock limit in seconds.
    pub job_timeout_secs: u64,
    /// Largest circuit for which a statevector may be requested.
    pub statevector_max_qubits: u32,
    /// Decision-diagram node count that triggers garbage collection.
    pub gc_threshold: usize,
    /// Seed used when a submission does not carry its own.
    pub seed: Option<u64>,
}

impl Default for BddConfig {
    fn default() -> Self {
        Self {
            backend_name: "qasm_simulator".into(),
            max_qubits: 30,
            max_shots: 100_000,
            max_concurrent_jobs: 4,
            job_timeout_secs: 300,
            statevector_max_qubits: 24,
            gc_threshold: DEFAULT_GC_THRESHOLD,
            seed: None,
        }
    }
}

impl BddConfig {
    /// Load from a YAML file; missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: BddConfig =
            serde_yaml_ng::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// File (or defaults), then environment overrides, then validation.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `ALCOM_*` overrides read through `lookup`. Only variables that
    /// are set change anything; unparsable values are an error.
    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::ParseError(format!("{key}={value} is not a valid number")))
        }

        if let Some(v) = lookup("ALCOM_BACKEND_NAME") {
            self.backend_name = v;
        }
        if let Some(v) = lookup("ALCOM_MAX_QUBITS") {
            self.max_qubits = parse("ALCOM_MAX_QUBITS", &v)?;
        }
        if let Some(v) = lookup("ALCOM_MAX_SHOTS") {
            self.max_shots = parse("ALCOM_MAX_SHOTS", &v)?;
        }
        if let Some(v) = lookup("ALCOM_MAX_CONCURRENT_JOBS") {
            self.max_concurrent_jobs = parse("ALCOM_MAX_CONCURRENT_JOBS", &v)?;
        }
        if let Some(v) = lookup("ALCOM_JOB_TIMEOUT") {
            self.job_timeout_secs = parse("ALCOM_JOB_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("ALCOM_STATEVECTOR_MAX_QUBITS") {
            self.statevector_max_qubits = parse("ALCOM_STATEVECTOR_MAX_QUBITS", &v)?;
        }
        if let Some(v) = lookup("ALCOM_GC_THRESHOLD") {
            self.gc_threshold = parse("ALCOM_GC_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("ALCOM_SEED") {
            self.seed = Some(parse("ALCOM_SEED", &v)?);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "backend_name must not be empty".to_string(),
            ));
        }
        if self.max_qubits == 0 {
            return Err(ConfigError::ValidationError(
                "max_qubits must be greater than 0".to_string(),
            ));
        }
        if self.max_shots == 0 {
            return Err(ConfigError::ValidationError(
                "max_shots must be greater than 0".to_string(),
            ));
        }
        if self.max_concurrent_jobs == 0 {
            return Err(ConfigError::ValidationError(
                "max_concurrent_jobs must be greater than 0".to_string(),
            ));
        }
        if self.job_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "job_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.statevector_max_qubits as usize > MAX_STATEVECTOR_QUBITS {
            return Err(ConfigError::ValidationError(format!(
                "statevector_max_qubits must be at most {MAX_STATEVECTOR_QUBITS}"
            )));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: FxHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = BddConfig::default();
        assert_eq!(config.backend_name, "qasm_simulator");
        assert_eq!(config.max_qubits, 30);
        assert_eq!(config.max_shots, 100_000);
        assert_eq!(config.statevector_max_qubits, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_keeps_defaults() {
        let config = BddConfig::from_yaml("max_qubits: 12\nseed: 99\n").unwrap();
        assert_eq!(config.max_qubits, 12);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.max_shots, 100_000);
    }

    #[test]
    fn test_yaml_invalid_values_rejected() {
        assert!(matches!(
            BddConfig::from_yaml("max_concurrent_jobs: 0\n"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            BddConfig::from_yaml("max_qubits: [1, 2]\n"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = BddConfig::default()
            .merge_env(env(&[
                ("ALCOM_MAX_QUBITS", "16"),
                ("ALCOM_JOB_TIMEOUT", "5"),
                ("ALCOM_SEED", "7"),
            ]))
            .unwrap();
        assert_eq!(config.max_qubits, 16);
        assert_eq!(config.job_timeout_secs, 5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_shots, 100_000);
    }

    #[test]
    fn test_env_garbage_is_an_error() {
        let result = BddConfig::default().merge_env(env(&[("ALCOM_MAX_SHOTS", "lots")]));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_statevector_limit_capped() {
        let config = BddConfig {
            statevector_max_qubits: 40,
            ..BddConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
