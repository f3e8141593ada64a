use heat_core::{BaselineProfile, MAX_STEPS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("config invalid: {0}")]
    Invalid(String),
}

/// Timer and failure-policy settings of a simulation controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_interval_ms: u64,
    pub max_steps: u32,
    pub max_consecutive_errors: u32,
    pub max_total_errors: u32,
    /// Budget for one predictor round-trip before it counts as a timeout.
    pub request_timeout_ms: u64,
    /// Ranges used when `reset` restores the subject to a fresh baseline.
    pub baseline: BaselineProfile,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
            max_steps: MAX_STEPS,
            max_consecutive_errors: 3,
            max_total_errors: 10,
            request_timeout_ms: 2_000,
            baseline: BaselineProfile::default(),
        }
    }
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be positive".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request_timeout_ms must be positive".into()));
        }
        if self.max_steps == 0 || self.max_steps > MAX_STEPS {
            return Err(ConfigError::Invalid(format!(
                "max_steps {} outside 1..={MAX_STEPS}",
                self.max_steps
            )));
        }
        if self.max_consecutive_errors == 0 || self.max_total_errors == 0 {
            return Err(ConfigError::Invalid("error thresholds must be at least 1".into()));
        }
        self.baseline
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("baseline {e}")))?;
        Ok(())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: SimulationConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}
