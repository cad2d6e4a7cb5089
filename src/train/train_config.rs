use serde::{Serialize, Deserialize};

use crate::error::ConfigError;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `iterations`: number of training samples drawn (one update each,
///   or one accumulation when `batch_size > 1`)
/// - `report_every`: iterations between two average-error reports
/// - `learning_rate`: step size handed to the optimizer
/// - `batch_size`: samples accumulated before an optimizer update; only
///   models that accumulate gradients look at it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub iterations: usize,
    pub report_every: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            iterations: 1_000_000,
            report_every: 1000,
            learning_rate: 0.01,
            batch_size: 1,
        }
    }
}

impl TrainConfig {
    pub fn new(iterations: usize, report_every: usize, learning_rate: f64) -> Self {
        TrainConfig {
            iterations,
            report_every,
            learning_rate,
            batch_size: 1,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::Validation("iterations must be at least 1".into()));
        }
        if self.report_every == 0 {
            return Err(ConfigError::Validation("report_every must be at least 1".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::Validation(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Validation("batch_size must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_report_interval() {
        let config = TrainConfig { report_every: 0, ..TrainConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_nan_learning_rate() {
        let config = TrainConfig::new(10, 5, f64::NAN);
        assert!(config.validate().is_err());
    }
}
