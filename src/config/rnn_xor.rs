use serde::{Serialize, Deserialize};

use crate::config::{load_json, require};
use crate::data::xor::MAX_BITS;
use crate::error::ConfigError;
use crate::train::train_config::TrainConfig;

/// Plain sigmoid RNN learning the XOR of a short bit sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RnnXorConfig {
    /// Hidden state size.
    pub hidden: usize,
    /// Weights start in `init_scale * U(-1, 1)`.
    pub init_scale: f64,
    /// Length of each bit sequence.
    pub bits: usize,
    pub seed: Option<u64>,
    pub train: TrainConfig,
}

impl Default for RnnXorConfig {
    fn default() -> Self {
        RnnXorConfig {
            hidden: 3,
            init_scale: 0.5,
            bits: 2,
            seed: None,
            train: TrainConfig::default(),
        }
    }
}

impl RnnXorConfig {
    /// Reads the config without validating it, so that command-line
    /// overrides can still be applied; call `validate` afterwards.
    pub fn load_json(path: &str) -> Result<RnnXorConfig, ConfigError> {
        load_json(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require(self.hidden > 0, "hidden must be at least 1")?;
        require(self.bits > 0, "bits must be at least 1")?;
        require(self.bits <= MAX_BITS, "bits must be at most 16")?;
        require(self.init_scale.is_finite(), "init_scale must be finite")?;
        self.train.validate()
    }
}
