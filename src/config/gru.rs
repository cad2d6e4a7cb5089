use serde::{Serialize, Deserialize};

use crate::config::{load_json, require};
use crate::data::xor::{BitEncoding, MAX_BITS};
use crate::error::ConfigError;
use crate::train::train_config::TrainConfig;

/// Gated recurrent unit learning the parity of a ±1 bit sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GruConfig {
    pub input_dim: usize,
    pub hidden: usize,
    pub output_dim: usize,
    /// Recurrent matrices start at `init_scale * I`; every other weight and
    /// bias in `init_scale * U(-1, 1)`.
    pub init_scale: f64,
    pub bits: usize,
    pub encoding: BitEncoding,
    pub seed: Option<u64>,
    pub train: TrainConfig,
}

impl Default for GruConfig {
    fn default() -> Self {
        GruConfig {
            input_dim: 1,
            hidden: 50,
            output_dim: 1,
            init_scale: 0.001,
            bits: 4,
            encoding: BitEncoding::PlusMinusOne,
            seed: None,
            train: TrainConfig::default(),
        }
    }
}

impl GruConfig {
    /// Reads the config without validating it, so that command-line
    /// overrides can still be applied; call `validate` afterwards.
    pub fn load_json(path: &str) -> Result<GruConfig, ConfigError> {
        load_json(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require(self.input_dim == 1, "input_dim must be 1: each step feeds a single bit")?;
        require(self.output_dim == 1, "output_dim must be 1: the target is a single parity value")?;
        require(self.hidden > 0, "hidden must be at least 1")?;
        require(self.bits > 0, "bits must be at least 1")?;
        require(self.bits <= MAX_BITS, "bits must be at most 16")?;
        require(self.init_scale.is_finite(), "init_scale must be finite")?;
        self.train.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_setup() {
        let config = GruConfig::default();
        assert_eq!(config.hidden, 50);
        assert_eq!(config.bits, 4);
        assert_eq!(config.encoding, BitEncoding::PlusMinusOne);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn oversized_bit_count_is_rejected() {
        let config = GruConfig { bits: 40, ..GruConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn encoding_reads_snake_case() {
        let config: GruConfig = serde_json::from_str(r#"{ "encoding": "zero_one" }"#).unwrap();
        assert_eq!(config.encoding, BitEncoding::ZeroOne);
    }
}
