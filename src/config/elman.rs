use serde::{Serialize, Deserialize};

use crate::config::{load_json, require};
use crate::error::ConfigError;
use crate::train::train_config::TrainConfig;

/// Elman network tagging word windows.
///
/// `hidden` (nh), `classes` (nc), `vocab_size` (ne), `embedding_dim` (de)
/// and `window` (cs) size the model; the sentence bounds only shape the
/// synthetic training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElmanConfig {
    pub hidden: usize,
    pub classes: usize,
    pub vocab_size: usize,
    pub embedding_dim: usize,
    pub window: usize,
    pub init_scale: f64,
    pub min_sentence: usize,
    pub max_sentence: usize,
    /// Rescale every embedding to unit length after each update.
    pub normalize_embeddings: bool,
    pub seed: Option<u64>,
    pub train: TrainConfig,
}

impl Default for ElmanConfig {
    fn default() -> Self {
        ElmanConfig {
            hidden: 5,
            classes: 4,
            vocab_size: 100,
            embedding_dim: 300,
            window: 10,
            init_scale: 0.2,
            min_sentence: 3,
            max_sentence: 8,
            normalize_embeddings: true,
            seed: None,
            train: TrainConfig {
                iterations: 100_000,
                learning_rate: 0.05,
                ..TrainConfig::default()
            },
        }
    }
}

impl ElmanConfig {
    /// Reads the config without validating it, so that command-line
    /// overrides can still be applied; call `validate` afterwards.
    pub fn load_json(path: &str) -> Result<ElmanConfig, ConfigError> {
        load_json(path)
    }

    /// Width of one step's input: `embedding_dim * window`.
    pub fn input_dim(&self) -> usize {
        self.embedding_dim * self.window
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require(self.hidden > 0, "hidden must be at least 1")?;
        require(self.classes > 0, "classes must be at least 1")?;
        require(self.vocab_size > 0, "vocab_size must be at least 1")?;
        require(self.embedding_dim > 0, "embedding_dim must be at least 1")?;
        require(self.window > 0, "window must be at least 1")?;
        require(self.min_sentence > 0, "min_sentence must be at least 1")?;
        require(
            self.min_sentence <= self.max_sentence,
            "min_sentence must not exceed max_sentence",
        )?;
        require(self.init_scale.is_finite(), "init_scale must be finite")?;
        self.train.validate()
    }
}
