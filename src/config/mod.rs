//! Hyperparameters of each demo.
//!
//! Every config has a `Default` that reproduces the classic setup of the
//! demo, can be read from a JSON file (missing keys fall back to the
//! defaults), and is checked by `validate()` before a model is built.

pub mod elman;
pub mod gru;
pub mod rnn_xor;

pub use elman::ElmanConfig;
pub use gru::GruConfig;
pub use rnn_xor::RnnXorConfig;

use serde::de::DeserializeOwned;

use crate::error::ConfigError;

/// Reads a JSON config file.
pub fn load_json<T: DeserializeOwned>(path: &str) -> Result<T, ConfigError> {
    let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    let reader = std::io::BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

pub(crate) fn require(condition: bool, message: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Validation(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_json::<RnnXorConfig>("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = std::env::temp_dir().join("gradscan_bad_config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_json::<GruConfig>(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn loading_leaves_validation_to_the_caller() {
        let path = std::env::temp_dir().join("gradscan_zero_iterations.json");
        std::fs::write(&path, r#"{ "train": { "iterations": 0 } }"#).unwrap();
        let mut config = RnnXorConfig::load_json(path.to_str().unwrap()).unwrap();
        let _ = std::fs::remove_file(path);

        assert!(config.validate().is_err());
        config.train.iterations = 10;
        assert!(config.validate().is_ok());
    }
}
