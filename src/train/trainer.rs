use crate::error::Result;
use crate::train::train_config::TrainConfig;

/// A model that `train_loop` can drive one sample at a time.
pub trait TrainStep {
    type Sample;

    /// Trains on one sample and returns its error as measured before any
    /// parameter update this call performs.
    fn train_step(&mut self, sample: &Self::Sample, config: &TrainConfig) -> Result<f64>;

    /// Called once after the last iteration, e.g. to apply gradients still
    /// waiting for a full batch.
    fn finish(&mut self, _config: &TrainConfig) -> Result<()> {
        Ok(())
    }
}
