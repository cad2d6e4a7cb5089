// Subcommands and their flags. Every flag is optional: when left out the
// value comes from `--config` if given, otherwise from the demo's defaults.

use clap::{Args, Subcommand};
use gradscan::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sigmoid RNN learning the XOR of two bits (plain SGD)
    RnnXor(RunArgs),

    /// GRU learning the parity of four ±1 bits (Adagrad)
    GruXor(GruArgs),

    /// Elman network classifying synthetic sentences from word windows
    Elman(RunArgs),

    /// Compare the recorded softmax with the direct computation
    Softmax,
}

/// Flags shared by every training subcommand.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// JSON file with the demo's hyperparameters
    #[arg(long)]
    pub config: Option<String>,

    /// Number of training samples to draw
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Iterations between two average-error reports
    #[arg(long)]
    pub report_every: Option<usize>,

    /// Learning rate
    #[arg(long)]
    pub lr: Option<f64>,

    /// Seed for weight initialization and sampling; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,
}

impl RunArgs {
    /// Overrides the loaded values with whatever was given on the command line.
    pub fn apply(&self, train: &mut TrainConfig, seed: &mut Option<u64>) {
        if let Some(iterations) = self.iterations {
            train.iterations = iterations;
        }
        if let Some(report_every) = self.report_every {
            train.report_every = report_every;
        }
        if let Some(lr) = self.lr {
            train.learning_rate = lr;
        }
        if self.seed.is_some() {
            *seed = self.seed;
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GruArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Samples whose gradients are averaged into one Adagrad update
    #[arg(long)]
    pub batch_size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_loaded_values() {
        let args = RunArgs {
            config: None,
            iterations: Some(50),
            report_every: None,
            lr: Some(0.5),
            seed: Some(9),
        };
        let mut train = TrainConfig::default();
        let mut seed = None;
        args.apply(&mut train, &mut seed);

        assert_eq!(train.iterations, 50);
        assert_eq!(train.report_every, 1000);
        assert_eq!(train.learning_rate, 0.5);
        assert_eq!(seed, Some(9));
    }
}
