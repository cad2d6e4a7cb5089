pub mod math;
pub mod activation;
pub mod autodiff;
pub mod params;
pub mod loss;
pub mod optim;
pub mod data;
pub mod models;
pub mod train;
pub mod config;
pub mod demo;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use autodiff::{scan, Gradients, Tape, Var};
pub use params::{ParamId, ParamSet};
pub use models::{Elman, Gru, RnnXor};
pub use optim::{Adagrad, Sgd};
pub use train::{train_loop, TrainConfig, TrainStep};
pub use error::{Error, Result};
