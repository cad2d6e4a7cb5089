pub mod squared_error;
pub mod nll;

pub use squared_error::HalfSquaredError;
pub use nll::NegativeLogLikelihood;
