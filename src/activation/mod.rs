pub mod activation;
pub mod softmax;

pub use activation::ActivationFunction;
pub use softmax::{softmax_rows, p_y_given_x};
