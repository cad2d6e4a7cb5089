pub mod softmax;

pub use softmax::{Comparison, SoftmaxDemo, SoftmaxReport};
