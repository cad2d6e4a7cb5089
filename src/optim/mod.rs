pub mod adagrad;
pub mod sgd;

pub use adagrad::Adagrad;
pub use sgd::Sgd;
