//! The three recurrent networks, each owning its parameters.

pub mod elman;
pub mod gru;
pub mod rnn_xor;

pub use elman::Elman;
pub use gru::Gru;
pub use rnn_xor::RnnXor;
