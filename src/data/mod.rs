pub mod context;
pub mod sentences;
pub mod xor;

pub use context::context_window;
pub use sentences::{SentenceSample, SentenceTask};
pub use xor::{BitEncoding, XorSample, XorTask};
