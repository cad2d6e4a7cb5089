//! Expression-graph recording and reverse-mode differentiation.

pub mod gradients;
pub mod scan;
pub mod tape;

pub use gradients::{Gradients, ParamGrads};
pub use scan::{scan, ScanOutput};
pub use tape::{Tape, Var};
