use crate::autodiff::tape::{Tape, Var};
use crate::error::GraphError;

/// Negative log-likelihood of a single label under a probability row.
pub struct NegativeLogLikelihood;

impl NegativeLogLikelihood {
    /// `-ln(probs[label])`
    pub fn loss(probs: &[f64], label: usize) -> Result<f64, GraphError> {
        probs.get(label)
            .map(|p| -p.ln())
            .ok_or(GraphError::LabelOutOfRange { label, classes: probs.len() })
    }

    /// Records `-ln(probs[0][label])` on `tape`. `probs` must be a single
    /// row of class probabilities, typically the output of `Tape::softmax`.
    pub fn record(tape: &mut Tape, probs: Var, label: usize) -> Result<Var, GraphError> {
        let classes = tape.value(probs).cols;
        if label >= classes {
            return Err(GraphError::LabelOutOfRange { label, classes });
        }
        let p = tape.element(probs, 0, label)?;
        let log_p = tape.log(p);
        Ok(tape.neg(log_p))
    }
}
