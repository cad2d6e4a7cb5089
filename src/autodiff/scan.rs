use crate::autodiff::tape::{Tape, Var};
use crate::error::GraphError;

/// Per-step outputs of a [`scan`]. `outputs[t][0]` is the state carried out
/// of step `t`; any further entries are extra per-step results.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    outputs: Vec<Vec<Var>>,
}

impl ScanOutput {
    pub fn steps(&self) -> usize {
        self.outputs.len()
    }

    /// Output `k` of the final step.
    pub fn last(&self, k: usize) -> Var {
        self.outputs[self.outputs.len() - 1][k]
    }

    /// Output `k` of every step, in order.
    pub fn series(&self, k: usize) -> Vec<Var> {
        self.outputs.iter().map(|step| step[k]).collect()
    }

    /// The carried state after every step.
    pub fn states(&self) -> Vec<Var> {
        self.series(0)
    }
}

/// Runs a recurrence over `steps`, recording it on `tape`.
///
/// `step(tape, x_t, h_tm1)` returns the outputs of one step; its first
/// element becomes `h_tm1` for the next call. The unrolled graph is
/// differentiated like any other, so gradients flow back through every step
/// into `init` and the parameters the closure captures.
pub fn scan<F>(tape: &mut Tape, steps: &[Var], init: Var, mut step: F) -> Result<ScanOutput, GraphError>
where
    F: FnMut(&mut Tape, Var, Var) -> Vec<Var>,
{
    if steps.is_empty() {
        return Err(GraphError::EmptySequence);
    }

    let mut outputs = Vec::with_capacity(steps.len());
    let mut state = init;
    for &x_t in steps {
        let out = step(tape, x_t, state);
        assert!(!out.is_empty(), "a recurrence step must return its new state first");
        state = out[0];
        outputs.push(out);
    }

    Ok(ScanOutput { outputs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::Matrix;

    #[test]
    fn running_sum_threads_state() {
        let mut tape = Tape::new();
        let xs: Vec<Var> = [1.0, 2.0, 3.0].iter().map(|&v| tape.input(Matrix::scalar(v))).collect();
        let h0 = tape.input(Matrix::scalar(0.0));
        let out = scan(&mut tape, &xs, h0, |tape, x, h| vec![tape.add(x, h)]).unwrap();

        let values: Vec<f64> = out.states().iter().map(|&v| tape.scalar(v)).collect();
        assert_eq!(values, vec![1.0, 3.0, 6.0]);

        // d(last)/d(h0) = 1 and every input contributes once.
        let grads = tape.backward(out.last(0)).unwrap();
        assert_eq!(grads.wrt(h0).unwrap().data[0][0], 1.0);
        for x in xs {
            assert_eq!(grads.wrt(x).unwrap().data[0][0], 1.0);
        }
    }

    #[test]
    fn empty_sequence_is_an_error() {
        let mut tape = Tape::new();
        let h0 = tape.input(Matrix::scalar(0.0));
        let err = scan(&mut tape, &[], h0, |_, _, h| vec![h]).unwrap_err();
        assert_eq!(err, GraphError::EmptySequence);
    }
}
