use crate::autodiff::tape::{Tape, Var};
use crate::math::matrix::Matrix;

/// `0.5 * sum((predicted - expected)²)`, the regression error of both XOR
/// demos.
pub struct HalfSquaredError;

impl HalfSquaredError {
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> f64 {
        0.5 * (predicted - expected).sq_norm()
    }

    /// Per-output gradient: predicted - expected
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Matrix {
        predicted - expected
    }

    /// Records the error on `tape` as a 1×1 node.
    pub fn record(tape: &mut Tape, output: Var, expected: Var) -> Var {
        let diff = tape.sub(output, expected);
        let squared = tape.square(diff);
        let total = tape.sum(squared);
        tape.scale(total, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_error_matches_plain_error() {
        let predicted = Matrix::column(&[0.5, -1.0]);
        let expected = Matrix::column(&[1.0, 1.0]);

        let mut tape = Tape::new();
        let o = tape.input(predicted.clone());
        let e = tape.input(expected.clone());
        let loss = HalfSquaredError::record(&mut tape, o, e);

        assert!((tape.scalar(loss) - HalfSquaredError::loss(&predicted, &expected)).abs() < 1e-12);
        assert!((tape.scalar(loss) - 2.125).abs() < 1e-12);

        let grads = tape.backward(loss).unwrap();
        assert_eq!(grads.wrt(o).unwrap(), &HalfSquaredError::derivative(&predicted, &expected));
    }
}
