use crate::activation::softmax::{p_y_given_x, softmax_rows};
use crate::autodiff::tape::Tape;
use crate::math::matrix::Matrix;

/// The same quantity computed through the tape and directly.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub graph: Matrix,
    pub direct: Matrix,
}

impl Comparison {
    /// Largest absolute entry-wise difference between the two results.
    pub fn max_abs_diff(&self) -> f64 {
        self.graph.zip_map(&self.direct, |a, b| (a - b).abs())
            .data.iter().flatten()
            .copied()
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone)]
pub struct SoftmaxReport {
    pub softmax: Comparison,
    pub p_y_given_x: Comparison,
}

/// Softmax sanity check: the recorded `softmax` and `softmax(x·w + b)`
/// against the plain numeric versions.
#[derive(Debug, Clone)]
pub struct SoftmaxDemo {
    pub x: Matrix,
    pub w: Matrix,
    pub b: Matrix,
}

impl Default for SoftmaxDemo {
    fn default() -> Self {
        SoftmaxDemo {
            x: Matrix::from_data(vec![vec![1.0, 3.0], vec![2.0, 5.0]]),
            w: Matrix::from_data(vec![vec![1.0, 1.0], vec![1.0, 1.0]]),
            b: Matrix::zeros(2, 2),
        }
    }
}

impl SoftmaxDemo {
    pub fn run(&self) -> SoftmaxReport {
        let mut tape = Tape::new();
        let x = tape.input(self.x.clone());
        let s = tape.softmax(x);

        let w = tape.input(self.w.clone());
        let b = tape.input(self.b.clone());
        let xw = tape.matmul(x, w);
        let logits = tape.add(xw, b);
        let p = tape.softmax(logits);

        SoftmaxReport {
            softmax: Comparison {
                graph: tape.value(s).clone(),
                direct: softmax_rows(&self.x),
            },
            p_y_given_x: Comparison {
                graph: tape.value(p).clone(),
                direct: p_y_given_x(&self.x, &self.w, &self.b),
            },
        }
    }
}
