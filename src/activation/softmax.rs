use crate::math::matrix::Matrix;

/// Row-wise softmax. Each row is shifted by its maximum before
/// exponentiation so large logits cannot overflow.
pub fn softmax_rows(logits: &Matrix) -> Matrix {
    let data = logits.data.iter()
        .map(|row| softmax_slice(row))
        .collect();
    Matrix { rows: logits.rows, cols: logits.cols, data }
}

pub fn softmax_slice(row: &[f64]) -> Vec<f64> {
    let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = row.iter().map(|&x| (x - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Class probabilities of a linear softmax classifier: `softmax(x·w + b)`.
///
/// `x` is `[samples, features]`, `w` is `[features, classes]` and `b` is
/// either `[samples, classes]` or a single `[1, classes]` row that is added
/// to every sample.
pub fn p_y_given_x(x: &Matrix, w: &Matrix, b: &Matrix) -> Matrix {
    let mut logits = x * w;
    if b.rows == 1 && logits.rows != 1 {
        for row in logits.data.iter_mut() {
            for (v, bias) in row.iter_mut().zip(b.data[0].iter()) {
                *v += bias;
            }
        }
        softmax_rows(&logits)
    } else {
        softmax_rows(&(&logits + b))
    }
}
