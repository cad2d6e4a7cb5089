use rand::Rng;
use serde::{Serialize, Deserialize};
use std::ops::{Add, Sub, Mul};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    pub fn zeros_like(other: &Matrix) -> Matrix {
        Matrix::zeros(other.rows, other.cols)
    }

    /// Identity matrix of size n×n.
    pub fn eye(n: usize) -> Matrix {
        let mut res = Matrix::zeros(n, n);
        for i in 0..n {
            res.data[i][i] = 1.0;
        }
        res
    }

    /// A 1×1 matrix holding `value`.
    pub fn scalar(value: f64) -> Matrix {
        Matrix { rows: 1, cols: 1, data: vec![vec![value]] }
    }

    /// Samples every entry uniformly from [low, high).
    pub fn uniform<R: Rng + ?Sized>(rows: usize, cols: usize, low: f64, high: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);

        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = low + rng.gen::<f64>() * (high - low);
            }
        }

        res
    }

    /// `scale * U(-1, 1)`, the initialization every recurrent model here uses.
    pub fn scaled_uniform<R: Rng + ?Sized>(rows: usize, cols: usize, scale: f64, rng: &mut R) -> Matrix {
        Matrix::uniform(rows, cols, -1.0, 1.0, rng).scale(scale)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Element-wise combination of two same-shape matrices.
    pub fn zip_map<F>(&self, other: &Matrix, functor: F) -> Matrix
    where
        F: Fn(f64, f64) -> f64,
    {
        assert_same_shape(self, other);
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(other.data.iter())
                .map(|(row_a, row_b)| {
                    row_a.iter().zip(row_b.iter()).map(|(&x, &y)| functor(x, y)).collect()
                })
                .collect(),
        }
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, other: &Matrix) -> Matrix {
        self.zip_map(other, |x, y| x * y)
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// In-place `self += other`; used to accumulate gradients.
    pub fn add_assign(&mut self, other: &Matrix) {
        assert_same_shape(self, other);
        for (row_a, row_b) in self.data.iter_mut().zip(other.data.iter()) {
            for (x, y) in row_a.iter_mut().zip(row_b.iter()) {
                *x += y;
            }
        }
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    /// Sum of squared entries (squared Frobenius norm).
    pub fn sq_norm(&self) -> f64 {
        self.data.iter().flatten().map(|x| x * x).sum()
    }

    pub fn row(&self, i: usize) -> Matrix {
        Matrix { rows: 1, cols: self.cols, data: vec![self.data[i].clone()] }
    }

    /// Column index of the largest entry of row `i`.
    pub fn argmax_row(&self, i: usize) -> usize {
        argmax(&self.data[i])
    }

    /// Per-row argmax.
    pub fn row_argmax(&self) -> Vec<usize> {
        (0..self.rows).map(|i| self.argmax_row(i)).collect()
    }

    /// Row-major reshape. Panics if the element count changes.
    pub fn reshape(&self, rows: usize, cols: usize) -> Matrix {
        assert_eq!(
            self.rows * self.cols,
            rows * cols,
            "cannot reshape {}x{} into {}x{}",
            self.rows, self.cols, rows, cols
        );
        let flat: Vec<f64> = self.data.iter().flatten().copied().collect();
        let data = if cols == 0 {
            vec![vec![]; rows]
        } else {
            flat.chunks(cols).map(|c| c.to_vec()).collect()
        };
        Matrix { rows, cols, data }
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().flatten().all(|x| x.is_finite())
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |row| row.len()),
            data
        }
    }

    /// A single column built from `values`.
    pub fn column(values: &[f64]) -> Matrix {
        Matrix::from_data(values.iter().map(|&v| vec![v]).collect())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

fn assert_same_shape(a: &Matrix, b: &Matrix) {
    if a.rows != b.rows || a.cols != b.cols {
        panic!(
            "Matrices are of incorrect sizes: {}x{} vs {}x{}",
            a.rows, a.cols, b.rows, b.cols
        )
    }
}

/// Index of the maximum element in a slice.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip_map(rhs, |x, y| x + y)
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_map(rhs, |x, y| x - y)
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!(
                "Matrices are of incorrect sizes: {}x{} * {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )
        }

        let mut res =  Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        res
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        &self * &rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn product_of_known_matrices() {
        let a = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = Matrix::from_data(vec![vec![5.0], vec![6.0]]);
        let c = &a * &b;
        assert_eq!(c.data, vec![vec![17.0], vec![39.0]]);
    }

    #[test]
    fn eye_is_neutral_for_product() {
        let a = Matrix::from_data(vec![vec![1.0, -2.0], vec![0.5, 4.0]]);
        assert_eq!(&a * &Matrix::eye(2), a);
    }

    #[test]
    fn scaled_uniform_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = Matrix::scaled_uniform(20, 20, 0.2, &mut rng);
        assert!(m.data.iter().flatten().all(|x| x.abs() <= 0.2));
    }

    #[test]
    fn reshape_is_row_major() {
        let m = Matrix::from_data(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let r = m.reshape(3, 2);
        assert_eq!(r.data, vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
    }

    #[test]
    #[should_panic(expected = "incorrect sizes")]
    fn mismatched_add_panics() {
        let _ = &Matrix::zeros(2, 2) + &Matrix::zeros(1, 2);
    }

    #[test]
    fn argmax_per_row() {
        let m = Matrix::from_data(vec![vec![0.1, 0.7, 0.2], vec![0.9, 0.05, 0.05]]);
        assert_eq!(m.row_argmax(), vec![1, 0]);
    }
}
