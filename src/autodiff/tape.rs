//! Reverse-mode automatic differentiation over matrices.
//!
//! A [`Tape`] records every operation of one forward pass as a node holding
//! its value. Nodes only ever refer to earlier nodes, so walking the tape
//! backwards visits them in reverse topological order; [`Tape::backward`]
//! relies on that to push adjoints from the loss down to the leaves.

use crate::activation::activation::ActivationFunction;
use crate::activation::softmax::softmax_rows;
use crate::autodiff::gradients::Gradients;
use crate::error::GraphError;
use crate::math::matrix::Matrix;
use crate::params::param_set::ParamId;

/// Handle to a node recorded on a [`Tape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Var(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum Op {
    Input,
    Param(ParamId),
    MatMul(Var, Var),
    Add(Var, Var),
    Sub(Var, Var),
    Mul(Var, Var),
    Scale(Var, f64),
    AddScalar(Var, f64),
    Activate(Var, ActivationFunction),
    Softmax(Var),
    Log(Var),
    Square(Var),
    Sum(Var),
    Mean(Var),
    Element(Var, usize, usize),
    Row(Var, usize),
    GatherRows(Var, Vec<usize>),
    Reshape(Var),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) value: Matrix,
    pub(crate) op: Op,
}

#[derive(Debug, Default)]
pub struct Tape {
    nodes: Vec<Node>,
}

impl Tape {
    pub fn new() -> Tape {
        Tape::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn value(&self, v: Var) -> &Matrix {
        &self.nodes[v.0].value
    }

    /// Scalar value of a 1×1 node.
    pub fn scalar(&self, v: Var) -> f64 {
        self.value(v).data[0][0]
    }

    fn push(&mut self, value: Matrix, op: Op) -> Var {
        self.nodes.push(Node { value, op });
        Var(self.nodes.len() - 1)
    }

    /// A constant leaf; it receives an adjoint but is never updated.
    pub fn input(&mut self, value: Matrix) -> Var {
        self.push(value, Op::Input)
    }

    /// A trainable leaf whose gradient is reported under `id`.
    pub fn param(&mut self, id: ParamId, value: &Matrix) -> Var {
        self.push(value.clone(), Op::Param(id))
    }

    pub fn matmul(&mut self, a: Var, b: Var) -> Var {
        let value = self.value(a) * self.value(b);
        self.push(value, Op::MatMul(a, b))
    }

    pub fn add(&mut self, a: Var, b: Var) -> Var {
        let value = self.value(a) + self.value(b);
        self.push(value, Op::Add(a, b))
    }

    pub fn sub(&mut self, a: Var, b: Var) -> Var {
        let value = self.value(a) - self.value(b);
        self.push(value, Op::Sub(a, b))
    }

    /// Element-wise product.
    pub fn mul(&mut self, a: Var, b: Var) -> Var {
        let value = self.value(a).hadamard(self.value(b));
        self.push(value, Op::Mul(a, b))
    }

    pub fn scale(&mut self, a: Var, factor: f64) -> Var {
        let value = self.value(a).scale(factor);
        self.push(value, Op::Scale(a, factor))
    }

    pub fn add_scalar(&mut self, a: Var, c: f64) -> Var {
        let value = self.value(a).map(|x| x + c);
        self.push(value, Op::AddScalar(a, c))
    }

    pub fn neg(&mut self, a: Var) -> Var {
        self.scale(a, -1.0)
    }

    /// `1 - a`, the complement of a gate.
    pub fn one_minus(&mut self, a: Var) -> Var {
        let negated = self.neg(a);
        self.add_scalar(negated, 1.0)
    }

    pub fn activate(&mut self, a: Var, activation: ActivationFunction) -> Var {
        let value = self.value(a).map(|x| activation.function(x));
        self.push(value, Op::Activate(a, activation))
    }

    pub fn sigmoid(&mut self, a: Var) -> Var {
        self.activate(a, ActivationFunction::Sigmoid)
    }

    pub fn tanh(&mut self, a: Var) -> Var {
        self.activate(a, ActivationFunction::Tanh)
    }

    /// Row-wise softmax.
    pub fn softmax(&mut self, a: Var) -> Var {
        let value = softmax_rows(self.value(a));
        self.push(value, Op::Softmax(a))
    }

    pub fn log(&mut self, a: Var) -> Var {
        let value = self.value(a).map(f64::ln);
        self.push(value, Op::Log(a))
    }

    pub fn square(&mut self, a: Var) -> Var {
        let value = self.value(a).map(|x| x * x);
        self.push(value, Op::Square(a))
    }

    /// Sum of all entries, as a 1×1 node.
    pub fn sum(&mut self, a: Var) -> Var {
        let value = Matrix::scalar(self.value(a).sum());
        self.push(value, Op::Sum(a))
    }

    /// Mean of all entries, as a 1×1 node.
    pub fn mean(&mut self, a: Var) -> Var {
        let m = self.value(a);
        let n = (m.rows * m.cols) as f64;
        let value = Matrix::scalar(m.sum() / n);
        self.push(value, Op::Mean(a))
    }

    /// Entry `(row, col)` as a 1×1 node.
    pub fn element(&mut self, a: Var, row: usize, col: usize) -> Result<Var, GraphError> {
        let m = self.value(a);
        if row >= m.rows {
            return Err(GraphError::IndexOutOfRange { index: row, rows: m.rows });
        }
        if col >= m.cols {
            return Err(GraphError::ColumnOutOfRange { index: col, cols: m.cols });
        }
        let value = Matrix::scalar(m.data[row][col]);
        Ok(self.push(value, Op::Element(a, row, col)))
    }

    pub fn row(&mut self, a: Var, i: usize) -> Result<Var, GraphError> {
        let m = self.value(a);
        if i >= m.rows {
            return Err(GraphError::IndexOutOfRange { index: i, rows: m.rows });
        }
        let value = m.row(i);
        Ok(self.push(value, Op::Row(a, i)))
    }

    /// Splits a `[steps, features]` node into one `1×features` node per step.
    pub fn rows(&mut self, a: Var) -> Vec<Var> {
        let n = self.value(a).rows;
        (0..n)
            .map(|i| {
                let value = self.value(a).row(i);
                self.push(value, Op::Row(a, i))
            })
            .collect()
    }

    /// Looks up `indices` in `table`, one output row per index.
    pub fn gather_rows(&mut self, table: Var, indices: &[usize]) -> Result<Var, GraphError> {
        let t = self.value(table);
        if let Some(&bad) = indices.iter().find(|&&ix| ix >= t.rows) {
            return Err(GraphError::IndexOutOfRange { index: bad, rows: t.rows });
        }
        let value = Matrix {
            rows: indices.len(),
            cols: t.cols,
            data: indices.iter().map(|&ix| t.data[ix].clone()).collect(),
        };
        Ok(self.push(value, Op::GatherRows(table, indices.to_vec())))
    }

    /// Row-major reshape.
    pub fn reshape(&mut self, a: Var, rows: usize, cols: usize) -> Var {
        let value = self.value(a).reshape(rows, cols);
        self.push(value, Op::Reshape(a))
    }

    /// Differentiates the 1×1 node `loss` with respect to every node recorded
    /// before it.
    pub fn backward(&self, loss: Var) -> Result<Gradients, GraphError> {
        let lv = self.value(loss);
        if lv.rows != 1 || lv.cols != 1 {
            return Err(GraphError::NonScalarLoss { rows: lv.rows, cols: lv.cols });
        }

        let mut adjoints: Vec<Option<Matrix>> = vec![None; self.nodes.len()];
        adjoints[loss.0] = Some(Matrix::scalar(1.0));

        for i in (0..=loss.0).rev() {
            let Some(g) = adjoints[i].take() else { continue };
            self.propagate(i, &g, &mut adjoints);
            adjoints[i] = Some(g);
        }

        Ok(Gradients::new(&self.nodes, adjoints))
    }

    fn propagate(&self, i: usize, g: &Matrix, adj: &mut [Option<Matrix>]) {
        let node = &self.nodes[i];
        match &node.op {
            Op::Input | Op::Param(_) => {}
            Op::MatMul(a, b) => {
                let (av, bv) = (self.value(*a), self.value(*b));
                accumulate(adj, *a, g * &bv.transpose());
                accumulate(adj, *b, &av.transpose() * g);
            }
            Op::Add(a, b) => {
                accumulate(adj, *a, g.clone());
                accumulate(adj, *b, g.clone());
            }
            Op::Sub(a, b) => {
                accumulate(adj, *a, g.clone());
                accumulate(adj, *b, g.scale(-1.0));
            }
            Op::Mul(a, b) => {
                let (av, bv) = (self.value(*a), self.value(*b));
                accumulate(adj, *a, g.hadamard(bv));
                accumulate(adj, *b, g.hadamard(av));
            }
            Op::Scale(a, factor) => accumulate(adj, *a, g.scale(*factor)),
            Op::AddScalar(a, _) => accumulate(adj, *a, g.clone()),
            Op::Activate(a, activation) => {
                let pre = self.value(*a);
                accumulate(adj, *a, g.zip_map(pre, |gi, x| gi * activation.derivative(x)));
            }
            Op::Softmax(a) => {
                // dL/dz_j = y_j * (g_j - sum_k g_k y_k), row by row.
                let y = &node.value;
                let data = y.data.iter().zip(g.data.iter())
                    .map(|(y_row, g_row)| {
                        let dot: f64 = y_row.iter().zip(g_row.iter()).map(|(y, g)| y * g).sum();
                        y_row.iter().zip(g_row.iter()).map(|(y, g)| y * (g - dot)).collect()
                    })
                    .collect();
                accumulate(adj, *a, Matrix { rows: y.rows, cols: y.cols, data });
            }
            Op::Log(a) => {
                let av = self.value(*a);
                accumulate(adj, *a, g.zip_map(av, |gi, x| gi / x));
            }
            Op::Square(a) => {
                let av = self.value(*a);
                accumulate(adj, *a, g.zip_map(av, |gi, x| 2.0 * x * gi));
            }
            Op::Sum(a) => {
                let g0 = g.data[0][0];
                accumulate(adj, *a, self.value(*a).map(|_| g0));
            }
            Op::Mean(a) => {
                let av = self.value(*a);
                let g0 = g.data[0][0] / (av.rows * av.cols) as f64;
                accumulate(adj, *a, av.map(|_| g0));
            }
            Op::Element(a, r, c) => {
                let mut ga = Matrix::zeros_like(self.value(*a));
                ga.data[*r][*c] = g.data[0][0];
                accumulate(adj, *a, ga);
            }
            Op::Row(a, r) => {
                let mut ga = Matrix::zeros_like(self.value(*a));
                ga.data[*r] = g.data[0].clone();
                accumulate(adj, *a, ga);
            }
            Op::GatherRows(table, indices) => {
                let mut ga = Matrix::zeros_like(self.value(*table));
                for (g_row, &ix) in g.data.iter().zip(indices.iter()) {
                    for (acc, v) in ga.data[ix].iter_mut().zip(g_row.iter()) {
                        *acc += v;
                    }
                }
                accumulate(adj, *table, ga);
            }
            Op::Reshape(a) => {
                let av = self.value(*a);
                accumulate(adj, *a, g.reshape(av.rows, av.cols));
            }
        }
    }
}

fn accumulate(adj: &mut [Option<Matrix>], v: Var, g: Matrix) {
    if let Some(acc) = adj[v.0].as_mut() {
        acc.add_assign(&g);
    } else {
        adj[v.0] = Some(g);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_rule_on_scalars() {
        let mut tape = Tape::new();
        let a = tape.input(Matrix::scalar(3.0));
        let b = tape.input(Matrix::scalar(-2.0));
        let c = tape.mul(a, b);
        let grads = tape.backward(c).unwrap();
        assert_eq!(grads.wrt(a).unwrap().data[0][0], -2.0);
        assert_eq!(grads.wrt(b).unwrap().data[0][0], 3.0);
    }

    #[test]
    fn reused_node_accumulates() {
        let mut tape = Tape::new();
        let a = tape.input(Matrix::scalar(1.5));
        let b = tape.add(a, a);
        let c = tape.mul(b, a);
        // c = 2a^2, dc/da = 4a
        let grads = tape.backward(c).unwrap();
        assert!((grads.wrt(a).unwrap().data[0][0] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn non_scalar_loss_is_rejected() {
        let mut tape = Tape::new();
        let a = tape.input(Matrix::zeros(2, 2));
        let err = tape.backward(a).unwrap_err();
        assert_eq!(err, GraphError::NonScalarLoss { rows: 2, cols: 2 });
    }

    #[test]
    fn unreachable_nodes_get_no_adjoint() {
        let mut tape = Tape::new();
        let a = tape.input(Matrix::scalar(1.0));
        let unused = tape.input(Matrix::scalar(4.0));
        let loss = tape.square(a);
        let grads = tape.backward(loss).unwrap();
        assert!(grads.wrt(unused).is_none());
    }

    #[test]
    fn element_out_of_range() {
        let mut tape = Tape::new();
        let a = tape.input(Matrix::zeros(1, 3));
        assert_eq!(
            tape.element(a, 0, 3).unwrap_err(),
            GraphError::ColumnOutOfRange { index: 3, cols: 3 }
        );
        assert_eq!(
            tape.element(a, 2, 0).unwrap_err(),
            GraphError::IndexOutOfRange { index: 2, rows: 1 }
        );
        assert!(tape.gather_rows(a, &[1]).is_err());
    }
}
