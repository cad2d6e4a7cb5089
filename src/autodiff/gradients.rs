use std::collections::BTreeMap;

use crate::autodiff::tape::{Node, Op, Var};
use crate::math::matrix::Matrix;
use crate::params::param_set::ParamId;

/// Gradient of each parameter, keyed by its id.
pub type ParamGrads = BTreeMap<ParamId, Matrix>;

/// Adjoints produced by [`Tape::backward`](crate::autodiff::Tape::backward).
#[derive(Debug, Clone)]
pub struct Gradients {
    adjoints: Vec<Option<Matrix>>,
    params: ParamGrads,
}

impl Gradients {
    pub(crate) fn new(nodes: &[Node], adjoints: Vec<Option<Matrix>>) -> Gradients {
        let mut params = ParamGrads::new();
        for (node, adjoint) in nodes.iter().zip(adjoints.iter()) {
            if let Op::Param(id) = &node.op {
                let g = adjoint.clone().unwrap_or_else(|| Matrix::zeros_like(&node.value));
                match params.get_mut(id) {
                    Some(acc) => acc.add_assign(&g),
                    None => {
                        params.insert(*id, g);
                    }
                }
            }
        }
        Gradients { adjoints, params }
    }

    /// Gradient of the loss with respect to `v`, or `None` when `v` does
    /// not influence the loss.
    pub fn wrt(&self, v: Var) -> Option<&Matrix> {
        self.adjoints.get(v.0).and_then(|g| g.as_ref())
    }

    /// Gradient of every parameter bound on the tape. Parameters that did
    /// not reach the loss get a zero matrix of their own shape.
    pub fn params(&self) -> &ParamGrads {
        &self.params
    }

    pub fn into_params(self) -> ParamGrads {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use crate::autodiff::tape::Tape;
    use crate::math::matrix::Matrix;
    use crate::params::param_set::ParamSet;

    #[test]
    fn unused_param_gets_zero_gradient() {
        let mut params = ParamSet::new();
        let w = params.add("w", Matrix::from_data(vec![vec![2.0]]));
        let unused = params.add("unused", Matrix::zeros(2, 3));

        let mut tape = Tape::new();
        let bound = params.bind(&mut tape);
        let loss = tape.square(bound[w]);
        let grads = tape.backward(loss).unwrap().into_params();

        assert_eq!(grads[&w].data[0][0], 4.0);
        assert_eq!(grads[&unused], Matrix::zeros(2, 3));
    }
}
