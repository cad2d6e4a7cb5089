use crate::autodiff::tape::{Tape, Var};
use crate::math::matrix::Matrix;

/// Handle to one parameter inside a [`ParamSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(pub(crate) usize);

impl ParamId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered, named bundle of trainable matrices.
///
/// Parameters are allocated once when a model is built and then mutated in
/// place by the optimizer after every training step.
#[derive(Debug, Clone, Default)]
pub struct ParamSet {
    names: Vec<String>,
    values: Vec<Matrix>,
}

impl ParamSet {
    pub fn new() -> ParamSet {
        ParamSet::default()
    }

    pub fn add(&mut self, name: &str, value: Matrix) -> ParamId {
        self.names.push(name.to_string());
        self.values.push(value);
        ParamId(self.values.len() - 1)
    }

    pub fn get(&self, id: ParamId) -> &Matrix {
        &self.values[id.0]
    }

    pub fn get_mut(&mut self, id: ParamId) -> &mut Matrix {
        &mut self.values[id.0]
    }

    pub fn name(&self, id: ParamId) -> &str {
        &self.names[id.0]
    }

    pub fn id_of(&self, name: &str) -> Option<ParamId> {
        self.names.iter().position(|n| n == name).map(ParamId)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ParamId> {
        (0..self.values.len()).map(ParamId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamId, &str, &Matrix)> {
        self.names.iter().zip(self.values.iter())
            .enumerate()
            .map(|(i, (n, v))| (ParamId(i), n.as_str(), v))
    }

    /// Total number of scalar weights.
    pub fn scalar_count(&self) -> usize {
        self.values.iter().map(|m| m.rows * m.cols).sum()
    }

    /// Records every parameter as a leaf on `tape`.
    pub fn bind(&self, tape: &mut Tape) -> Bound {
        let vars = self.iter().map(|(id, _, value)| tape.param(id, value)).collect();
        Bound { vars }
    }
}

/// Tape variables for each parameter of a [`ParamSet`], indexed by `ParamId`.
#[derive(Debug, Clone)]
pub struct Bound {
    vars: Vec<Var>,
}

impl Bound {
    pub fn var(&self, id: ParamId) -> Var {
        self.vars[id.0]
    }
}

impl std::ops::Index<ParamId> for Bound {
    type Output = Var;

    fn index(&self, id: ParamId) -> &Var {
        &self.vars[id.0]
    }
}
