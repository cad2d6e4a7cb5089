use crate::{autodiff::gradients::ParamGrads, params::param_set::ParamSet};

pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies `p ← p − lr·g` to every parameter that has a gradient.
    pub fn step(&self, params: &mut ParamSet, grads: &ParamGrads) {
        for (&id, grad) in grads {
            let param = params.get_mut(id);
            let updated = &*param - &grad.scale(self.learning_rate);
            *param = updated;
        }
    }
}
