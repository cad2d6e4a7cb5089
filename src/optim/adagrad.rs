use crate::autodiff::gradients::ParamGrads;
use crate::math::matrix::Matrix;
use crate::params::param_set::{ParamId, ParamSet};

/// Added to the squared-gradient history before the square root.
pub const EPS: f64 = 1e-5;

/// Adagrad with gradient accumulation over a mini-batch.
///
/// `accumulate` sums per-sample gradients; `update` averages them over the
/// number of accumulated samples and applies
/// `p ← p − lr·ḡ / sqrt(hist + ε)` with the history as it stood *before*
/// this update, then adds `ḡ²` to the history. Batch size 1 gives plain
/// per-sample Adagrad.
#[derive(Debug, Clone)]
pub struct Adagrad {
    history: Vec<Matrix>,
    pending: Vec<Matrix>,
    pending_count: usize,
}

impl Adagrad {
    pub fn new(params: &ParamSet) -> Adagrad {
        let history: Vec<Matrix> = params.iter().map(|(_, _, m)| Matrix::zeros_like(m)).collect();
        Adagrad {
            pending: history.clone(),
            history,
            pending_count: 0,
        }
    }

    pub fn accumulate(&mut self, grads: &ParamGrads) {
        for (id, grad) in grads {
            self.pending[id.index()].add_assign(grad);
        }
        self.pending_count += 1;
    }

    /// Number of samples accumulated since the last update.
    pub fn pending(&self) -> usize {
        self.pending_count
    }

    pub fn update(&mut self, params: &mut ParamSet, learning_rate: f64) {
        if self.pending_count == 0 {
            return;
        }
        let inv_batch = 1.0 / self.pending_count as f64;

        for id in params.ids() {
            let i = id.index();
            let mean_grad = self.pending[i].scale(inv_batch);
            let hist = &self.history[i];

            let step = mean_grad.zip_map(hist, |g, h| learning_rate * g / (h + EPS).sqrt());
            let new_hist = hist + &mean_grad.hadamard(&mean_grad);
            let param = params.get_mut(id);
            let updated = &*param - &step;
            *param = updated;

            self.history[i] = new_hist;
            self.pending[i] = Matrix::zeros_like(&mean_grad);
        }
        self.pending_count = 0;
    }

    /// One per-sample update: `accumulate` followed by `update`.
    pub fn step(&mut self, params: &mut ParamSet, grads: &ParamGrads, learning_rate: f64) {
        self.accumulate(grads);
        self.update(params, learning_rate);
    }

    /// Sum of squared mean gradients applied to `id` so far.
    pub fn history(&self, id: ParamId) -> &Matrix {
        &self.history[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(value: f64) -> (ParamSet, ParamId) {
        let mut params = ParamSet::new();
        let id = params.add("p", Matrix::scalar(value));
        (params, id)
    }

    #[test]
    fn first_step_uses_empty_history() {
        let (mut params, id) = single(1.0);
        let mut opt = Adagrad::new(&params);
        let mut grads = ParamGrads::new();
        grads.insert(id, Matrix::scalar(0.5));

        opt.step(&mut params, &grads, 0.01);

        let expected = 1.0 - 0.01 * 0.5 / EPS.sqrt();
        assert!((params.get(id).data[0][0] - expected).abs() < 1e-12);
        assert!((opt.history(id).data[0][0] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn batch_update_uses_mean_gradient() {
        let (mut params, id) = single(0.0);
        let mut opt = Adagrad::new(&params);
        for g in [1.0, 3.0] {
            let mut grads = ParamGrads::new();
            grads.insert(id, Matrix::scalar(g));
            opt.accumulate(&grads);
        }
        assert_eq!(opt.pending(), 2);

        opt.update(&mut params, 0.1);
        assert_eq!(opt.pending(), 0);
        assert!((opt.history(id).data[0][0] - 4.0).abs() < 1e-12);

        // Second update with the same mean gradient now divides by sqrt(4 + eps).
        let before = params.get(id).data[0][0];
        let mut grads = ParamGrads::new();
        grads.insert(id, Matrix::scalar(2.0));
        opt.step(&mut params, &grads, 0.1);
        let delta = before - params.get(id).data[0][0];
        assert!((delta - 0.1 * 2.0 / (4.0 + EPS).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn update_without_samples_is_a_no_op() {
        let (mut params, id) = single(3.0);
        let mut opt = Adagrad::new(&params);
        opt.update(&mut params, 1.0);
        assert_eq!(params.get(id).data[0][0], 3.0);
    }
}
