use rand::Rng;

use crate::autodiff::{scan, Tape, Var};
use crate::config::rnn_xor::RnnXorConfig;
use crate::data::xor::XorSample;
use crate::error::Result;
use crate::loss::squared_error::HalfSquaredError;
use crate::math::matrix::Matrix;
use crate::optim::sgd::Sgd;
use crate::params::param_set::{Bound, ParamId, ParamSet};
use crate::train::train_config::TrainConfig;
use crate::train::trainer::TrainStep;

/// Single-layer sigmoid RNN reading one bit per step.
///
/// State is a column vector:
/// `h_t = σ(Wbit·x_t + Wstate·h_{t-1} + b)` and the prediction is the linear
/// readout `Wout·h_last`. The initial state is trained along with the
/// weights.
#[derive(Debug, Clone)]
pub struct RnnXor {
    params: ParamSet,
    w_bit: ParamId,
    w_state: ParamId,
    w_out: ParamId,
    b: ParamId,
    state0: ParamId,
}

impl RnnXor {
    pub fn new<R: Rng + ?Sized>(hidden: usize, init_scale: f64, rng: &mut R) -> RnnXor {
        let mut params = ParamSet::new();
        let w_bit = params.add("Wbit", Matrix::scaled_uniform(hidden, 1, init_scale, rng));
        let w_state = params.add("Wstate", Matrix::scaled_uniform(hidden, hidden, init_scale, rng));
        let w_out = params.add("Wout", Matrix::scaled_uniform(1, hidden, init_scale, rng));
        let b = params.add("b", Matrix::scaled_uniform(hidden, 1, init_scale, rng));
        let state0 = params.add("state0", Matrix::zeros(hidden, 1));

        RnnXor { params, w_bit, w_state, w_out, b, state0 }
    }

    pub fn from_config<R: Rng + ?Sized>(config: &RnnXorConfig, rng: &mut R) -> RnnXor {
        RnnXor::new(config.hidden, config.init_scale, rng)
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn forward(&self, tape: &mut Tape, p: &Bound, bits: &[Matrix]) -> Result<Var> {
        let steps: Vec<Var> = bits.iter().map(|bit| tape.input(bit.clone())).collect();

        let states = scan(tape, &steps, p[self.state0], |tape, bit, old_state| {
            let from_bit = tape.matmul(p[self.w_bit], bit);
            let from_state = tape.matmul(p[self.w_state], old_state);
            let z = tape.add(from_bit, from_state);
            let z = tape.add(z, p[self.b]);
            vec![tape.sigmoid(z)]
        })?;

        Ok(tape.matmul(p[self.w_out], states.last(0)))
    }

    /// The network's 1×1 prediction for `bits`.
    pub fn classify(&self, bits: &[Matrix]) -> Result<Matrix> {
        let mut tape = Tape::new();
        let p = self.params.bind(&mut tape);
        let output = self.forward(&mut tape, &p, bits)?;
        Ok(tape.value(output).clone())
    }

    /// One SGD step on a single sequence; returns the error before the update.
    pub fn train(&mut self, bits: &[Matrix], expected: &Matrix, learning_rate: f64) -> Result<f64> {
        let mut tape = Tape::new();
        let p = self.params.bind(&mut tape);
        let output = self.forward(&mut tape, &p, bits)?;
        let target = tape.input(expected.clone());
        let error = HalfSquaredError::record(&mut tape, output, target);

        let grads = tape.backward(error)?;
        Sgd::new(learning_rate).step(&mut self.params, grads.params());
        Ok(tape.scalar(error))
    }
}

impl TrainStep for RnnXor {
    type Sample = XorSample;

    fn train_step(&mut self, sample: &XorSample, config: &TrainConfig) -> Result<f64> {
        self.train(&sample.inputs, &sample.expected, config.learning_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::xor::{BitEncoding, XorTask};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn parameter_shapes() {
        let mut rng = StdRng::seed_from_u64(0);
        let model = RnnXor::new(3, 0.5, &mut rng);
        let shapes: Vec<(String, usize, usize)> = model.params().iter()
            .map(|(_, n, m)| (n.to_string(), m.rows, m.cols))
            .collect();
        assert_eq!(shapes, vec![
            ("Wbit".to_string(), 3, 1),
            ("Wstate".to_string(), 3, 3),
            ("Wout".to_string(), 1, 3),
            ("b".to_string(), 3, 1),
            ("state0".to_string(), 3, 1),
        ]);
    }

    #[test]
    fn training_step_lowers_error_on_the_same_sample() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut model = RnnXor::new(3, 0.5, &mut rng);
        let sample = XorTask::new(2, BitEncoding::ZeroOne).from_bits(&[true, false]);

        let before = model.train(&sample.inputs, &sample.expected, 0.1).unwrap();
        let out = model.classify(&sample.inputs).unwrap();
        let after = HalfSquaredError::loss(&out, &sample.expected);
        assert!(after < before, "{after} !< {before}");
    }

    #[test]
    fn state0_receives_updates() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut model = RnnXor::new(3, 0.5, &mut rng);
        let sample = XorTask::new(2, BitEncoding::ZeroOne).from_bits(&[true, true]);
        model.train(&sample.inputs, &Matrix::scalar(1.0), 0.5).unwrap();
        let state0 = model.params().id_of("state0").unwrap();
        assert_ne!(model.params().get(state0), &Matrix::zeros(3, 1));
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let model = RnnXor::new(3, 0.5, &mut rng);
        assert!(model.classify(&[]).is_err());
    }
}
