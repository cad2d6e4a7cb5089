use rand::Rng;

use crate::autodiff::{scan, Tape, Var};
use crate::config::gru::GruConfig;
use crate::data::xor::XorSample;
use crate::error::Result;
use crate::loss::squared_error::HalfSquaredError;
use crate::math::matrix::Matrix;
use crate::optim::adagrad::Adagrad;
use crate::params::param_set::{Bound, ParamId, ParamSet};
use crate::train::train_config::TrainConfig;
use crate::train::trainer::TrainStep;

/// Input, recurrent and bias weights of one gate (or of the candidate state).
#[derive(Debug, Clone, Copy)]
struct GateParams {
    w: ParamId,
    u: ParamId,
    b: ParamId,
}

/// Gated recurrent unit (Cho et al., 2014) with a linear readout.
///
/// With column states and inputs:
///
/// ```text
/// r_t  = σ(Wr·x_t + Ur·h_{t-1} + br)
/// z_t  = σ(Wz·x_t + Uz·h_{t-1} + bz)
/// ĥ_t  = tanh(W·x_t + U·(r_t ⊙ h_{t-1}) + b)
/// h_t  = z_t ⊙ h_{t-1} + (1 - z_t) ⊙ ĥ_t
/// out  = S·h_last + Sb
/// ```
///
/// Training accumulates gradients per sample; `update` applies one Adagrad
/// step with the mean of everything accumulated since the last update.
#[derive(Debug, Clone)]
pub struct Gru {
    params: ParamSet,
    h0: ParamId,
    reset: GateParams,
    update: GateParams,
    candidate: GateParams,
    s: ParamId,
    sb: ParamId,
    optimizer: Adagrad,
}

impl Gru {
    pub fn new<R: Rng + ?Sized>(
        input_dim: usize,
        hidden: usize,
        output_dim: usize,
        scale: f64,
        rng: &mut R,
    ) -> Gru {
        let mut params = ParamSet::new();
        let h0 = params.add("h0", Matrix::zeros(hidden, 1));

        let mut gate = |params: &mut ParamSet, suffix: &str| GateParams {
            w: params.add(&format!("W{suffix}"), Matrix::scaled_uniform(hidden, input_dim, scale, rng)),
            u: params.add(&format!("U{suffix}"), Matrix::eye(hidden).scale(scale)),
            b: params.add(&format!("b{suffix}"), Matrix::scaled_uniform(hidden, 1, scale, rng)),
        };
        let reset = gate(&mut params, "r");
        let update = gate(&mut params, "z");
        let candidate = gate(&mut params, "");

        let s = params.add("S", Matrix::scaled_uniform(output_dim, hidden, scale, rng));
        let sb = params.add("Sb", Matrix::scaled_uniform(output_dim, 1, scale, rng));

        let optimizer = Adagrad::new(&params);
        Gru { params, h0, reset, update, candidate, s, sb, optimizer }
    }

    pub fn from_config<R: Rng + ?Sized>(config: &GruConfig, rng: &mut R) -> Gru {
        Gru::new(config.input_dim, config.hidden, config.output_dim, config.init_scale, rng)
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    /// `W·x + U·h + b` for one gate.
    fn affine(tape: &mut Tape, p: &Bound, gate: GateParams, x: Var, h: Var) -> Var {
        let wx = tape.matmul(p[gate.w], x);
        let uh = tape.matmul(p[gate.u], h);
        let sum = tape.add(wx, uh);
        tape.add(sum, p[gate.b])
    }

    fn forward(&self, tape: &mut Tape, p: &Bound, inputs: &[Matrix]) -> Result<Var> {
        let steps: Vec<Var> = inputs.iter().map(|x| tape.input(x.clone())).collect();

        let states = scan(tape, &steps, p[self.h0], |tape, x_t, h_tm1| {
            let r_pre = Gru::affine(tape, p, self.reset, x_t, h_tm1);
            let r_t = tape.sigmoid(r_pre);
            let z_pre = Gru::affine(tape, p, self.update, x_t, h_tm1);
            let z_t = tape.sigmoid(z_pre);

            let gated = tape.mul(r_t, h_tm1);
            let cand_pre = Gru::affine(tape, p, self.candidate, x_t, gated);
            let cand = tape.tanh(cand_pre);

            let keep = tape.mul(z_t, h_tm1);
            let not_z = tape.one_minus(z_t);
            let fresh = tape.mul(not_z, cand);
            let h_t = tape.add(keep, fresh);
            vec![h_t, r_t, z_t, cand]
        })?;

        let readout = tape.matmul(p[self.s], states.last(0));
        Ok(tape.add(readout, p[self.sb]))
    }

    pub fn classify(&self, inputs: &[Matrix]) -> Result<Matrix> {
        let mut tape = Tape::new();
        let p = self.params.bind(&mut tape);
        let output = self.forward(&mut tape, &p, inputs)?;
        Ok(tape.value(output).clone())
    }

    /// Accumulates the gradient of one sequence without touching the
    /// weights; returns the sample's error.
    pub fn train(&mut self, inputs: &[Matrix], expected: &Matrix) -> Result<f64> {
        let mut tape = Tape::new();
        let p = self.params.bind(&mut tape);
        let output = self.forward(&mut tape, &p, inputs)?;
        let target = tape.input(expected.clone());
        let error = HalfSquaredError::record(&mut tape, output, target);

        let grads = tape.backward(error)?;
        self.optimizer.accumulate(grads.params());
        Ok(tape.scalar(error))
    }

    /// Applies the accumulated mean gradient with Adagrad.
    pub fn update(&mut self, learning_rate: f64) {
        self.optimizer.update(&mut self.params, learning_rate);
    }

    /// Samples accumulated since the last update.
    pub fn pending(&self) -> usize {
        self.optimizer.pending()
    }
}

impl TrainStep for Gru {
    type Sample = XorSample;

    fn train_step(&mut self, sample: &XorSample, config: &TrainConfig) -> Result<f64> {
        let error = self.train(&sample.inputs, &sample.expected)?;
        if self.pending() >= config.batch_size {
            self.update(config.learning_rate);
        }
        Ok(error)
    }

    fn finish(&mut self, config: &TrainConfig) -> Result<()> {
        self.update(config.learning_rate);
        Ok(())
    }
}
