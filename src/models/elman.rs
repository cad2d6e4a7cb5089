use rand::Rng;

use crate::autodiff::{scan, ScanOutput, Tape, Var};
use crate::config::elman::ElmanConfig;
use crate::data::sentences::SentenceSample;
use crate::error::{GraphError, Result};
use crate::loss::nll::NegativeLogLikelihood;
use crate::math::matrix::Matrix;
use crate::optim::sgd::Sgd;
use crate::params::param_set::{Bound, ParamId, ParamSet};
use crate::train::train_config::TrainConfig;
use crate::train::trainer::TrainStep;

/// Elman network over word-window embeddings.
///
/// Each word of a sentence is represented by the concatenated embeddings of
/// its `cs`-word context window. With row vectors:
///
/// ```text
/// h_t = σ(x_t·Wx + h_{t-1}·Wh + bh)
/// s_t = softmax(h_t·W + b)
/// ```
///
/// The training loss is the negative log-likelihood of the sentence label
/// under the last step's distribution.
#[derive(Debug, Clone)]
pub struct Elman {
    params: ParamSet,
    emb: ParamId,
    wx: ParamId,
    wh: ParamId,
    w: ParamId,
    bh: ParamId,
    b: ParamId,
    h0: ParamId,
    embedding_dim: usize,
    window: usize,
    normalize_embeddings: bool,
}

impl Elman {
    /// `nh` hidden units, `nc` classes, `ne` words of dimension `de`,
    /// windows of `cs` words.
    pub fn new<R: Rng + ?Sized>(
        nh: usize,
        nc: usize,
        ne: usize,
        de: usize,
        cs: usize,
        init_scale: f64,
        rng: &mut R,
    ) -> Elman {
        let mut params = ParamSet::new();
        // One extra row: the padding word used at sentence edges.
        let emb = params.add("embeddings", Matrix::scaled_uniform(ne + 1, de, init_scale, rng));
        let wx = params.add("Wx", Matrix::scaled_uniform(de * cs, nh, init_scale, rng));
        let wh = params.add("Wh", Matrix::scaled_uniform(nh, nh, init_scale, rng));
        let w = params.add("W", Matrix::scaled_uniform(nh, nc, init_scale, rng));
        let bh = params.add("bh", Matrix::zeros(1, nh));
        let b = params.add("b", Matrix::zeros(1, nc));
        let h0 = params.add("h0", Matrix::zeros(1, nh));

        Elman {
            params,
            emb, wx, wh, w, bh, b, h0,
            embedding_dim: de,
            window: cs,
            normalize_embeddings: false,
        }
    }

    pub fn from_config<R: Rng + ?Sized>(config: &ElmanConfig, rng: &mut R) -> Elman {
        let mut model = Elman::new(
            config.hidden,
            config.classes,
            config.vocab_size,
            config.embedding_dim,
            config.window,
            config.init_scale,
            rng,
        );
        model.normalize_embeddings = config.normalize_embeddings;
        model
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    /// Index of the padding word.
    pub fn pad_index(&self) -> usize {
        self.params.get(self.emb).rows - 1
    }

    fn input_dim(&self) -> usize {
        self.embedding_dim * self.window
    }

    /// `[words, cs]` indices → `[words, de * cs]` features.
    fn embed(&self, tape: &mut Tape, p: &Bound, windows: &[Vec<usize>]) -> Result<Var> {
        if let Some(bad) = windows.iter().find(|w| w.len() != self.window) {
            return Err(GraphError::InputWidth { expected: self.window, got: bad.len() }.into());
        }
        let flat: Vec<usize> = windows.iter().flatten().copied().collect();
        let looked_up = tape.gather_rows(p[self.emb], &flat)?;
        Ok(tape.reshape(looked_up, windows.len(), self.input_dim()))
    }

    fn recur(&self, tape: &mut Tape, p: &Bound, x: Var) -> Result<ScanOutput> {
        let steps = tape.rows(x);
        let out = scan(tape, &steps, p[self.h0], |tape, x_t, h_tm1| {
            let from_x = tape.matmul(x_t, p[self.wx]);
            let from_h = tape.matmul(h_tm1, p[self.wh]);
            let pre = tape.add(from_x, from_h);
            let pre = tape.add(pre, p[self.bh]);
            let h_t = tape.sigmoid(pre);

            let logits = tape.matmul(h_t, p[self.w]);
            let logits = tape.add(logits, p[self.b]);
            let s_t = tape.softmax(logits);
            vec![h_t, s_t]
        })?;
        Ok(out)
    }

    fn check_features(&self, x: &Matrix) -> Result<()> {
        if x.cols != self.input_dim() {
            return Err(GraphError::InputWidth { expected: self.input_dim(), got: x.cols }.into());
        }
        Ok(())
    }

    /// Class distribution of every word, one row per word.
    pub fn predict_proba(&self, windows: &[Vec<usize>]) -> Result<Matrix> {
        let mut tape = Tape::new();
        let p = self.params.bind(&mut tape);
        let x = self.embed(&mut tape, &p, windows)?;
        let out = self.recur(&mut tape, &p, x)?;
        let data = out.series(1).iter().map(|&s| tape.value(s).data[0].clone()).collect();
        Ok(Matrix::from_data(data))
    }

    /// Most likely class of every word.
    pub fn classify(&self, windows: &[Vec<usize>]) -> Result<Vec<usize>> {
        Ok(self.predict_proba(windows)?.row_argmax())
    }

    fn step(&mut self, mut tape: Tape, out: ScanOutput, label: usize, learning_rate: f64) -> Result<f64> {
        let loss = NegativeLogLikelihood::record(&mut tape, out.last(1), label)?;
        let grads = tape.backward(loss)?;
        Sgd::new(learning_rate).step(&mut self.params, grads.params());
        Ok(tape.scalar(loss))
    }

    /// One SGD step on a sentence given as context windows.
    pub fn train(&mut self, windows: &[Vec<usize>], label: usize, learning_rate: f64) -> Result<f64> {
        let mut tape = Tape::new();
        let p = self.params.bind(&mut tape);
        let x = self.embed(&mut tape, &p, windows)?;
        let out = self.recur(&mut tape, &p, x)?;
        self.step(tape, out, label, learning_rate)
    }

    /// One SGD step on precomputed `[words, de * cs]` features; the
    /// embedding table is left untouched.
    pub fn train_features(&mut self, x: &Matrix, label: usize, learning_rate: f64) -> Result<f64> {
        self.check_features(x)?;
        let mut tape = Tape::new();
        let p = self.params.bind(&mut tape);
        let x = tape.input(x.clone());
        let out = self.recur(&mut tape, &p, x)?;
        self.step(tape, out, label, learning_rate)
    }

    /// Rescales every embedding row to unit Euclidean length. All-zero rows
    /// are left as they are.
    pub fn normalize(&mut self) {
        let emb = self.params.get_mut(self.emb);
        for row in emb.data.iter_mut() {
            let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > 0.0 {
                for x in row.iter_mut() {
                    *x /= norm;
                }
            }
        }
    }
}

impl TrainStep for Elman {
    type Sample = SentenceSample;

    fn train_step(&mut self, sample: &SentenceSample, config: &TrainConfig) -> Result<f64> {
        let error = self.train(&sample.windows, sample.label, config.learning_rate)?;
        if self.normalize_embeddings {
            self.normalize();
        }
        Ok(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::context::context_window;
    use rand::{rngs::StdRng, SeedableRng};

    fn small(rng: &mut StdRng) -> Elman {
        Elman::new(4, 3, 10, 5, 3, 0.2, rng)
    }

    #[test]
    fn classifies_every_word() {
        let mut rng = StdRng::seed_from_u64(1);
        let model = small(&mut rng);
        let windows = context_window(&[1, 2, 3, 4, 5], 3, model.pad_index());
        let probs = model.predict_proba(&windows).unwrap();
        assert_eq!((probs.rows, probs.cols), (5, 3));
        for row in &probs.data {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
        assert_eq!(model.classify(&windows).unwrap().len(), 5);
    }

    #[test]
    fn training_raises_label_probability() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut model = small(&mut rng);
        let windows = context_window(&[7, 0, 3], 3, model.pad_index());

        let before = model.predict_proba(&windows).unwrap().data[2][1];
        for _ in 0..20 {
            model.train(&windows, 1, 0.1).unwrap();
        }
        let after = model.predict_proba(&windows).unwrap().data[2][1];
        assert!(after > before, "{after} !> {before}");
    }

    #[test]
    fn rejects_bad_inputs() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut model = small(&mut rng);
        let windows = context_window(&[1, 2], 3, model.pad_index());

        assert!(model.train(&windows, 3, 0.1).is_err());
        assert!(model.train(&[vec![1, 2]], 0, 0.1).is_err());
        assert!(model.train(&[vec![1, 2, 99]], 0, 0.1).is_err());
        assert!(model.train_features(&Matrix::zeros(2, 14), 0, 0.1).is_err());
    }

    #[test]
    fn dense_features_train_without_touching_embeddings() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut model = small(&mut rng);
        let emb_before = model.params().get(model.emb).clone();
        let x = Matrix::uniform(3, 15, -1.0, 1.0, &mut rng);
        model.train_features(&x, 2, 0.1).unwrap();
        assert_eq!(model.params().get(model.emb), &emb_before);
    }

    #[test]
    fn normalize_gives_unit_rows() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut model = small(&mut rng);
        model.normalize();
        let emb = model.params().get(model.emb);
        for row in &emb.data {
            let norm: f64 = row.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-12);
        }
    }
}
