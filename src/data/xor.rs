use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

/// Longest sequence a config may ask for; `all_sequences` lists `2^bits`
/// samples.
pub const MAX_BITS: usize = 16;

/// How a bit is presented to the network, and how the parity target is
/// written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitEncoding {
    /// `false → 0`, `true → 1`
    ZeroOne,
    /// `false → -1`, `true → 1`
    PlusMinusOne,
}

impl BitEncoding {
    pub fn encode(self, bit: bool) -> f64 {
        match (self, bit) {
            (_, true) => 1.0,
            (BitEncoding::ZeroOne, false) => 0.0,
            (BitEncoding::PlusMinusOne, false) => -1.0,
        }
    }

    /// Turns a network output back into a bit by thresholding halfway
    /// between the two encoded values.
    pub fn decode(self, value: f64) -> bool {
        match self {
            BitEncoding::ZeroOne => value >= 0.5,
            BitEncoding::PlusMinusOne => value >= 0.0,
        }
    }
}

/// One bit sequence, fed to a recurrent net one 1×1 step at a time.
#[derive(Debug, Clone)]
pub struct XorSample {
    pub bits: Vec<bool>,
    pub inputs: Vec<Matrix>,
    pub expected: Matrix,
}

impl XorSample {
    pub fn parity(&self) -> bool {
        self.bits.iter().fold(false, |acc, &b| acc ^ b)
    }
}

/// Random bit sequences labelled with their parity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XorTask {
    pub bits: usize,
    pub encoding: BitEncoding,
}

impl XorTask {
    pub fn new(bits: usize, encoding: BitEncoding) -> XorTask {
        XorTask { bits, encoding }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> XorSample {
        let bits: Vec<bool> = (0..self.bits).map(|_| rng.gen_bool(0.5)).collect();
        self.from_bits(&bits)
    }

    pub fn from_bits(&self, bits: &[bool]) -> XorSample {
        let parity = bits.iter().fold(false, |acc, &b| acc ^ b);
        XorSample {
            bits: bits.to_vec(),
            inputs: bits.iter().map(|&b| Matrix::scalar(self.encoding.encode(b))).collect(),
            expected: Matrix::scalar(self.encoding.encode(parity)),
        }
    }

    /// Every one of the `2^bits` sequences, in counting order, or `None`
    /// when `bits` exceeds [`MAX_BITS`].
    pub fn all_sequences(&self) -> Option<Vec<XorSample>> {
        if self.bits > MAX_BITS {
            return None;
        }
        let count = u32::try_from(self.bits).ok().and_then(|b| 1usize.checked_shl(b))?;
        let all = (0..count)
            .map(|n| {
                let bits: Vec<bool> = (0..self.bits).rev().map(|k| (n >> k) & 1 == 1).collect();
                self.from_bits(&bits)
            })
            .collect();
        Some(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn targets_follow_parity_and_encoding() {
        let task = XorTask::new(2, BitEncoding::ZeroOne);
        let s = task.from_bits(&[true, false]);
        assert_eq!(s.expected.data[0][0], 1.0);
        assert_eq!(s.inputs[1].data[0][0], 0.0);

        let task = XorTask::new(4, BitEncoding::PlusMinusOne);
        let s = task.from_bits(&[true, true, false, false]);
        assert_eq!(s.expected.data[0][0], -1.0);
        assert_eq!(s.inputs[2].data[0][0], -1.0);
    }

    #[test]
    fn enumerates_every_sequence() {
        let task = XorTask::new(3, BitEncoding::ZeroOne);
        let all = task.all_sequences().unwrap();
        assert_eq!(all.len(), 8);
        assert_eq!(all.iter().filter(|s| s.parity()).count(), 4);
    }

    #[test]
    fn long_sequences_are_not_enumerated() {
        assert!(XorTask::new(MAX_BITS + 1, BitEncoding::ZeroOne).all_sequences().is_none());
        assert!(XorTask::new(64, BitEncoding::PlusMinusOne).all_sequences().is_none());
        assert_eq!(XorTask::new(MAX_BITS, BitEncoding::ZeroOne).all_sequences().map(|v| v.len()), Some(1 << MAX_BITS));
    }

    #[test]
    fn sampled_sequences_have_requested_length() {
        let mut rng = StdRng::seed_from_u64(1);
        let task = XorTask::new(4, BitEncoding::PlusMinusOne);
        for _ in 0..10 {
            let s = task.sample(&mut rng);
            assert_eq!(s.inputs.len(), 4);
            assert_eq!(task.encoding.decode(s.expected.data[0][0]), s.parity());
        }
    }
}
