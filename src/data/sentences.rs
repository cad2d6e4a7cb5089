use rand::Rng;

use crate::config::require;
use crate::data::context::context_window;
use crate::error::ConfigError;

/// A random sentence with its context windows and label.
#[derive(Debug, Clone)]
pub struct SentenceSample {
    pub words: Vec<usize>,
    pub windows: Vec<Vec<usize>>,
    pub label: usize,
}

/// Synthetic tagging data for the Elman network: sentences of random word
/// indices whose label is the last word modulo the number of classes. The
/// label is recoverable from the last context window, so the task is
/// learnable through the embeddings.
///
/// Build it with [`SentenceTask::new`], which checks the bounds below. A
/// task assembled by hand must keep `vocab_size`, `classes` and `window` at
/// least 1 and `1 <= min_len <= max_len`; otherwise sampling panics.
#[derive(Debug, Clone, Copy)]
pub struct SentenceTask {
    pub vocab_size: usize,
    pub classes: usize,
    pub window: usize,
    pub min_len: usize,
    pub max_len: usize,
}

impl SentenceTask {
    pub fn new(
        vocab_size: usize,
        classes: usize,
        window: usize,
        min_len: usize,
        max_len: usize,
    ) -> Result<SentenceTask, ConfigError> {
        require(vocab_size > 0, "vocab_size must be at least 1")?;
        require(classes > 0, "classes must be at least 1")?;
        require(window > 0, "window must be at least 1")?;
        require(min_len > 0, "min_len must be at least 1")?;
        require(min_len <= max_len, "min_len must not exceed max_len")?;
        Ok(SentenceTask { vocab_size, classes, window, min_len, max_len })
    }

    pub fn label_of(&self, words: &[usize]) -> usize {
        words.last().map_or(0, |w| w % self.classes)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SentenceSample {
        let len = rng.gen_range(self.min_len..=self.max_len);
        let words: Vec<usize> = (0..len).map(|_| rng.gen_range(0..self.vocab_size)).collect();
        self.from_words(words)
    }

    pub fn from_words(&self, words: Vec<usize>) -> SentenceSample {
        SentenceSample {
            windows: context_window(&words, self.window, self.vocab_size),
            label: self.label_of(&words),
            words,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn samples_respect_bounds() {
        let task = SentenceTask::new(20, 4, 3, 2, 5).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let s = task.sample(&mut rng);
            assert!((2..=5).contains(&s.words.len()));
            assert_eq!(s.windows.len(), s.words.len());
            assert!(s.label < 4);
            assert_eq!(s.label, s.words[s.words.len() - 1] % 4);
            assert!(s.windows.iter().flatten().all(|&w| w <= 20));
        }
    }

    #[test]
    fn degenerate_tasks_are_rejected() {
        assert!(matches!(SentenceTask::new(20, 0, 3, 2, 5), Err(ConfigError::Validation(_))));
        assert!(SentenceTask::new(0, 4, 3, 2, 5).is_err());
        assert!(SentenceTask::new(20, 4, 0, 2, 5).is_err());
        assert!(SentenceTask::new(20, 4, 3, 6, 5).is_err());
        assert!(SentenceTask::new(20, 4, 3, 0, 5).is_err());
    }
}
