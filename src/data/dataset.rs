// ============================================================
// Layer 4 - Character Dataset
// ============================================================
// Expands cleaned texts into (context window, next char) pairs
// and exposes them through burn's Dataset trait.
//
// For the text "cat" and L = 4 the samples are:
//
//   context        target
//   p p p p    →   c
//   p p p c    →   a
//   p p c a    →   t
//
// Targets missing from the vocabulary are skipped: there is no
// class for them, and mapping them to pad would teach the model
// to predict padding.

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::encoder::ContextEncoder;
use crate::domain::vocab::Vocabulary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharSample {
    /// Exactly `context_length` vocabulary indices
    pub context: Vec<u32>,
    pub target:  u32,
}

/// Build every prefix → next-char sample for a set of texts.
pub fn build_samples<S: AsRef<str>>(
    texts:   &[S],
    encoder: &ContextEncoder,
    vocab:   &Vocabulary,
) -> Vec<CharSample> {
    let mut samples = Vec::new();
    let mut skipped = 0usize;

    for text in texts {
        let chars: Vec<char> = text.as_ref().chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            match vocab.index_of(c) {
                Some(target) => samples.push(CharSample {
                    context: encoder.encode_chars(&chars[..i], vocab),
                    target,
                }),
                None => skipped += 1,
            }
        }
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} targets outside the vocabulary", skipped);
    }
    samples
}

pub struct CharDataset {
    samples: Vec<CharSample>,
}

impl CharDataset {
    pub fn new(samples: Vec<CharSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<CharSample> for CharDataset {
    fn get(&self, index: usize) -> Option<CharSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_sample_per_known_char() {
        let vocab = Vocabulary::from_chars(['c', 'a', 't']);
        let enc = ContextEncoder::for_vocab(4, &vocab);
        let samples = build_samples(&["cat"], &enc, &vocab);

        assert_eq!(samples.len(), 3);
        let p = vocab.pad_index();
        assert_eq!(samples[0].context, vec![p, p, p, p]);
        assert_eq!(samples[0].target, vocab.index_of('c').unwrap());
        assert_eq!(samples[2].context[2..], [vocab.index_of('c').unwrap(), vocab.index_of('a').unwrap()]);
    }

    #[test]
    fn test_unknown_targets_skipped() {
        let vocab = Vocabulary::from_chars(['a']);
        let enc = ContextEncoder::for_vocab(2, &vocab);
        let samples = build_samples(&["a€a"], &enc, &vocab);
        assert_eq!(samples.len(), 2);
        // the unknown char still occupies a context slot, as pad
        assert_eq!(samples[1].context, vec![vocab.index_of('a').unwrap(), vocab.pad_index()]);
    }

    #[test]
    fn test_dataset_indexing() {
        let ds = CharDataset::new(vec![CharSample { context: vec![0], target: 1 }]);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get(0).unwrap().target, 1);
        assert!(ds.get(1).is_none());
    }
}
