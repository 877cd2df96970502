// ============================================================
// Layer 4 - Context Encoder
// ============================================================
// Turns raw strings into fixed-width index windows and turns
// ranked predictor output back into characters.
//
// Encoding one string with context length L:
//
//   "hello", L = 8
//   trailing ≤ L chars  →  h e l l o
//   map through vocab   →  7 4 11 11 14      (unknown → pad)
//   left-pad to L       →  p p p 7 4 11 11 14
//
// The newest character always sits in the last column, which is
// the position the model reads its prediction from.

use crate::domain::context::EncodedBatch;
use crate::domain::error::VocabResult;
use crate::domain::vocab::Vocabulary;

#[derive(Debug, Clone, Copy)]
pub struct ContextEncoder {
    context_length: usize,
    pad_index:      u32,
}

impl ContextEncoder {
    pub fn new(context_length: usize, pad_index: u32) -> Self {
        Self { context_length, pad_index }
    }

    /// Encoder whose pad index comes from the vocabulary itself.
    pub fn for_vocab(context_length: usize, vocab: &Vocabulary) -> Self {
        Self::new(context_length, vocab.pad_index())
    }

    pub fn context_length(&self) -> usize {
        self.context_length
    }

    pub fn pad_index(&self) -> u32 {
        self.pad_index
    }

    /// Encode every string into one `[strings.len(), L]` batch.
    pub fn encode<S: AsRef<str>>(&self, strings: &[S], vocab: &Vocabulary) -> EncodedBatch {
        let mut batch = EncodedBatch::with_capacity(strings.len(), self.context_length);
        for s in strings {
            batch.push_row(&self.encode_one(s.as_ref(), vocab));
        }
        batch
    }

    pub fn encode_one(&self, text: &str, vocab: &Vocabulary) -> Vec<u32> {
        let chars: Vec<char> = text.chars().collect();
        self.encode_chars(&chars, vocab)
    }

    /// Same as `encode_one` for callers that already hold a char
    /// slice, such as the training sample generator walking prefixes.
    pub fn encode_chars(&self, chars: &[char], vocab: &Vocabulary) -> Vec<u32> {
        let start = chars.len().saturating_sub(self.context_length);
        let tail  = &chars[start..];

        let mut ids = vec![self.pad_index; self.context_length - tail.len()];
        ids.extend(
            tail.iter()
                .map(|&c| vocab.index_of(c).unwrap_or(self.pad_index)),
        );
        ids
    }

    /// Map each ranked row back to a string, keeping the given order.
    pub fn decode(&self, rows: &[Vec<u32>], vocab: &Vocabulary) -> VocabResult<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|&i| vocab.char_at(i)).collect::<VocabResult<String>>())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::VocabError;

    fn vocab() -> Vocabulary {
        Vocabulary::from_chars(('a'..='z').chain('0'..='9'))
    }

    #[test]
    fn test_hello_is_left_padded() {
        let v = vocab();
        let enc = ContextEncoder::for_vocab(8, &v);
        let p = v.pad_index();
        let id = |c| v.index_of(c).unwrap();
        assert_eq!(
            enc.encode_one("hello", &v),
            vec![p, p, p, id('h'), id('e'), id('l'), id('l'), id('o')]
        );
    }

    #[test]
    fn test_always_exactly_context_length() {
        let v = vocab();
        let l = 8;
        let enc = ContextEncoder::for_vocab(l, &v);
        for n in [0, 1, l - 1, l, l + 5] {
            let s: String = "abcdefghijklmnopqrstuvwxyz".chars().take(n).collect();
            assert_eq!(enc.encode_one(&s, &v).len(), l, "input length {n}");
        }
    }

    #[test]
    fn test_long_input_keeps_trailing_chars() {
        let v = vocab();
        let enc = ContextEncoder::for_vocab(3, &v);
        let expected: Vec<u32> = "xyz".chars().map(|c| v.index_of(c).unwrap()).collect();
        assert_eq!(enc.encode_one("abcxyz", &v), expected);
    }

    #[test]
    fn test_unknown_char_maps_to_pad() {
        let v = vocab();
        let enc = ContextEncoder::for_vocab(2, &v);
        assert_eq!(enc.encode_one("a😀", &v), vec![v.index_of('a').unwrap(), v.pad_index()]);
    }

    #[test]
    fn test_batch_shape() {
        let v = vocab();
        let enc = ContextEncoder::for_vocab(4, &v);
        let batch = enc.encode(&["", "ab", "abcdefg"], &v);
        assert_eq!(batch.rows(), 3);
        assert_eq!(batch.context_length(), 4);
        assert!(batch.row(0).iter().all(|&i| i == v.pad_index()));
    }

    #[test]
    fn test_decode_keeps_rank_order() {
        let v = vocab();
        let enc = ContextEncoder::for_vocab(4, &v);
        let rows = vec![vec![v.index_of('z').unwrap(), v.index_of('a').unwrap(), v.index_of('5').unwrap()]];
        assert_eq!(enc.decode(&rows, &v).unwrap(), vec!["za5".to_string()]);
    }

    #[test]
    fn test_decode_out_of_range_fails() {
        let v = vocab();
        let enc = ContextEncoder::for_vocab(4, &v);
        let err = enc.decode(&[vec![999]], &v).unwrap_err();
        assert!(matches!(err, VocabError::IndexOutOfRange { index: 999, .. }));
    }
}
