// ============================================================
// Layer 3 - Character Vocabulary
// ============================================================
// A bijection between single characters and indices [0, size).
//
// Index order is the persisted contract: a predictor trained
// against one table is only valid against the same table, so
// once a Vocabulary is saved its indices never move. The only
// mutation allowed after construction is appending the padding
// character to a table that somehow lacks it, which keeps every
// existing index where it was.
//
// VocabBuilder assembles a fresh table from script groups:
//   base set (a-z, 0-9, space)
//     ∪ each selected group
//     − control characters
//   sorted by code point, enumerated from 0.

use std::collections::{BTreeSet, HashMap};

use crate::domain::error::{VocabError, VocabResult};
use crate::domain::script::ScriptSelector;
use crate::domain::traits::ScriptSource;

/// The padding character. Always present in a vocabulary.
pub const PAD_CHAR: char = ' ';

#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// index → character
    chars: Vec<char>,
    /// character → index
    index: HashMap<char, u32>,
}

impl Vocabulary {
    /// Build from a set of characters. Indices follow code-point order.
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Self {
        let mut set: BTreeSet<char> = chars.into_iter().filter(|c| !c.is_control()).collect();
        set.insert(PAD_CHAR);
        Self::from_ordered_unchecked(set.into_iter().collect())
    }

    /// Rebuild a persisted table where position = index.
    /// Fails on duplicates; appends the padding character if missing.
    pub fn from_ordered(chars: Vec<char>) -> std::result::Result<Self, String> {
        let mut seen = BTreeSet::new();
        for &c in &chars {
            if !seen.insert(c) {
                return Err(format!("character {c:?} appears more than once"));
            }
        }
        let mut vocab = Self::from_ordered_unchecked(chars);
        vocab.ensure_padding();
        Ok(vocab)
    }

    fn from_ordered_unchecked(chars: Vec<char>) -> Self {
        let index = chars
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i as u32))
            .collect();
        Self { chars, index }
    }

    /// Append the padding character at the end if the table lacks it.
    /// Returns true when a repair happened.
    pub fn ensure_padding(&mut self) -> bool {
        if self.index.contains_key(&PAD_CHAR) {
            return false;
        }
        tracing::warn!(
            "Padding character missing from vocabulary; appending it at index {}",
            self.chars.len()
        );
        self.index.insert(PAD_CHAR, self.chars.len() as u32);
        self.chars.push(PAD_CHAR);
        true
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn index_of(&self, c: char) -> Option<u32> {
        self.index.get(&c).copied()
    }

    pub fn char_at(&self, index: u32) -> VocabResult<char> {
        self.chars
            .get(index as usize)
            .copied()
            .ok_or(VocabError::IndexOutOfRange { index, size: self.chars.len() })
    }

    pub fn contains(&self, c: char) -> bool {
        self.index.contains_key(&c)
    }

    pub fn pad_index(&self) -> u32 {
        // Construction guarantees presence
        self.index[&PAD_CHAR]
    }

    /// Characters in index order.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// (character, index) pairs in index order.
    pub fn entries(&self) -> impl Iterator<Item = (char, u32)> + '_ {
        self.chars.iter().enumerate().map(|(i, &c)| (c, i as u32))
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.chars == other.chars
    }
}

impl Eq for Vocabulary {}

/// The characters every vocabulary starts from.
pub fn base_charset() -> BTreeSet<char> {
    ('a'..='z').chain('0'..='9').chain([PAD_CHAR]).collect()
}

/// Resolves script groups through a `ScriptSource` and assembles
/// a deterministic vocabulary.
pub struct VocabBuilder<'a, S: ScriptSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: ScriptSource + ?Sized> VocabBuilder<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Union of the base set and every selected group, before
    /// control characters are dropped.
    pub fn resolve(&self, selector: &ScriptSelector) -> VocabResult<BTreeSet<char>> {
        let mut chars = base_charset();
        for group in selector.groups() {
            let group_chars = self.source.characters(group)?;
            tracing::debug!("Script group '{}' contributes {} characters", group, group_chars.len());
            chars.extend(group_chars);
        }
        Ok(chars)
    }

    pub fn build(&self, selector: &ScriptSelector) -> VocabResult<Vocabulary> {
        let vocab = Vocabulary::from_chars(self.resolve(selector)?);
        tracing::info!("Built vocabulary of {} characters from [{}]", vocab.len(), selector);
        Ok(vocab)
    }
}
