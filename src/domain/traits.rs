// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The seams between the pure core and everything that touches
// disk or a tensor runtime:
//
//   ScriptSource  → where a script group's characters come from
//                   (curated lists, pre-generated files, tests)
//   CorpusSource  → where training text comes from
//   Predictor     → anything that ranks next characters for an
//                   encoded batch (the burn transformer, or a
//                   stub in tests)
//
// The application layer only sees these traits, so the vocab
// builder and the prediction pipeline are testable without a
// filesystem layout or a GPU.

use std::collections::BTreeSet;

use anyhow::Result;

use crate::domain::context::EncodedBatch;
use crate::domain::document::Document;
use crate::domain::error::VocabResult;
use crate::domain::script::ScriptGroup;

// ─── ScriptSource ─────────────────────────────────────────────────────────────
/// Resolves one script group to its characters.
///
/// Implementations must fail with a distinct error when required
/// data is absent; returning an empty set is never a fallback.
pub trait ScriptSource {
    fn characters(&self, group: ScriptGroup) -> VocabResult<BTreeSet<char>>;
}

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can supply text documents for training.
pub trait CorpusSource {
    fn load_all(&self) -> Result<Vec<Document>>;
}

// ─── Predictor ────────────────────────────────────────────────────────────────
/// Scores the next character for every row of an encoded batch.
///
/// Returns, per row, `k` vocabulary indices in descending score
/// order. `exclude` (the padding index) is never returned.
pub trait Predictor {
    fn predict_top_k(&self, batch: &EncodedBatch, exclude: u32, k: usize) -> Result<Vec<Vec<u32>>>;
}
