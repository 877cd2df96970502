// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything between files on disk and tensor batches.
//
//   script files ──► FileScriptSource ──► VocabBuilder (domain)
//
//   *.txt corpus
//       │
//       ▼
//   TextCorpusLoader  → reads files, tags train/dev split
//       │
//       ▼
//   Preprocessor      → lowercases and normalises whitespace
//       │
//       ▼
//   ContextEncoder    → trailing L chars → padded index window
//       │
//       ▼
//   CharDataset       → (window, next char) samples, burn Dataset
//       │
//       ▼
//   CharBatcher       → stacks samples into tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop

/// Loads .txt corpus files from a directory
pub mod loader;

/// Lowercases and normalises raw text
pub mod preprocessor;

/// Fixed-width context encoding and decoding
pub mod encoder;

/// Reads pre-generated script character files
pub mod script_loader;

/// Implements burn's Dataset trait for next-char samples
pub mod dataset;

/// Implements burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded train/validation split and subsampling
pub mod splitter;
