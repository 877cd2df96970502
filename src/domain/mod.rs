// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Pure Rust types and traits: the character vocabulary, script
// groups, the encoded batch handed to a predictor, and the
// traits the outer layers implement.
//
// Rules for this layer:
//   - NO burn types
//   - NO direct file I/O (script data arrives via ScriptSource)
//
// Everything here is unit-testable without a GPU or a work dir.

// Corpus document and its train/dev split
pub mod document;

// Encoded [rows, context_length] index batch
pub mod context;

// Typed vocabulary errors
pub mod error;

// Script groups, curated letter lists and selectors
pub mod script;

// Core abstractions (traits) that other layers implement
pub mod traits;

// Character ↔ index table and its builder
pub mod vocab;
