// ============================================================
// Layer 5 - ML / Model Layer (burn)
// ============================================================
// All model math lives here:
//
//   model.rs     - the character transformer: token + position
//                  embeddings, post-norm encoder blocks, and a
//                  next-character head on the last position
//
//   schedule.rs  - one-cycle learning rate schedule
//
//   trainer.rs   - training loop with AdamW, gradient
//                  accumulation, validation top-k accuracy and
//                  per-epoch checkpoints
//
//   predictor.rs - loads the final model and implements the
//                  domain Predictor trait with deterministic
//                  top-k ranking

/// Character transformer architecture
pub mod model;

/// One-cycle learning rate schedule
pub mod schedule;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Predictor implementation over a trained model
pub mod predictor;
