// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several layers:
//
//   atomic.rs        - temp file + rename writes for every
//                      persisted table
//
//   vocab_store.rs   - vocabulary persistence in the work dir
//                      (line and JSON formats); guarantees
//                      training and prediction share one table
//
//   script_writer.rs - generates the pre-generated script files
//                      from Unicode block ranges
//
//   checkpoint.rs    - model weights via burn's CompactRecorder
//                      and the TrainConfig needed to rebuild
//                      the architecture
//
//   metrics.rs       - top-k accuracy counting and the per-epoch
//                      CSV log
//
//   model_cache.rs   - loaded predictors keyed by work dir
//
//   timing.rs        - per-stage durations for `predict --time`

/// Atomic file writes
pub mod atomic;

/// Vocabulary saving and loading
pub mod vocab_store;

/// Script file generation
pub mod script_writer;

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Accuracy counters and training metrics CSV logger
pub mod metrics;

/// Explicit predictor cache
pub mod model_cache;

/// Stage timing
pub mod timing;
