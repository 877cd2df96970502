// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal per
// command.
//
// Rules for this layer:
//   - No model math here (that's Layer 5)
//   - No argument parsing or printing (that's Layer 1)
//   - File formats belong to Layers 4 and 6
//   - Only workflow coordination

// Script generation and vocabulary builds
pub mod vocab_use_case;

// The training workflow
pub mod train_use_case;

// Streaming next-character prediction
pub mod predict_use_case;
