// ============================================================
// Layer 4 - Character Batcher
// ============================================================
// Implements burn's Batcher trait to stack CharSamples into
// tensors on the target device.
//
//   Input:  N samples, each with a context of length L
//   Output: inputs  [N, L] Int
//           targets [N]    Int
//
// Contexts are already fixed-width, so batching is a flatten
// followed by a reshape; no dynamic padding is needed.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::CharSample;
use crate::domain::context::EncodedBatch;

// ─── CharBatch ────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct CharBatch<B: Backend> {
    /// Context windows - shape: [batch_size, context_length]
    pub inputs: Tensor<B, 2, Int>,

    /// Next-character class per row - shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── CharBatcher ──────────────────────────────────────────────────────────────
#[derive(Clone, Debug, Default)]
pub struct CharBatcher;

impl CharBatcher {
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> Batcher<B, CharSample, CharBatch<B>> for CharBatcher {
    fn batch(&self, items: Vec<CharSample>, device: &B::Device) -> CharBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(|s| s.context.len()).unwrap_or(0);

        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.context.iter().map(|&x| x as i32))
            .collect();

        let targets: Vec<i32> = items.iter().map(|s| s.target as i32).collect();

        let inputs = Tensor::<B, 1, Int>::from_ints(input_flat.as_slice(), device)
            .reshape([batch_size, seq_len]);

        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), device);

        CharBatch { inputs, targets }
    }
}

/// Tensor view of an encoded prediction batch, for inference
/// outside the DataLoader.
pub fn encoded_to_tensor<B: Backend>(batch: &EncodedBatch, device: &B::Device) -> Tensor<B, 2, Int> {
    let flat: Vec<i32> = batch.as_flat().iter().map(|&x| x as i32).collect();
    Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device)
        .reshape([batch.rows(), batch.context_length()])
}
