// ============================================================
// Layer 5 - Burn Predictor
// ============================================================
// Implements the domain Predictor trait on top of a trained
// CharTransformer.
//
// Logits are pulled to host memory and ranked there with
// rank_top_k(): the padding index is never a candidate, higher
// scores rank first, and equal scores keep the lower index first
// so the output is fully deterministic.

use anyhow::Result;
use burn::prelude::*;

use crate::data::batcher::encoded_to_tensor;
use crate::domain::context::EncodedBatch;
use crate::domain::traits::Predictor;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{CharTransformer, CharTransformerConfig};

/// Indices of the `k` highest scores in `row`, skipping `exclude`.
/// NaN scores rank below every number.
pub fn rank_top_k(row: &[f32], k: usize, exclude: u32) -> Vec<u32> {
    let score = |i: usize| if row[i].is_nan() { f32::NEG_INFINITY } else { row[i] };

    // Small sorted buffer; k is tiny compared to the vocabulary
    let mut best: Vec<usize> = Vec::with_capacity(k + 1);
    for i in 0..row.len() {
        if i as u32 == exclude || k == 0 {
            continue;
        }
        let s = score(i);
        // Strict comparison: on a tie the earlier (lower) index stays ahead
        let pos = best.iter().position(|&j| s > score(j)).unwrap_or(best.len());
        if pos < k {
            best.insert(pos, i);
            best.truncate(k);
        }
    }
    best.into_iter().map(|i| i as u32).collect()
}

pub struct BurnPredictor<B: Backend> {
    model:  CharTransformer<B>,
    device: B::Device,
}

impl<B: Backend> BurnPredictor<B> {
    pub fn new(model: CharTransformer<B>, device: B::Device) -> Self {
        Self { model, device }
    }

    /// Rebuild the architecture from the saved training config and
    /// load the final weights.
    pub fn from_checkpoint(ckpt: &CheckpointManager, device: B::Device) -> Result<Self> {
        let cfg = ckpt.load_config()?;
        let model_cfg = CharTransformerConfig::from(&cfg).with_dropout(0.0);
        let model = ckpt.load_final(model_cfg.init::<B>(&device), &device)?;
        tracing::info!(
            "Model loaded: {} layers, d_model={}, vocab={}",
            cfg.num_layers,
            cfg.d_model,
            cfg.vocab_size
        );
        Ok(Self::new(model, device))
    }

    pub fn context_length(&self) -> usize {
        self.model.context_length
    }

    /// Raw next-character logits, one Vec per row.
    pub fn logits(&self, batch: &EncodedBatch) -> Result<Vec<Vec<f32>>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let inputs = encoded_to_tensor::<B>(batch, &self.device);
        let logits = self.model.forward(inputs);
        let [_, vocab] = logits.dims();
        let flat: Vec<f32> = logits.into_data().iter::<f32>().collect();
        Ok(flat.chunks_exact(vocab).map(<[f32]>::to_vec).collect())
    }
}

impl<B: Backend> Predictor for BurnPredictor<B> {
    fn predict_top_k(&self, batch: &EncodedBatch, exclude: u32, k: usize) -> Result<Vec<Vec<u32>>> {
        if batch.context_length() != self.context_length() {
            anyhow::bail!(
                "Batch context length {} does not match the model's {}",
                batch.context_length(),
                self.context_length()
            );
        }
        Ok(self
            .logits(batch)?
            .iter()
            .map(|row| rank_top_k(row, k, exclude))
            .collect())
    }
}
