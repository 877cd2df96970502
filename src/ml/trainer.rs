// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Train + validation loop over burn DataLoaders.
//
//   AdamW, gradient-norm clipping at 1.0
//   one-cycle learning rate, stepped once per optimiser update
//   gradient accumulation: each batch loss is scaled by
//     1/grad_accumulation; a partial group left at the end of an
//     epoch is still applied
//
// Backend notes (burn 0.20):
//   - training runs on an AutodiffBackend
//   - model.valid() gives the same model on B::InnerBackend, so
//     the validation loader is built for the inner backend too
//   - validation ranks logits on the host with rank_top_k, the
//     same code path predict uses

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    grad_clipping::GradientClippingConfig,
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamWConfig, GradientsAccumulator, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{CharBatch, CharBatcher},
    dataset::{CharDataset, CharSample},
};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger, RankAccuracy};
use crate::ml::model::{CharTransformer, CharTransformerConfig};
use crate::ml::predictor::rank_top_k;
use crate::ml::schedule::OneCycleSchedule;

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Ranks scored during validation
const VALID_TOP_K: usize = 3;

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: CharDataset,
    val_dataset:   CharDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<Vec<EpochMetrics>> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop::<MyBackend>(cfg, train_dataset, val_dataset, ckpt_manager, metrics, device)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: CharDataset,
    val_dataset:   CharDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<Vec<EpochMetrics>> {
    // ── Build or resume model ─────────────────────────────────────────────────
    let model_cfg = CharTransformerConfig::from(cfg);
    let mut model: CharTransformer<B> = model_cfg.init(&device);

    let mut first_epoch = 1;
    if cfg.continue_training {
        if ckpt_manager.has_final() {
            model = ckpt_manager.load_final(model, &device)?;
            first_epoch = ckpt_manager.latest_epoch()?.unwrap_or(0) + 1;
            tracing::info!("Continuing training from saved model (epoch {})", first_epoch);
        } else {
            tracing::warn!("No saved model to continue from; starting fresh");
        }
    }
    tracing::info!(
        "Model ready: {} layers, d_model={}, vocab={}",
        cfg.num_layers, cfg.d_model, cfg.vocab_size
    );

    // ── Optimiser and schedule ────────────────────────────────────────────────
    let mut optim = AdamWConfig::new()
        .with_grad_clipping(Some(GradientClippingConfig::Norm(1.0)))
        .init();

    let accum             = cfg.grad_accumulation.max(1);
    let batches_per_epoch = train_dataset.sample_count().div_ceil(cfg.batch_size.max(1));
    let steps_per_epoch   = batches_per_epoch.div_ceil(accum);
    let schedule          = OneCycleSchedule::new(cfg.lr, steps_per_epoch * cfg.epochs);
    tracing::info!(
        "{} batches/epoch, {} optimiser steps/epoch (accumulation {})",
        batches_per_epoch, steps_per_epoch, accum
    );

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::<B, CharSample, CharBatch<B>>::new(CharBatcher::new())
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .set_device(device.clone())
        .build(train_dataset);

    let val_loader =
        DataLoaderBuilder::<B::InnerBackend, CharSample, CharBatch<B::InnerBackend>>::new(CharBatcher::new())
            .batch_size(cfg.batch_size)
            .num_workers(1)
            .set_device(device.clone())
            .build(val_dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let mut history = Vec::with_capacity(cfg.epochs);
    let mut step    = 0usize;
    let mut lr      = schedule.lr_at(0);

    for offset in 0..cfg.epochs {
        let epoch = first_epoch + offset;

        let mut accumulator    = GradientsAccumulator::<CharTransformer<B>>::new();
        let mut pending        = 0usize;
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.inputs, batch.targets);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.div_scalar(accum as f32).backward();
            accumulator.accumulate(&model, GradientsParams::from_grads(grads, &model));
            pending += 1;

            if pending == accum {
                lr    = schedule.lr_at(step);
                model = optim.step(lr, model, accumulator.grads());
                step += 1;
                pending = 0;
            }
        }

        if pending > 0 {
            lr    = schedule.lr_at(step);
            model = optim.step(lr, model, accumulator.grads());
            step += 1;
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;
        let mut accuracy     = RankAccuracy::new();

        for batch in val_loader.iter() {
            let (loss, logits) = model_valid.forward_loss(batch.inputs, batch.targets.clone());
            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;
            accuracy.merge(score_batch(logits, batch.targets, cfg.pad_index));
        }

        let avg_val_loss = if val_batches > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };

        let m = EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, accuracy, lr);
        tracing::info!(
            "Epoch {:>3} | train_loss={:.4} | val_loss={:.4} | top1={:.1}% | top3={:.1}% | lr={:.2e}",
            epoch, m.train_loss, m.val_loss, m.top1 * 100.0, m.top3 * 100.0, m.lr,
        );
        metrics.log(&m)?;
        ckpt_manager.save_epoch(&model, epoch)?;
        history.push(m);
    }

    ckpt_manager.save_final(&model)?;
    tracing::info!("Training complete");
    Ok(history)
}

/// Top-1/top-3 hits for one validation batch, padding excluded.
fn score_batch<B: Backend>(
    logits:  Tensor<B, 2>,
    targets: Tensor<B, 1, Int>,
    pad:     u32,
) -> RankAccuracy {
    let [_, vocab] = logits.dims();
    let scores: Vec<f32> = logits.into_data().iter::<f32>().collect();
    let gold:   Vec<i64> = targets.into_data().iter::<i64>().collect();

    let mut acc = RankAccuracy::new();
    for (row, &g) in scores.chunks_exact(vocab).zip(&gold) {
        acc.record(&rank_top_k(row, VALID_TOP_K, pad), g as u32);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    fn tiny_config(work_dir: &std::path::Path) -> TrainConfig {
        TrainConfig {
            work_dir:          work_dir.to_string_lossy().into_owned(),
            context_length:    4,
            batch_size:        4,
            epochs:            2,
            lr:                1e-3,
            d_model:           8,
            num_heads:         2,
            num_layers:        1,
            d_ff:              16,
            dropout:           0.0,
            grad_accumulation: 2,
            vocab_size:        6,
            pad_index:         0,
            ..TrainConfig::default()
        }
    }

    fn samples(n: usize) -> Vec<CharSample> {
        (0..n)
            .map(|i| CharSample {
                context: vec![0, 0, (i % 5) as u32 + 1, 1],
                target:  (i % 5) as u32 + 1,
            })
            .collect()
    }

    #[test]
    fn test_score_batch_excludes_pad() {
        let device = Default::default();
        let logits = Tensor::<NdArray, 1>::from_floats([9.0, 1.0, 3.0, 2.0], &device).reshape([1, 4]);
        let targets = Tensor::<NdArray, 1, Int>::from_ints([2], &device);
        let acc = score_batch(logits, targets, 0);
        assert_eq!(acc, RankAccuracy { total: 1, top1: 1, top3: 1 });
    }

    #[test]
    fn test_tiny_run_writes_metrics_and_models() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());
        let ckpt = CheckpointManager::new(dir.path());
        let metrics = MetricsLogger::new(dir.path()).unwrap();

        let history = train_loop::<TestBackend>(
            &cfg,
            CharDataset::new(samples(10)),
            CharDataset::new(samples(3)),
            &ckpt,
            &metrics,
            Default::default(),
        )
        .unwrap();

        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|m| m.train_loss.is_finite() && m.val_loss.is_finite()));
        assert!(ckpt.has_final());
        assert_eq!(ckpt.latest_epoch().unwrap(), Some(2));

        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_continue_training_numbers_epochs_after_last() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = tiny_config(dir.path());
        cfg.epochs = 1;
        let ckpt = CheckpointManager::new(dir.path());
        let metrics = MetricsLogger::new(dir.path()).unwrap();

        train_loop::<TestBackend>(&cfg, CharDataset::new(samples(6)), CharDataset::new(samples(2)), &ckpt, &metrics, Default::default()).unwrap();

        cfg.continue_training = true;
        let history = train_loop::<TestBackend>(&cfg, CharDataset::new(samples(6)), CharDataset::new(samples(2)), &ckpt, &metrics, Default::default()).unwrap();
        assert_eq!(history[0].epoch, 2);
        assert_eq!(ckpt.latest_epoch().unwrap(), Some(2));
    }
}
