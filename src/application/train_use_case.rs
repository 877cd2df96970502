// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load or build the vocabulary   (Layer 6 - infra)
//   Step 2: Load the .txt corpus           (Layer 4 - data)
//   Step 3: Clean and split into texts     (Layer 4 - data)
//   Step 4: Subsample / train-dev split    (Layer 4 - data)
//   Step 5: Build next-char samples        (Layer 4 - data)
//   Step 6: Save config                    (Layer 6 - infra)
//   Step 7: Run training loop              (Layer 5 - ml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::{build_samples, CharDataset},
    encoder::ContextEncoder,
    loader::TextCorpusLoader,
    preprocessor::Preprocessor,
    script_loader::FileScriptSource,
    splitter::{split_train_val, take_fraction},
};
use crate::domain::document::CorpusSplit;
use crate::domain::script::ScriptSelector;
use crate::domain::traits::CorpusSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
    vocab_store::VocabStore,
};
use crate::ml::model::CharTransformerConfig;
use crate::ml::trainer::run_training;

/// Share of training texts kept for training when the corpus has no dev file
const TRAIN_FRACTION: f64 = 0.9;

// ─── Training Configuration ──────────────────────────────────────────────────
// Saved to <work_dir>/train_config.json so predict can rebuild
// the exact architecture. vocab_size and pad_index are filled in
// from the vocabulary, not from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:          String,
    pub work_dir:          String,
    pub scripts:           Vec<String>,
    pub scripts_dir:       String,
    pub context_length:    usize,
    pub batch_size:        usize,
    pub epochs:            usize,
    pub lr:                f64,
    pub d_model:           usize,
    pub num_heads:         usize,
    pub num_layers:        usize,
    pub d_ff:              usize,
    pub dropout:           f64,
    pub grad_accumulation: usize,
    pub data_fraction:     f64,
    pub continue_training: bool,
    pub rebuild_vocab:     bool,
    pub seed:              u64,
    pub vocab_size:        usize,
    pub pad_index:         u32,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:          "data".to_string(),
            work_dir:          "work".to_string(),
            scripts:           vec!["all".to_string()],
            scripts_dir:       "scripts".to_string(),
            context_length:    32,
            batch_size:        512,
            epochs:            3,
            lr:                1e-4,
            d_model:           128,
            num_heads:         4,
            num_layers:        2,
            d_ff:              512,
            dropout:           0.1,
            grad_accumulation: 1,
            data_fraction:     1.0,
            continue_training: false,
            rebuild_vocab:     false,
            seed:              42,
            vocab_size:        0,
            pad_index:         0,
        }
    }
}

impl From<&TrainConfig> for CharTransformerConfig {
    fn from(cfg: &TrainConfig) -> Self {
        CharTransformerConfig::new(cfg.vocab_size, cfg.context_length)
            .with_d_model(cfg.d_model)
            .with_num_heads(cfg.num_heads)
            .with_num_layers(cfg.num_layers)
            .with_d_ff(cfg.d_ff)
            .with_dropout(cfg.dropout)
    }
}

impl TrainConfig {
    /// Reject settings that would only fail deep inside burn.
    pub fn validate(&self) -> Result<()> {
        if self.context_length == 0 {
            anyhow::bail!("context_length must be at least 1");
        }
        if self.batch_size == 0 {
            anyhow::bail!("batch_size must be at least 1");
        }
        if self.num_heads == 0 || self.d_model % self.num_heads != 0 {
            anyhow::bail!(
                "d_model ({}) must be divisible by num_heads ({})",
                self.d_model, self.num_heads
            );
        }
        if !(self.data_fraction > 0.0 && self.data_fraction <= 1.0) {
            anyhow::bail!("data_fraction must be in (0, 1], got {}", self.data_fraction);
        }
        Ok(())
    }
}

/// Cleaned training and validation texts.
pub struct CorpusTexts {
    pub train: Vec<String>,
    pub dev:   Vec<String>,
}

/// Load the corpus, clean it, and assign every line to a split.
pub fn prepare_texts<C: CorpusSource + ?Sized>(
    source:   &C,
    fraction: f64,
    seed:     u64,
) -> Result<CorpusTexts> {
    let prep = Preprocessor::new();
    let mut train = Vec::new();
    let mut dev   = Vec::new();

    for doc in source.load_all()? {
        let cleaned = prep.clean(&doc.text);
        let lines   = cleaned.lines().map(str::to_string);
        match doc.split {
            CorpusSplit::Train => train.extend(lines),
            CorpusSplit::Dev   => dev.extend(lines),
        }
    }

    let train = take_fraction(train, fraction, seed);
    let dev   = take_fraction(dev, fraction, seed);

    if dev.is_empty() {
        tracing::info!("No dev file found; holding out {:.0}% of training texts", (1.0 - TRAIN_FRACTION) * 100.0);
        let (train, dev) = split_train_val(train, TRAIN_FRACTION, seed);
        return Ok(CorpusTexts { train, dev });
    }
    Ok(CorpusTexts { train, dev })
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<Vec<EpochMetrics>> {
        let mut cfg = self.config.clone();
        cfg.validate()?;

        // ── Step 1: Vocabulary ───────────────────────────────────────────────
        let selector = ScriptSelector::from_names(&cfg.scripts)?;
        let source   = FileScriptSource::new(&cfg.scripts_dir);
        let store    = VocabStore::new(&cfg.work_dir);
        if cfg.rebuild_vocab && cfg.continue_training {
            tracing::warn!("Rebuilding the vocabulary while continuing training; indices may move");
        }
        let vocab = store
            .load_or_build(&selector, &source, cfg.rebuild_vocab)
            .with_context(|| format!("Cannot prepare vocabulary in '{}'", cfg.work_dir))?;

        cfg.vocab_size = vocab.len();
        cfg.pad_index  = vocab.pad_index();

        let ckpt = CheckpointManager::new(&cfg.work_dir);
        if cfg.continue_training && ckpt.has_final() {
            let saved = ckpt.load_config()?;
            if saved.vocab_size != cfg.vocab_size
                || saved.pad_index != cfg.pad_index
                || saved.context_length != cfg.context_length
            {
                anyhow::bail!(
                    "Saved model (vocab {}, context {}) does not match this run (vocab {}, context {})",
                    saved.vocab_size, saved.context_length, cfg.vocab_size, cfg.context_length
                );
            }
        }

        // ── Steps 2-4: Corpus ────────────────────────────────────────────────
        tracing::info!("Loading corpus from '{}'", cfg.data_dir);
        let texts = prepare_texts(&TextCorpusLoader::new(&cfg.data_dir), cfg.data_fraction, cfg.seed)?;
        tracing::info!("Texts: {} train, {} validation", texts.train.len(), texts.dev.len());

        // ── Step 5: Samples ──────────────────────────────────────────────────
        let encoder       = ContextEncoder::for_vocab(cfg.context_length, &vocab);
        let train_samples = build_samples(&texts.train, &encoder, &vocab);
        let val_samples   = build_samples(&texts.dev, &encoder, &vocab);
        if train_samples.is_empty() {
            anyhow::bail!("No training samples found in '{}'", cfg.data_dir);
        }
        tracing::info!("Samples: {} train, {} validation", train_samples.len(), val_samples.len());

        // ── Step 6: Save config for predict ──────────────────────────────────
        ckpt.save_config(&cfg)?;

        // ── Step 7: Train ────────────────────────────────────────────────────
        let metrics = MetricsLogger::new(&cfg.work_dir)?;
        run_training(
            &cfg,
            CharDataset::new(train_samples),
            CharDataset::new(val_samples),
            &ckpt,
            &metrics,
        )
    }
}
