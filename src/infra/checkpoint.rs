// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Saves and restores model weights using burn's CompactRecorder,
// plus the training config needed to rebuild the architecture.
//
// Layout under the work directory:
//
//   work_dir/
//     train_config.json                  ← architecture + hyperparameters
//     char_transformer.<ext>             ← final weights (used by predict)
//     checkpoints/
//       char_transformer_epoch_1.<ext>   ← weights after epoch 1
//       char_transformer_epoch_2.<ext>
//       latest_epoch.json                ← number of the newest epoch file
//
// The recorder appends its own extension; loading fails if the
// saved architecture does not match the model it is loaded into.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::infra::atomic::write_atomic;
use crate::ml::model::CharTransformer;

pub const FINAL_MODEL: &str = "char_transformer";
const CONFIG_FILE:     &str = "train_config.json";
const LATEST_EPOCH:    &str = "latest_epoch.json";

// CompactRecorder has used both over burn releases
const RECORD_EXTENSIONS: &[&str] = &["mpk", "mpk.gz"];

pub struct CheckpointManager {
    work_dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self { work_dir: work_dir.into() }
    }

    fn checkpoints_dir(&self) -> PathBuf {
        self.work_dir.join("checkpoints")
    }

    /// Save the weights after `epoch` and move the latest-epoch pointer.
    pub fn save_epoch<B: Backend>(&self, model: &CharTransformer<B>, epoch: usize) -> Result<()> {
        let dir = self.checkpoints_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let path = dir.join(format!("{FINAL_MODEL}_epoch_{epoch}"));
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        write_atomic(&dir.join(LATEST_EPOCH), serde_json::to_string(&epoch)?.as_bytes())
            .with_context(|| format!("Failed to write {LATEST_EPOCH}"))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Save the weights predict will load.
    pub fn save_final<B: Backend>(&self, model: &CharTransformer<B>) -> Result<()> {
        fs::create_dir_all(&self.work_dir)
            .with_context(|| format!("Cannot create '{}'", self.work_dir.display()))?;
        let path = self.work_dir.join(FINAL_MODEL);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save model to '{}'", path.display()))?;
        tracing::info!("Saved final model to '{}'", path.display());
        Ok(())
    }

    pub fn has_final(&self) -> bool {
        RECORD_EXTENSIONS
            .iter()
            .any(|ext| self.work_dir.join(format!("{FINAL_MODEL}.{ext}")).exists())
    }

    pub fn load_final<B: Backend>(
        &self,
        model:  CharTransformer<B>,
        device: &B::Device,
    ) -> Result<CharTransformer<B>> {
        let path = self.work_dir.join(FINAL_MODEL);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load model '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;
        Ok(model.load_record(record))
    }

    /// The newest per-epoch checkpoint number, if any run saved one.
    pub fn latest_epoch(&self) -> Result<Option<usize>> {
        let path = self.checkpoints_dir().join(LATEST_EPOCH);
        if !path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        Ok(Some(serde_json::from_str::<usize>(s.trim())?))
    }

    /// Must run before training so predict can rebuild the same model.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.work_dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        write_atomic(&path, json.as_bytes())
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.work_dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", path.display()))
    }
}
