// ============================================================
// Layer 6 - Metrics
// ============================================================
// Two pieces:
//
//   RankAccuracy  - top-1 / top-3 hit counting over ranked
//                   predictions. Shared by validation during
//                   training and by `predict --answers`.
//   MetricsLogger - appends one CSV row per epoch.
//
// Output file: <work_dir>/metrics.csv
//
//   epoch,train_loss,val_loss,top1,top3,lr
//   1,2.914300,2.701200,0.281000,0.493000,0.000100
//
// Loss should fall each epoch; val_loss rising while train_loss
// keeps falling means the model has started to memorise.

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

// ─── RankAccuracy ─────────────────────────────────────────────────────────────
/// Counts how often the gold index is the first ranked
/// candidate, and how often it is anywhere in the top three.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RankAccuracy {
    pub total: usize,
    pub top1:  usize,
    pub top3:  usize,
}

impl RankAccuracy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, ranked: &[u32], gold: u32) {
        self.total += 1;
        if ranked.first() == Some(&gold) {
            self.top1 += 1;
        }
        if ranked.iter().take(3).any(|&i| i == gold) {
            self.top3 += 1;
        }
    }

    pub fn merge(&mut self, other: RankAccuracy) {
        self.total += other.total;
        self.top1  += other.top1;
        self.top3  += other.top3;
    }

    pub fn top1_rate(&self) -> f64 {
        self.top1 as f64 / self.total.max(1) as f64
    }

    pub fn top3_rate(&self) -> f64 {
        self.top3 as f64 / self.total.max(1) as f64
    }
}

// ─── EpochMetrics ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,

    /// Mean cross-entropy over training batches
    pub train_loss: f64,

    /// Mean cross-entropy over validation batches
    pub val_loss: f64,

    pub top1: f64,
    pub top3: f64,

    /// Learning rate at the end of the epoch
    pub lr: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:      usize,
        train_loss: f64,
        val_loss:   f64,
        accuracy:   RankAccuracy,
        lr:         f64,
    ) -> Self {
        Self {
            epoch,
            train_loss,
            val_loss,
            top1: accuracy.top1_rate(),
            top3: accuracy.top3_rate(),
            lr,
        }
    }
}

// ─── MetricsLogger ────────────────────────────────────────────────────────────
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet, so a
    /// continued run appends to the same log.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,top1,top3,lr")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.train_loss,
            m.val_loss,
            m.top1,
            m.top3,
            m.lr,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_accuracy() {
        let mut acc = RankAccuracy::new();
        acc.record(&[5, 1, 2], 5);
        acc.record(&[5, 1, 2], 2);
        acc.record(&[5, 1, 2], 9);
        acc.record(&[5, 1, 2, 9], 9);
        assert_eq!(acc, RankAccuracy { total: 4, top1: 1, top3: 2 });
        assert!((acc.top3_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_accuracy_is_zero() {
        assert_eq!(RankAccuracy::new().top1_rate(), 0.0);
    }

    #[test]
    fn test_csv_appends_across_loggers() {
        let dir = tempfile::tempdir().unwrap();
        let m = EpochMetrics::new(1, 2.0, 1.5, RankAccuracy { total: 2, top1: 1, top3: 2 }, 1e-4);
        MetricsLogger::new(dir.path()).unwrap().log(&m).unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&m).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,train_loss,val_loss,top1,top3,lr");
        assert_eq!(lines[1], "1,2.000000,1.500000,0.500000,1.000000,0.000100");
    }
}
