// ============================================================
// Layer 2 - PredictUseCase
// ============================================================
// Next-character prediction over a trained work directory:
//
//   input line ─► normalise ─► encode ─► predictor top-3 ─► decode
//
// Files are streamed in batch_size chunks so memory stays flat
// for any input size. Each input line yields exactly one output
// line of three characters in rank order.
//
// With an answers file (one gold next character per line) the
// run also reports top-1 and top-3 accuracy.

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{encoder::ContextEncoder, preprocessor::Preprocessor};
use crate::domain::traits::Predictor;
use crate::domain::vocab::{Vocabulary, PAD_CHAR};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::RankAccuracy,
    model_cache::ModelCache,
    timing::StageTimer,
    vocab_store::VocabStore,
};
use crate::ml::predictor::BurnPredictor;

/// Candidates returned per input
pub const TOP_K: usize = 3;

pub type InferBackend = burn::backend::Wgpu;
pub type ModelPredictor = BurnPredictor<InferBackend>;

/// What a streaming run processed.
#[derive(Debug, Clone)]
pub struct PredictReport {
    pub lines:    usize,
    pub accuracy: Option<RankAccuracy>,
}

pub struct PredictUseCase<P: Predictor> {
    vocab:        Vocabulary,
    encoder:      ContextEncoder,
    predictor:    Arc<P>,
    preprocessor: Preprocessor,
}

impl PredictUseCase<ModelPredictor> {
    /// Load the vocabulary and the cached (or freshly loaded) model
    /// for `work_dir`.
    pub fn load(
        work_dir: &Path,
        cache:    &mut ModelCache<ModelPredictor>,
        timer:    &mut StageTimer,
    ) -> Result<Self> {
        let vocab = timer
            .time("vocab_load", || VocabStore::new(work_dir).load())
            .with_context(|| format!("Cannot load vocabulary from '{}'", work_dir.display()))?;

        let ckpt = CheckpointManager::new(work_dir);
        let cfg  = ckpt.load_config()?;
        check_vocab_matches(&cfg, &vocab)?;

        let predictor = timer.time("model_load", || {
            cache.get_or_load(work_dir, |dir| {
                BurnPredictor::from_checkpoint(&CheckpointManager::new(dir), Default::default())
            })
        })?;

        Ok(Self::new(vocab, cfg.context_length, predictor))
    }
}

/// The vocabulary in a work dir must be the table the model was
/// trained with: same size and same padding index.
fn check_vocab_matches(cfg: &TrainConfig, vocab: &Vocabulary) -> Result<()> {
    if cfg.vocab_size != vocab.len() {
        anyhow::bail!(
            "Vocabulary has {} characters but the model was trained on {}",
            vocab.len(),
            cfg.vocab_size
        );
    }
    if cfg.pad_index != vocab.pad_index() {
        anyhow::bail!(
            "Vocabulary pads with index {} but the model was trained with {}",
            vocab.pad_index(),
            cfg.pad_index
        );
    }
    Ok(())
}

impl<P: Predictor> PredictUseCase<P> {
    pub fn new(vocab: Vocabulary, context_length: usize, predictor: Arc<P>) -> Self {
        let encoder = ContextEncoder::for_vocab(context_length, &vocab);
        Self { vocab, encoder, predictor, preprocessor: Preprocessor::new() }
    }

    /// Top-3 next characters for each input, as one string per input.
    pub fn predict_texts<S: AsRef<str>>(&self, texts: &[S], timer: &mut StageTimer) -> Result<Vec<String>> {
        Ok(self
            .predict_ranked(texts, timer)?
            .into_iter()
            .map(|(_, s)| s)
            .collect())
    }

    /// Ranked indices and their decoded string, per input.
    fn predict_ranked<S: AsRef<str>>(
        &self,
        texts: &[S],
        timer: &mut StageTimer,
    ) -> Result<Vec<(Vec<u32>, String)>> {
        let batch = timer.time("encode", || {
            let normalised: Vec<String> =
                texts.iter().map(|t| self.preprocessor.normalise(t.as_ref())).collect();
            self.encoder.encode(&normalised, &self.vocab)
        });

        let ranked = timer.time("inference", || {
            self.predictor.predict_top_k(&batch, self.encoder.pad_index(), TOP_K)
        })?;

        let decoded = self.encoder.decode(&ranked, &self.vocab)?;
        Ok(ranked.into_iter().zip(decoded).collect())
    }

    /// Stream `input` in chunks of `batch_size` lines, writing one
    /// prediction line per input line to `output` (stdout if None).
    pub fn run_file(
        &self,
        input:      &Path,
        output:     Option<&Path>,
        answers:    Option<&Path>,
        batch_size: usize,
        timer:      &mut StageTimer,
    ) -> Result<PredictReport> {
        let reader = BufReader::new(
            File::open(input).with_context(|| format!("Cannot open input '{}'", input.display()))?,
        );
        let mut writer: Box<dyn Write> = match output {
            Some(path) => Box::new(BufWriter::new(
                File::create(path)
                    .with_context(|| format!("Cannot create output '{}'", path.display()))?,
            )),
            None => Box::new(BufWriter::new(io::stdout().lock())),
        };

        let mut gold = match answers {
            Some(path) => Some(GoldReader::open(path)?),
            None => None,
        };
        let mut accuracy = RankAccuracy::new();

        let batch_size = batch_size.max(1);
        let mut chunk: Vec<String> = Vec::with_capacity(batch_size);
        let mut lines = 0usize;

        for line in reader.lines() {
            let line = line.with_context(|| format!("Cannot read '{}'", input.display()))?;
            chunk.push(line);
            lines += 1;
            if chunk.len() == batch_size {
                self.process_chunk(&chunk, writer.as_mut(), gold.as_mut(), &mut accuracy, timer)?;
                chunk.clear();
            }
        }
        if !chunk.is_empty() {
            self.process_chunk(&chunk, writer.as_mut(), gold.as_mut(), &mut accuracy, timer)?;
        }
        writer.flush()?;

        if gold.is_some() && accuracy.total < lines {
            tracing::warn!("Answers file has fewer lines ({}) than the input ({})", accuracy.total, lines);
        }
        tracing::info!("Predicted {} lines from '{}'", lines, input.display());

        Ok(PredictReport { lines, accuracy: gold.map(|_| accuracy) })
    }

    fn process_chunk(
        &self,
        chunk:    &[String],
        writer:   &mut dyn Write,
        gold:     Option<&mut GoldReader>,
        accuracy: &mut RankAccuracy,
        timer:    &mut StageTimer,
    ) -> Result<()> {
        let ranked = self.predict_ranked(chunk, timer)?;

        timer.time("write", || -> Result<()> {
            for (_, text) in &ranked {
                writeln!(writer, "{text}")?;
            }
            Ok(())
        })?;

        if let Some(gold) = gold {
            for (indices, _) in &ranked {
                let Some(c) = gold.next_char()? else { break };
                // Gold characters outside the vocabulary can never be hit
                accuracy.record(indices, self.vocab.index_of(c).unwrap_or(u32::MAX));
            }
        }
        Ok(())
    }
}

/// Streams gold next characters: the first character of each
/// lowercased line, an empty line meaning a space.
struct GoldReader {
    path:  PathBuf,
    lines: io::Lines<BufReader<File>>,
}

impl GoldReader {
    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Cannot open answers '{}'", path.display()))?;
        Ok(Self { path: path.to_path_buf(), lines: BufReader::new(file).lines() })
    }

    fn next_char(&mut self) -> Result<Option<char>> {
        match self.lines.next() {
            None => Ok(None),
            Some(line) => {
                let line = line.with_context(|| format!("Cannot read '{}'", self.path.display()))?;
                Ok(Some(gold_char(&line)))
            }
        }
    }
}

fn gold_char(line: &str) -> char {
    line.chars()
        .flat_map(char::to_lowercase)
        .next()
        .unwrap_or(PAD_CHAR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::EncodedBatch;
    use std::fs;

    /// Always ranks the indices that follow the last context index.
    struct NextIndices {
        size: u32,
    }

    impl Predictor for NextIndices {
        fn predict_top_k(&self, batch: &EncodedBatch, exclude: u32, k: usize) -> Result<Vec<Vec<u32>>> {
            Ok(batch
                .iter_rows()
                .map(|row| {
                    let last = *row.last().unwrap();
                    (1..self.size)
                        .map(|d| (last + d) % self.size)
                        .filter(|&i| i != exclude)
                        .take(k)
                        .collect()
                })
                .collect())
        }
    }

    fn use_case() -> PredictUseCase<NextIndices> {
        let vocab = Vocabulary::from_chars('a'..='z');
        let size = vocab.len() as u32;
        PredictUseCase::new(vocab, 8, Arc::new(NextIndices { size }))
    }

    #[test]
    fn test_three_distinct_non_pad_chars() {
        let uc = use_case();
        let mut timer = StageTimer::new(false);
        let out = uc.predict_texts(&["Hello", "", "zz"], &mut timer).unwrap();
        assert_eq!(out.len(), 3);
        // input is lowercased: after 'o' come p, q, r
        assert_eq!(out[0], "pqr");
        for s in &out {
            let chars: Vec<char> = s.chars().collect();
            assert_eq!(chars.len(), 3);
            assert!(!chars.contains(&PAD_CHAR));
            assert!(chars[0] != chars[1] && chars[1] != chars[2] && chars[0] != chars[2]);
        }
    }

    #[test]
    fn test_streams_file_in_chunks_with_accuracy() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.txt");
        let output = dir.path().join("pred.txt");
        let answers = dir.path().join("answer.txt");
        fs::write(&input, "abc\nxy\nhello\n").unwrap();
        fs::write(&answers, "D\nq\nz\n").unwrap();

        let uc = use_case();
        let mut timer = StageTimer::new(true);
        let report = uc.run_file(&input, Some(&output), Some(&answers), 2, &mut timer).unwrap();

        assert_eq!(report.lines, 3);
        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written.lines().collect::<Vec<_>>(), vec!["def", "zab", "pqr"]);

        // "d" is rank 1, "q" misses, "z" misses
        let acc = report.accuracy.unwrap();
        assert_eq!(acc, RankAccuracy { total: 3, top1: 1, top3: 1 });
        assert!(timer.total("inference").is_some());
    }

    #[test]
    fn test_vocab_must_match_training_config() {
        let vocab = Vocabulary::from_chars('a'..='z');
        let cfg = TrainConfig {
            vocab_size: vocab.len(),
            pad_index:  vocab.pad_index(),
            ..TrainConfig::default()
        };
        assert!(check_vocab_matches(&cfg, &vocab).is_ok());

        let wrong_size = TrainConfig { vocab_size: vocab.len() + 1, ..cfg.clone() };
        assert!(check_vocab_matches(&wrong_size, &vocab).is_err());

        // Same size, but the padding character moved
        let shifted = Vocabulary::from_ordered(
            ('a'..='z').chain([PAD_CHAR]).collect(),
        )
        .unwrap();
        assert_eq!(shifted.len(), vocab.len());
        let err = check_vocab_matches(&cfg, &shifted).unwrap_err();
        assert!(err.to_string().contains("padding index"), "{err}");
    }

    #[test]
    fn test_gold_char() {
        assert_eq!(gold_char("Ä"), 'ä');
        assert_eq!(gold_char(""), ' ');
    }
}
