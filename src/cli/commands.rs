// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Four subcommands:
//
//   gen-scripts  write the pre-generated script files
//   vocab        (re)build the vocabulary for a work dir
//   train        train the character transformer
//   predict      top-3 next characters for each input line

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate CJK, Arabic, Devanagari and Cyrillic script files
    GenScripts(GenScriptsArgs),

    /// Build the character vocabulary and save it to the work dir
    Vocab(VocabArgs),

    /// Train the next-character model on a .txt corpus
    Train(TrainArgs),

    /// Predict the next character for each line of a file
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct GenScriptsArgs {
    /// Directory to write <name>.json script files into
    #[arg(long, default_value = "scripts")]
    pub scripts_dir: String,
}

#[derive(Args, Debug)]
pub struct VocabArgs {
    /// Script groups: latin, cyrillic, cjk, arabic, devanagari or all.
    /// Repeat the flag or separate names with commas.
    #[arg(long = "scripts", default_value = "all", value_delimiter = ',')]
    pub scripts: Vec<String>,

    #[arg(long, default_value = "scripts")]
    pub scripts_dir: String,

    /// Directory the vocabulary files are written to
    #[arg(long, default_value = "work")]
    pub work_dir: String,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory of .txt files; names containing "dev" are validation data
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Where the vocabulary, config, checkpoints and metrics go
    #[arg(long, default_value = "work")]
    pub work_dir: String,

    /// Script groups for a newly built vocabulary
    #[arg(long = "scripts", default_value = "all", value_delimiter = ',')]
    pub scripts: Vec<String>,

    #[arg(long, default_value = "scripts")]
    pub scripts_dir: String,

    /// Characters of history the model sees
    #[arg(long, default_value_t = 32)]
    pub context_length: usize,

    #[arg(long, default_value_t = 512)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 3)]
    pub epochs: usize,

    /// Peak learning rate of the one-cycle schedule
    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,

    /// Hidden dimension; must be divisible by num_heads
    #[arg(long, default_value_t = 128)]
    pub d_model: usize,

    #[arg(long, default_value_t = 4)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 512)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Batches whose gradients are summed before each optimiser step
    #[arg(long, default_value_t = 1)]
    pub grad_accumulation: usize,

    /// Fraction of corpus lines to use, in (0, 1]
    #[arg(long, default_value_t = 1.0)]
    pub data_fraction: f64,

    /// Start from the saved model in the work dir
    #[arg(long)]
    pub continue_training: bool,

    /// Rebuild the vocabulary even if one exists
    #[arg(long)]
    pub rebuild_vocab: bool,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:          a.data_dir,
            work_dir:          a.work_dir,
            scripts:           a.scripts,
            scripts_dir:       a.scripts_dir,
            context_length:    a.context_length,
            batch_size:        a.batch_size,
            epochs:            a.epochs,
            lr:                a.lr,
            d_model:           a.d_model,
            num_heads:         a.num_heads,
            num_layers:        a.num_layers,
            d_ff:              a.d_ff,
            dropout:           a.dropout,
            grad_accumulation: a.grad_accumulation,
            data_fraction:     a.data_fraction,
            continue_training: a.continue_training,
            rebuild_vocab:     a.rebuild_vocab,
            seed:              a.seed,
            ..TrainConfig::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Work directory of a finished training run
    #[arg(long, default_value = "work")]
    pub work_dir: String,

    /// File with one context per line
    #[arg(long, conflicts_with = "text", required_unless_present = "text")]
    pub input: Option<String>,

    /// Predict for literal strings instead of a file (repeatable)
    #[arg(long)]
    pub text: Vec<String>,

    /// Output file; stdout when omitted
    #[arg(long, conflicts_with = "text")]
    pub output: Option<String>,

    /// Gold next characters, one per line, to score the predictions
    #[arg(long, requires = "input", conflicts_with = "text")]
    pub answers: Option<String>,

    /// Lines encoded and scored per model call
    #[arg(long, default_value_t = 512)]
    pub batch_size: usize,

    /// Log how long each stage took
    #[arg(long)]
    pub time: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_args_into_config() {
        let cli = Cli::try_parse_from([
            "char-predict", "train", "--scripts", "latin,cyrillic", "--epochs", "5", "--continue-training",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.scripts, vec!["latin", "cyrillic"]);
        assert_eq!(cfg.epochs, 5);
        assert!(cfg.continue_training);
        assert_eq!(cfg.context_length, 32);
    }

    #[test]
    fn test_predict_needs_input_or_text() {
        assert!(Cli::try_parse_from(["char-predict", "predict"]).is_err());
        assert!(Cli::try_parse_from(["char-predict", "predict", "--text", "hel"]).is_ok());
        assert!(Cli::try_parse_from(["char-predict", "predict", "--text", "a", "--answers", "g.txt"]).is_err());
        assert!(Cli::try_parse_from(["char-predict", "predict", "--text", "a", "--output", "o.txt"]).is_err());
        assert!(Cli::try_parse_from([
            "char-predict", "predict", "--input", "in.txt", "--output", "o.txt", "--answers", "g.txt",
        ])
        .is_ok());
    }
}
