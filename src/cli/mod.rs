// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap and hands each subcommand to its use case; results are
// printed here and nowhere else.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use std::path::Path;

use commands::{Commands, GenScriptsArgs, PredictArgs, TrainArgs, VocabArgs};
use crate::infra::{model_cache::ModelCache, timing::StageTimer};

#[derive(Parser, Debug)]
#[command(
    name = "char-predict",
    version = "0.1.0",
    about = "Build a multilingual character vocabulary, train a next-character transformer, and predict."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::GenScripts(args) => run_gen_scripts(args),
            Commands::Vocab(args)      => run_vocab(args),
            Commands::Train(args)      => run_train(args),
            Commands::Predict(args)    => run_predict(args),
        }
    }
}

fn run_gen_scripts(args: GenScriptsArgs) -> Result<()> {
    use crate::application::vocab_use_case::VocabUseCase;

    let written = VocabUseCase::new("", &args.scripts_dir).generate_scripts()?;
    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}

fn run_vocab(args: VocabArgs) -> Result<()> {
    use crate::application::vocab_use_case::VocabUseCase;

    let vocab = VocabUseCase::new(&args.work_dir, &args.scripts_dir).build(&args.scripts)?;
    println!("Vocabulary size: {} (saved to '{}')", vocab.len(), args.work_dir);
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on corpus in: {}", args.data_dir);
    let work_dir = args.work_dir.clone();

    let history = TrainUseCase::new(args.into()).execute()?;
    if let Some(last) = history.last() {
        println!(
            "Training complete after epoch {}: val_loss={:.4}, top1={:.1}%, top3={:.1}%",
            last.epoch, last.val_loss, last.top1 * 100.0, last.top3 * 100.0,
        );
    }
    println!("Model saved to '{}'", work_dir);
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let mut timer = StageTimer::new(args.time);
    let mut cache = ModelCache::new();
    let use_case  = PredictUseCase::load(Path::new(&args.work_dir), &mut cache, &mut timer)?;

    if let Some(input) = &args.input {
        let report = use_case.run_file(
            Path::new(input),
            args.output.as_deref().map(Path::new),
            args.answers.as_deref().map(Path::new),
            args.batch_size,
            &mut timer,
        )?;
        if let Some(acc) = report.accuracy {
            println!(
                "Accuracy over {} lines: top1={:.2}%, top3={:.2}%",
                acc.total, acc.top1_rate() * 100.0, acc.top3_rate() * 100.0,
            );
        }
    } else {
        let predictions = use_case.predict_texts(&args.text, &mut timer)?;
        for (text, pred) in args.text.iter().zip(predictions) {
            println!("{text:?} -> {pred:?}");
        }
    }

    timer.report();
    Ok(())
}
