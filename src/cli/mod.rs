// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap, hands a PipelineConfig to the
// application layer and prints what comes back. No pipeline
// logic lives here.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BatchesArgs, Commands, InferArgs, VocabArgs};

use crate::application::prepare_use_case::{PipelineConfig, PrepareUseCase};

#[derive(Parser, Debug)]
#[command(
    name = "corpus-pipeline",
    version,
    about = "Build vocabularies and padded batches from news-title and Tang poetry corpora."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Vocab(args)   => run_vocab(args),
            Commands::Batches(args) => run_batches(args),
            Commands::Infer(args)   => run_infer(args),
        }
    }
}

fn run_vocab(args: VocabArgs) -> Result<()> {
    let config: PipelineConfig = args.corpus.into();
    tracing::info!("Building {} vocabulary from '{}'", config.corpus, config.data_dir());

    let vocab = PrepareUseCase::new(config).vocab()?;

    println!("Vocabulary size: {}", vocab.len());
    for (id, token) in vocab.tokens().iter().enumerate().take(args.show) {
        println!("{id:>6}  {token}");
    }
    Ok(())
}

fn run_batches(args: BatchesArgs) -> Result<()> {
    let splits = args.parsed_splits()?;
    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None       => args.pipeline_config(),
    };
    tracing::debug!("Pipeline config: {:?}", config);

    let report = PrepareUseCase::new(config).execute(&splits)?;

    println!("Vocabulary size: {}", report.vocab_size);
    for s in &report.splits {
        let shape = s
            .first_shape
            .map(|(r, c)| format!("{r}x{c}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<5} samples={:<8} batches={:<6} first={:<9} len={}/{:.1}/{} unk={:.2}% truncated={}",
            s.split,
            s.samples,
            s.batches,
            shape,
            s.stats.min_len,
            s.stats.mean_len,
            s.stats.max_len,
            s.stats.unk_rate * 100.0,
            s.stats.truncated,
        );
    }
    Ok(())
}

fn run_infer(args: InferArgs) -> Result<()> {
    use crate::application::infer_use_case::InferUseCase;

    let conversion = args.conversion()?;
    let use_case   = InferUseCase::new(args.corpus.into(), conversion)?;

    for sample in use_case.run(&args.texts)? {
        println!("{}\t{:?}", sample.text, sample.token_ids);
    }
    Ok(())
}
