// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands:
//   vocab    build the vocabulary from the train split
//   batches  process splits and walk one epoch of batches
//   infer    map prompts to ids with the training vocabulary
//
// The corpus flags are shared and convert into the application
// layer's PipelineConfig, so Layer 2 never sees clap types.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::prepare_use_case::{CorpusKind, PipelineConfig};
use crate::data::{
    converter::Conversion,
    corpus::CorpusConfig,
    loader::MalformedLinePolicy,
    padding::Layout,
    poetry::DEFAULT_SHARD_STRIDE,
};
use crate::domain::sample::Split;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the vocabulary and print its most frequent tokens
    Vocab(VocabArgs),

    /// Tokenise splits and report batch shapes
    Batches(BatchesArgs),

    /// Convert prompts to token ids
    Infer(InferArgs),
}

/// Flags every subcommand understands
#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    /// Which corpus format to read
    #[arg(long, value_enum, default_value_t = CorpusKind::Toutiao)]
    pub corpus: CorpusKind,

    /// Directory holding the split files [default: data/<corpus>]
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Vocabulary size, [UNK] and [PAD] included
    #[arg(long, default_value_t = 2000)]
    pub top_k: usize,

    /// vocab.json to reuse, or to write when it does not exist
    #[arg(long)]
    pub vocab: Option<String>,

    /// Drop unparsable lines with a warning instead of failing
    #[arg(long)]
    pub skip_malformed: bool,

    /// Multiplier between shard range indices and shard file names
    #[arg(long, default_value_t = DEFAULT_SHARD_STRIDE)]
    pub shard_stride: usize,
}

impl From<CorpusArgs> for PipelineConfig {
    fn from(a: CorpusArgs) -> Self {
        PipelineConfig {
            corpus:       a.corpus,
            data_dir:     a.data_dir,
            vocab_path:   a.vocab,
            stats_dir:    None,
            shard_stride: a.shard_stride,
            corpus_config: CorpusConfig {
                top_k:     a.top_k,
                malformed: if a.skip_malformed {
                    MalformedLinePolicy::Skip
                } else {
                    MalformedLinePolicy::Fail
                },
                ..CorpusConfig::default()
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct VocabArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// How many tokens to print
    #[arg(long, default_value_t = 20)]
    pub show: usize,
}

#[derive(Args, Debug)]
pub struct BatchesArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// JSON PipelineConfig; replaces all corpus flags when given
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Splits to process (repeatable)
    #[arg(long = "split", default_values_t = vec!["train".to_string(), "val".to_string()])]
    pub splits: Vec<String>,

    #[arg(long, default_value_t = 4)]
    pub batch_size: usize,

    /// Fixed sequence length; longer samples are truncated
    #[arg(long)]
    pub max_len: Option<usize>,

    /// Put the sequence axis first
    #[arg(long)]
    pub sequence_first: bool,

    /// Shuffle the training split
    #[arg(long)]
    pub shuffle: bool,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory to append corpus_stats.csv to
    #[arg(long)]
    pub stats_dir: Option<String>,
}

impl BatchesArgs {
    /// Flags folded into a PipelineConfig
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut cfg: PipelineConfig = self.corpus.clone().into();
        cfg.stats_dir                = self.stats_dir.clone();
        cfg.corpus_config.batch_size = self.batch_size;
        cfg.corpus_config.max_len    = self.max_len;
        cfg.corpus_config.shuffle    = self.shuffle;
        cfg.corpus_config.seed       = self.seed;
        cfg.corpus_config.layout     = if self.sequence_first {
            Layout::SequenceFirst
        } else {
            Layout::BatchFirst
        };
        cfg
    }

    pub fn parsed_splits(&self) -> anyhow::Result<Vec<Split>> {
        self.splits
            .iter()
            .map(|s| s.parse::<Split>().map_err(anyhow::Error::from))
            .collect()
    }
}

#[derive(Args, Debug)]
pub struct InferArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Prompt to convert (repeatable)
    #[arg(long = "text", required = true)]
    pub texts: Vec<String>,

    /// s2t or t2s; needs --table
    #[arg(long, requires = "table")]
    pub conversion: Option<String>,

    /// OpenCC character table, e.g. STCharacters.txt
    #[arg(long, requires = "conversion")]
    pub table: Option<PathBuf>,
}

impl InferArgs {
    pub fn conversion(&self) -> anyhow::Result<Option<(Conversion, PathBuf)>> {
        match (&self.conversion, &self.table) {
            (Some(c), Some(t)) => Ok(Some((c.parse::<Conversion>()?, t.clone()))),
            _ => Ok(None),
        }
    }
}
