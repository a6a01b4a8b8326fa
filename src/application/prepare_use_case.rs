// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Runs the data pipeline end to end for one corpus:
//
//   Step 1: Open the corpus source          (Layer 4 - data)
//   Step 2: Load or build the vocabulary    (Layer 4 + 6)
//   Step 3: Process the requested splits    (Layer 4 - data)
//   Step 4: Record split statistics         (Layer 6 - infra)
//   Step 5: Walk one epoch of batches       (Layer 4 - data)
//
// Nothing is trained here. The batches are what a training loop
// would consume; this use case reports their shapes so a corpus
// and its settings can be checked before a run.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path};

use crate::data::{
    batches::Collate,
    corpus::{Corpus, CorpusConfig},
    loader::ToutiaoNews,
    poetry::{TangShi, DEFAULT_SHARD_STRIDE},
    tokenizer::CharTokenizer,
    vocab::Vocab,
};
use crate::domain::sample::Split;
use crate::domain::traits::CorpusSource;
use crate::infra::{
    metrics::{SplitStats, StatsLogger},
    vocab_store::VocabStore,
};

// ─── Pipeline Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CorpusKind {
    /// News title classification (`text_!_label` lines)
    Toutiao,
    /// Tang poetry next-character prediction (JSON shards)
    Tangshi,
}

impl CorpusKind {
    /// Where the split files live unless a directory is given
    pub fn default_data_dir(self) -> &'static str {
        match self {
            CorpusKind::Toutiao => "data/toutiao",
            CorpusKind::Tangshi => "data/tangshi",
        }
    }
}

impl fmt::Display for CorpusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusKind::Toutiao => write!(f, "toutiao"),
            CorpusKind::Tangshi => write!(f, "tangshi"),
        }
    }
}

/// Everything one pipeline run needs. Serialisable so a run can be
/// described by a JSON file instead of flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub corpus:       CorpusKind,
    /// Falls back to the corpus kind's default directory
    pub data_dir:     Option<String>,
    /// vocab.json to reuse, or to create when missing
    pub vocab_path:   Option<String>,
    /// Directory for corpus_stats.csv
    pub stats_dir:    Option<String>,
    pub shard_stride: usize,
    #[serde(flatten)]
    pub corpus_config: CorpusConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            corpus:        CorpusKind::Toutiao,
            data_dir:      None,
            vocab_path:    None,
            stats_dir:     None,
            shard_stride:  DEFAULT_SHARD_STRIDE,
            corpus_config: CorpusConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn data_dir(&self) -> &str {
        self.data_dir
            .as_deref()
            .unwrap_or_else(|| self.corpus.default_data_dir())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config '{}'", path.display()))
    }
}

// ─── Reports ──────────────────────────────────────────────────────────────────
/// What one split looked like after batching.
#[derive(Debug, Clone)]
pub struct SplitSummary {
    pub split:       Split,
    pub samples:     usize,
    pub batches:     usize,
    /// `(rows, columns)` of the first batch's inputs
    pub first_shape: Option<(usize, usize)>,
    pub stats:       SplitStats,
}

#[derive(Debug, Clone)]
pub struct PrepareReport {
    pub vocab_size: usize,
    pub splits:     Vec<SplitSummary>,
}

// ─── PrepareUseCase ───────────────────────────────────────────────────────────
pub struct PrepareUseCase {
    config: PipelineConfig,
}

impl PrepareUseCase {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Build (or load) the vocabulary only.
    pub fn vocab(&self) -> Result<Vocab> {
        match self.config.corpus {
            CorpusKind::Toutiao => Ok(self.open(self.toutiao())?.vocab().clone()),
            CorpusKind::Tangshi => Ok(self.open(self.tangshi())?.vocab().clone()),
        }
    }

    /// Process and batch the given splits.
    pub fn execute(&self, splits: &[Split]) -> Result<PrepareReport> {
        match self.config.corpus {
            CorpusKind::Toutiao => self.run(self.toutiao(), splits),
            CorpusKind::Tangshi => self.run(self.tangshi(), splits),
        }
    }

    fn toutiao(&self) -> ToutiaoNews {
        ToutiaoNews::new(self.config.data_dir(), self.config.corpus_config.malformed)
    }

    fn tangshi(&self) -> TangShi {
        TangShi::new(self.config.data_dir()).with_shard_stride(self.config.shard_stride)
    }

    /// Vocabulary from vocab_path when it exists, otherwise built
    /// from the train split (and saved when vocab_path is set).
    pub(crate) fn open<S>(&self, source: S) -> Result<Corpus<S, CharTokenizer>>
    where
        S: CorpusSource,
        S::Target: Collate,
    {
        let tokenizer = CharTokenizer::new();
        let config    = self.config.corpus_config.clone();
        let store     = self.config.vocab_path.as_ref().map(VocabStore::new);

        match store {
            Some(store) if store.exists() => {
                let vocab = store.load()?;
                let name = source.name().to_string();
                Corpus::with_vocab(source, tokenizer, vocab, config)
                    .with_context(|| format!("Cannot open the {name} corpus"))
            }
            store => {
                let name   = source.name().to_string();
                let corpus = Corpus::new(source, tokenizer, config)
                    .with_context(|| format!("Cannot build the {name} vocabulary"))?;
                if let Some(store) = store {
                    store.save(corpus.vocab())?;
                }
                Ok(corpus)
            }
        }
    }

    fn run<S>(&self, source: S, splits: &[Split]) -> Result<PrepareReport>
    where
        S: CorpusSource,
        S::Target: Collate,
    {
        let corpus = self.open(source)?;
        let name   = corpus.source().name().to_string();
        let stats_logger = self
            .config
            .stats_dir
            .as_ref()
            .map(StatsLogger::new)
            .transpose()?;

        let mut summaries = Vec::with_capacity(splits.len());
        for &split in splits {
            let dataset = corpus
                .process(split)
                .with_context(|| format!("Cannot process the {name} {split} split"))?;

            let stats = SplitStats::compute(&name, split, &dataset, corpus.config().max_len);
            if let Some(logger) = &stats_logger {
                logger.log(&stats)?;
            }

            // only the training split is shuffled, as in a real epoch
            let shuffle = split == Split::Train && corpus.config().shuffle;

            let mut batches     = 0usize;
            let mut first_shape = None;
            for batch in corpus.make_batches(&dataset, shuffle) {
                tracing::debug!("{} batch {}: inputs {:?}", split, batches, batch.inputs.shape());
                first_shape.get_or_insert(batch.inputs.shape());
                batches += 1;
            }

            tracing::info!(
                "{} {}: {} samples in {} batches",
                name,
                split,
                dataset.sample_count(),
                batches
            );
            summaries.push(SplitSummary {
                split,
                samples: dataset.sample_count(),
                batches,
                first_shape,
                stats,
            });
        }

        Ok(PrepareReport {
            vocab_size: corpus.vocab().len(),
            splits:     summaries,
        })
    }
}
