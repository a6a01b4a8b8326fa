// ============================================================
// Layer 4 — Corpus Pipeline
// ============================================================
// Ties a CorpusSource, a Tokenizer and a Vocab together:
//
//   new()           → load the train split, build the vocabulary
//   load_raw(split) → raw (text, label) pairs
//   process(split)  → tokenise, map to ids, encode targets
//   make_batches()  → one epoch of padded batches
//
// The vocabulary always comes from the training split. Val and
// test tokens missing from it map to [UNK].

use std::cell::Cell;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::batches::{BatchIter, Collate, PaddingOptions};
use crate::data::dataset::CorpusDataset;
use crate::data::loader::MalformedLinePolicy;
use crate::data::padding::Layout;
use crate::data::vocab::Vocab;
use crate::domain::error::CorpusError;
use crate::domain::sample::{RawSample, Split, TokenizedSample};
use crate::domain::traits::{CorpusSource, ScriptConverter, Tokenizer};

// ─── CorpusConfig ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Vocabulary size including [UNK] and [PAD]
    pub top_k:      usize,
    /// Fixed sequence length; None pads to the longest sample per batch
    pub max_len:    Option<usize>,
    pub batch_size: usize,
    pub layout:     Layout,
    /// Shuffle the training split each epoch
    pub shuffle:    bool,
    /// Seed for reproducible shuffling
    pub seed:       Option<u64>,
    pub malformed:  MalformedLinePolicy,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            top_k:      2000,
            max_len:    None,
            batch_size: 4,
            layout:     Layout::BatchFirst,
            shuffle:    true,
            seed:       None,
            malformed:  MalformedLinePolicy::Fail,
        }
    }
}

impl CorpusConfig {
    pub fn validate(&self) -> Result<(), CorpusError> {
        if self.top_k < 2 {
            return Err(CorpusError::InvalidConfig(format!(
                "top_k must be at least 2, got {}",
                self.top_k
            )));
        }
        if self.batch_size == 0 {
            return Err(CorpusError::InvalidConfig("batch_size must be positive".into()));
        }
        if self.max_len == Some(0) {
            return Err(CorpusError::InvalidConfig("max_len must be positive when set".into()));
        }
        Ok(())
    }
}

// ─── Corpus ───────────────────────────────────────────────────────────────────
pub struct Corpus<S, K> {
    source:    S,
    tokenizer: K,
    vocab:     Vocab,
    config:    CorpusConfig,
    /// Number of shuffled passes handed out so far
    passes:    Cell<u64>,
}

impl<S, K> Corpus<S, K>
where
    S: CorpusSource,
    S::Target: Collate,
    K: Tokenizer,
{
    /// Load the training split and build the vocabulary from it.
    pub fn new(source: S, tokenizer: K, config: CorpusConfig) -> Result<Self, CorpusError> {
        config.validate()?;
        let raw   = source.load_raw(Split::Train)?;
        let vocab = Vocab::build(raw.iter().map(|s| s.text.as_str()), config.top_k, &tokenizer)?;
        tracing::info!("{} vocabulary holds {} tokens", source.name(), vocab.len());
        Self::with_vocab(source, tokenizer, vocab, config)
    }

    /// Reuse an existing vocabulary, e.g. one saved at training time.
    pub fn with_vocab(
        source:    S,
        tokenizer: K,
        vocab:     Vocab,
        config:    CorpusConfig,
    ) -> Result<Self, CorpusError> {
        config.validate()?;
        Ok(Self {
            source,
            tokenizer,
            vocab,
            config,
            passes: Cell::new(0),
        })
    }

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    pub fn config(&self) -> &CorpusConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn padding(&self) -> PaddingOptions {
        PaddingOptions {
            padding_value: self.vocab.pad_id(),
            max_len:       self.config.max_len,
            layout:        self.config.layout,
        }
    }

    /// Tokenise `text` and map every token to its id.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.vocab.encode(&self.tokenizer.tokenize(text))
    }

    pub fn load_raw(&self, split: Split) -> Result<Vec<RawSample>, CorpusError> {
        self.source.load_raw(split)
    }

    /// Turn one split into id sequences paired with targets.
    ///
    /// A target that cannot be encoded is handled by the configured
    /// MalformedLinePolicy.
    pub fn process(&self, split: Split) -> Result<CorpusDataset<S::Target>, CorpusError> {
        let raw = self.source.load_raw(split)?;
        tracing::info!("Processing {} {} samples", raw.len(), split);

        let encode = |text: &str| self.encode(text);
        let mut samples = Vec::with_capacity(raw.len());

        for (i, sample) in raw.iter().enumerate() {
            let token_ids = encode(&sample.text);
            tracing::debug!("Sample {}: {:?} → {:?}", i, sample.text, token_ids);

            match self.source.encode_target(split, i, &sample.label, &encode) {
                Ok(target) => samples.push(TokenizedSample::new(token_ids, target)),
                Err(e)     => self.config.malformed.handle(e)?,
            }
        }

        Ok(CorpusDataset::new(samples))
    }

    /// One epoch of batches. Shuffled passes draw a new order each
    /// call; with a configured seed the sequence of orders repeats
    /// across runs.
    pub fn make_batches<'a>(
        &self,
        dataset: &'a CorpusDataset<S::Target>,
        shuffle: bool,
    ) -> BatchIter<'a, S::Target> {
        if !shuffle {
            return BatchIter::new(dataset, self.config.batch_size, self.padding(), None);
        }

        let pass = self.passes.get();
        self.passes.set(pass + 1);

        let seed = match self.config.seed {
            Some(seed) => seed.wrapping_add(pass),
            None       => rand::thread_rng().gen(),
        };
        BatchIter::shuffled(dataset, self.config.batch_size, self.padding(), seed)
    }

    /// Train and validation datasets; only train is shuffled later.
    pub fn load_train_val(
        &self,
    ) -> Result<(CorpusDataset<S::Target>, CorpusDataset<S::Target>), CorpusError> {
        let train = self.process(Split::Train)?;
        let val   = self.process(Split::Val)?;
        tracing::info!(
            "Train and validation sets ready: {}:{} samples",
            train.sample_count(),
            val.sample_count()
        );
        Ok((train, val))
    }

    pub fn load_test(&self) -> Result<CorpusDataset<S::Target>, CorpusError> {
        let test = self.process(Split::Test)?;
        tracing::info!("Test set ready: {} samples", test.sample_count());
        Ok(test)
    }

    /// Id sequences for free-form inference inputs. Each text is
    /// normalised by `converter` first; nothing is padded.
    pub fn make_infer_sample<T: AsRef<str>>(
        &self,
        srcs:      &[T],
        converter: &dyn ScriptConverter,
    ) -> Vec<Vec<u32>> {
        tracing::info!("Building {} inference samples", srcs.len());
        srcs.iter()
            .map(|src| {
                let text = converter.convert(src.as_ref());
                let ids  = self.encode(&text);
                tracing::debug!("{:?} → {:?} → {:?}", src.as_ref(), text, ids);
                ids
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::converter::IdentityConverter;
    use crate::data::loader::ToutiaoNews;
    use crate::data::tokenizer::CharTokenizer;
    use crate::data::vocab::{PAD_ID, UNK_ID};
    use crate::domain::sample::ClassLabel;
    use std::fs;
    use std::path::Path;

    fn write_corpus(dir: &Path) {
        fs::write(dir.join("toutiao_train.txt"), "春风春风去_!_1\n一夜春_!_2\n对下联_!_3\n").unwrap();
        fs::write(dir.join("toutiao_val.txt"), "春去秋来_!_1\n").unwrap();
        fs::write(dir.join("toutiao_test.txt"), "风_!_0\n夜_!_1\n春_!_2\n").unwrap();
    }

    fn corpus(dir: &Path, config: CorpusConfig) -> Corpus<ToutiaoNews, CharTokenizer> {
        let source = ToutiaoNews::new(dir, config.malformed);
        Corpus::new(source, CharTokenizer::new(), config).unwrap()
    }

    #[test]
    fn test_with_vocab_validates_config() {
        let dir    = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let vocab  = corpus(dir.path(), CorpusConfig::default()).vocab().clone();
        let config = CorpusConfig { batch_size: 0, ..Default::default() };
        let source = ToutiaoNews::new(dir.path(), config.malformed);

        let err = Corpus::with_vocab(source, CharTokenizer::new(), vocab, config).err().unwrap();
        assert!(matches!(err, CorpusError::InvalidConfig(_)));
    }

    #[test]
    fn test_vocab_comes_from_train_only() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let c = corpus(dir.path(), CorpusConfig::default());

        assert_eq!(c.vocab().id("春"), 2);
        assert_eq!(c.vocab().id("风"), 3);
        // '秋' only appears in the validation split
        assert_eq!(c.vocab().id("秋"), UNK_ID);
    }

    #[test]
    fn test_process_maps_tokens_and_labels() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let c   = corpus(dir.path(), CorpusConfig::default());
        let val = c.process(Split::Val).unwrap();

        let sample = &val.samples()[0];
        assert_eq!(sample.target, ClassLabel(1));
        assert_eq!(sample.token_ids[0], c.vocab().id("春"));
        assert_eq!(sample.token_ids[2], UNK_ID);
    }

    #[test]
    fn test_batches_are_padded_with_pad_id() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let config = CorpusConfig { batch_size: 2, shuffle: false, ..Default::default() };
        let c      = corpus(dir.path(), config);

        let (train, _) = c.load_train_val().unwrap();
        let first      = c.make_batches(&train, false).next().unwrap();
        assert_eq!(first.inputs.shape(), (2, 5));
        assert_eq!(first.inputs.rows()[1][3..], [PAD_ID, PAD_ID]);
        assert_eq!(first.targets, vec![1, 2]);
    }

    #[test]
    fn test_seeded_passes_differ_but_repeat_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let lines: String = (0..20).map(|i| format!("{}_!_{}\n", "字".repeat(i + 1), i)).collect();
        fs::write(dir.path().join("toutiao_train.txt"), lines).unwrap();

        let config = CorpusConfig { batch_size: 20, seed: Some(3), ..Default::default() };
        let order  = |c: &Corpus<ToutiaoNews, CharTokenizer>, ds: &CorpusDataset<ClassLabel>| {
            c.make_batches(ds, true).next().unwrap().targets
        };

        let a  = corpus(dir.path(), config.clone());
        let b  = corpus(dir.path(), config);
        let ds = a.process(Split::Train).unwrap();

        let a1 = order(&a, &ds);
        let a2 = order(&a, &ds);
        assert_eq!(a1, order(&b, &ds));
        assert_eq!(a2, order(&b, &ds));
        assert_ne!(a1, a2);
    }

    #[test]
    fn test_invalid_label_policy() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("toutiao_train.txt"), "春风_!_1\n夜_!_体育\n").unwrap();

        let strict = corpus(dir.path(), CorpusConfig::default());
        assert!(matches!(
            strict.process(Split::Train),
            Err(CorpusError::InvalidLabel { sample: 2, .. })
        ));

        let lenient = corpus(
            dir.path(),
            CorpusConfig { malformed: MalformedLinePolicy::Skip, ..Default::default() },
        );
        assert_eq!(lenient.process(Split::Train).unwrap().sample_count(), 1);
    }

    #[test]
    fn test_missing_train_split_fails_construction() {
        let dir    = tempfile::tempdir().unwrap();
        let source = ToutiaoNews::new(dir.path(), MalformedLinePolicy::Fail);
        let err    = Corpus::new(source, CharTokenizer::new(), CorpusConfig::default()).err();
        assert!(matches!(err, Some(CorpusError::MissingFile { .. })));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let source = ToutiaoNews::new(dir.path(), MalformedLinePolicy::Fail);
        let config = CorpusConfig { batch_size: 0, ..Default::default() };
        assert!(Corpus::new(source, CharTokenizer::new(), config).is_err());
    }

    #[test]
    fn test_infer_samples_are_unpadded() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let c   = corpus(dir.path(), CorpusConfig::default());
        let ids = c.make_infer_sample(&["春风", "夜来风"], &IdentityConverter);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], vec![c.vocab().id("春"), c.vocab().id("风")]);
        assert_eq!(ids[1].len(), 3);
    }
}
