// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams of the pipeline. The dataset and batching code only
// sees these traits, so each piece can be swapped on its own:
//
//   Tokenizer        → CharTokenizer today, a word-level or
//                      subword segmenter later
//   CorpusSource     → ToutiaoNews (lines), TangShi (JSON shards)
//   ScriptConverter  → IdentityConverter, CharTableConverter

use std::fmt::Debug;

use crate::domain::error::CorpusError;
use crate::domain::sample::{RawSample, Split};

// ─── Tokenizer ────────────────────────────────────────────────────────────────
/// Text segmentation: text in, ordered tokens out.
///
/// Implementations must be pure. The same input always yields the
/// same sequence.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

impl<T: Tokenizer + ?Sized> Tokenizer for Box<T> {
    fn tokenize(&self, text: &str) -> Vec<String> {
        (**self).tokenize(text)
    }
}

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// A corpus on disk with train/val/test splits.
pub trait CorpusSource {
    /// What each sample is trained to predict.
    type Target: Clone + Debug + Send + Sync;

    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Read every raw sample of one split into memory.
    fn load_raw(&self, split: Split) -> Result<Vec<RawSample>, CorpusError>;

    /// Turn the raw label of sample `index` into a target.
    /// `encode` maps text to vocabulary ids with the pipeline's
    /// tokenizer and vocabulary.
    fn encode_target(
        &self,
        split:  Split,
        index:  usize,
        label:  &str,
        encode: &dyn Fn(&str) -> Vec<u32>,
    ) -> Result<Self::Target, CorpusError>;
}

// ─── ScriptConverter ──────────────────────────────────────────────────────────
/// Normalisation applied to inference inputs before tokenisation,
/// e.g. simplified → traditional Chinese.
pub trait ScriptConverter {
    fn convert(&self, text: &str) -> String;
}
