// ============================================================
// Layer 4 — Tang Poetry Loader
// ============================================================
// Reads the complete Tang poetry collection for next-character
// generation.
//
// Each split is named by a shard range rather than a real file:
//
//   poet.tang.0-40.json   → poet.tang.0.json, poet.tang.1000.json, …,
//                           poet.tang.40000.json
//
// Every shard is a JSON array of poems:
//   [{"author": "…", "paragraphs": ["…", "…"], "title": "…"}, …]
//
// The paragraphs of a poem are joined into one text. Only regular
// five- and seven-character verse of moderate length is kept (see
// keep_poem). The target is the text shifted left by one character
// with the final character repeated:
//
//   text   = 日滿東窗照被堆，
//   target = 滿東窗照被堆，，

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::loader::read_corpus_file;
use crate::domain::error::CorpusError;
use crate::domain::sample::{RawSample, Split};
use crate::domain::traits::CorpusSource;

/// Shard index `i` lives in file `prefix.{i * DEFAULT_SHARD_STRIDE}.json`
pub const DEFAULT_SHARD_STRIDE: usize = 1000;

const MIN_POEM_CHARS: usize = 12;
const MAX_POEM_CHARS: usize = 100;
const DISALLOWED_CHARS: [char; 3] = ['《', '（', '□'];

// ─── PoemRecord ───────────────────────────────────────────────────────────────
/// One poem object inside a shard file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoemRecord {
    #[serde(default)]
    pub author:     String,
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub title:      String,
}

impl PoemRecord {
    pub fn content(&self) -> String {
        self.paragraphs.concat()
    }
}

/// True for poems worth training on: a character count that is a
/// multiple of 12 or 14, within [12, 100], and none of 《 （ □.
pub fn keep_poem(content: &str) -> bool {
    let n = content.chars().count();
    if n % 12 != 0 && n % 14 != 0 {
        return false;
    }
    if !(MIN_POEM_CHARS..=MAX_POEM_CHARS).contains(&n) {
        return false;
    }
    !content.contains(DISALLOWED_CHARS)
}

/// `content[1..] + content[last]`, counted in characters.
pub fn next_char_label(content: &str) -> String {
    let mut chars = content.chars();
    let Some(_) = chars.next() else {
        return String::new();
    };
    let mut label: String = chars.collect();
    if let Some(last) = content.chars().last() {
        label.push(last);
    }
    label
}

// ─── ShardRange ───────────────────────────────────────────────────────────────
/// `prefix.START-END.json` parsed into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardRange {
    pub prefix: String,
    pub start:  usize,
    pub end:    usize,
}

impl ShardRange {
    pub fn parse(file_name: &str) -> Result<Self, CorpusError> {
        let invalid = || CorpusError::InvalidShardName {
            name: file_name.to_string(),
        };

        let stem            = file_name.strip_suffix(".json").ok_or_else(invalid)?;
        let (prefix, range) = stem.rsplit_once('.').ok_or_else(invalid)?;
        let (start, end)    = range.split_once('-').ok_or_else(invalid)?;

        let start: usize = start.parse().map_err(|_| invalid())?;
        let end:   usize = end.parse().map_err(|_| invalid())?;
        if prefix.is_empty() || start > end {
            return Err(invalid());
        }

        Ok(Self {
            prefix: prefix.to_string(),
            start,
            end,
        })
    }

    /// Shard files in range order
    pub fn shard_paths(&self, dir: &Path, stride: usize) -> Vec<PathBuf> {
        (self.start..=self.end)
            .map(|i| dir.join(format!("{}.{}.json", self.prefix, i * stride)))
            .collect()
    }
}

// ─── TangShi ──────────────────────────────────────────────────────────────────
pub struct TangShi {
    data_dir:     PathBuf,
    shard_stride: usize,
}

impl TangShi {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir:     data_dir.into(),
            shard_stride: DEFAULT_SHARD_STRIDE,
        }
    }

    pub fn with_shard_stride(mut self, stride: usize) -> Self {
        self.shard_stride = stride;
        self
    }

    /// Train uses shards 0..=40, val 41..=52, test 53..=57.
    pub fn split_file_name(split: Split) -> &'static str {
        match split {
            Split::Train => "poet.tang.0-40.json",
            Split::Val   => "poet.tang.41-52.json",
            Split::Test  => "poet.tang.53-57.json",
        }
    }

    /// Read one shard and keep the poems that pass keep_poem.
    pub fn load_shard(&self, path: &Path) -> Result<Vec<RawSample>, CorpusError> {
        tracing::info!("Loading raw text from '{}'", path.display());
        let content = read_corpus_file(path)?;
        let poems: Vec<PoemRecord> =
            serde_json::from_str(&content).map_err(|source| CorpusError::MalformedJson {
                path: path.to_path_buf(),
                source,
            })?;

        let total   = poems.len();
        let samples: Vec<RawSample> = poems
            .iter()
            .map(PoemRecord::content)
            .filter(|c| keep_poem(c))
            .map(|c| {
                let label = next_char_label(&c);
                RawSample::new(c, label)
            })
            .collect();

        tracing::debug!(
            "Kept {}/{} poems from '{}'",
            samples.len(),
            total,
            path.display()
        );
        Ok(samples)
    }

    /// Read every shard behind a `prefix.START-END.json` name.
    pub fn load_range(&self, file_name: &str) -> Result<Vec<RawSample>, CorpusError> {
        let range = ShardRange::parse(file_name)?;

        let mut all = Vec::new();
        for path in range.shard_paths(&self.data_dir, self.shard_stride) {
            all.extend(self.load_shard(&path)?);
        }

        tracing::info!("{} holds {} samples", file_name, all.len());
        Ok(all)
    }
}

impl CorpusSource for TangShi {
    type Target = Vec<u32>;

    fn name(&self) -> &str {
        "tangshi"
    }

    fn load_raw(&self, split: Split) -> Result<Vec<RawSample>, CorpusError> {
        self.load_range(Self::split_file_name(split))
    }

    fn encode_target(
        &self,
        _split: Split,
        _index: usize,
        label:  &str,
        encode: &dyn Fn(&str) -> Vec<u32>,
    ) -> Result<Vec<u32>, CorpusError> {
        Ok(encode(label))
    }
}
