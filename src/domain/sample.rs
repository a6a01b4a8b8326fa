// ============================================================
// Layer 3 — Sample Domain Types
// ============================================================
// The three shapes a corpus record passes through before it
// reaches a batch:
//
//   line / JSON object  →  RawSample         (text, label as strings)
//                       →  TokenizedSample   (token ids, encoded target)
//                       →  Batch             (see data::batches)
//
// A target is either a class id (news classification) or a second
// id sequence (next-character prediction on poetry).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::CorpusError;

// ─── Split ────────────────────────────────────────────────────────────────────
/// Which part of the corpus to read. The vocabulary is only ever
/// built from `Train`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => write!(f, "train"),
            Split::Val   => write!(f, "val"),
            Split::Test  => write!(f, "test"),
        }
    }
}

impl FromStr for Split {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train"               => Ok(Split::Train),
            "val" | "validation"  => Ok(Split::Val),
            "test"                => Ok(Split::Test),
            other => Err(CorpusError::InvalidConfig(format!(
                "unknown split '{other}', expected train, val or test"
            ))),
        }
    }
}

// ─── RawSample ────────────────────────────────────────────────────────────────
/// One record as read from disk. Both fields are opaque until the
/// corpus source encodes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSample {
    pub text:  String,
    pub label: String,
}

impl RawSample {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text:  text.into(),
            label: label.into(),
        }
    }
}

// ─── ClassLabel ───────────────────────────────────────────────────────────────
/// Integer class id for classification corpora.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassLabel(pub u32);

impl ClassLabel {
    pub fn id(self) -> u32 {
        self.0
    }
}

// ─── TokenizedSample ──────────────────────────────────────────────────────────
/// A sample after tokenisation and id mapping.
///
/// Every id in `token_ids` is either the unknown id or an id that
/// existed in the vocabulary when it was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedSample<T> {
    pub token_ids: Vec<u32>,
    pub target:    T,
}

impl<T> TokenizedSample<T> {
    pub fn new(token_ids: Vec<u32>, target: T) -> Self {
        Self { token_ids, target }
    }

    pub fn len(&self) -> usize {
        self.token_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_parses_and_displays() {
        for split in Split::ALL {
            let parsed: Split = split.to_string().parse().unwrap();
            assert_eq!(parsed, split);
        }
        assert_eq!("validation".parse::<Split>().unwrap(), Split::Val);
    }

    #[test]
    fn test_unknown_split_is_rejected() {
        assert!("dev".parse::<Split>().is_err());
    }

    #[test]
    fn test_tokenized_sample_length() {
        let s = TokenizedSample::new(vec![2, 3, 4], ClassLabel(1));
        assert_eq!(s.len(), 3);
        assert!(!s.is_empty());
        assert_eq!(s.target.id(), 1);
    }
}
