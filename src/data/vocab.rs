// ============================================================
// Layer 4 — Vocabulary
// ============================================================
// Fixed token ↔ id mapping built once from the training split.
//
// Layout:
//   0      [UNK]  (any token not in the vocabulary)
//   1      [PAD]  (right padding in batches)
//   2..K   the K-2 most frequent tokens, most frequent first
//
// Ties in frequency keep the order in which the tokens were first
// seen during the counting pass. Lookup never fails: a missing
// token resolves to the [UNK] id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::CorpusError;
use crate::domain::traits::Tokenizer;

pub const UNK: &str = "[UNK]";
pub const PAD: &str = "[PAD]";
pub const UNK_ID: u32 = 0;
pub const PAD_ID: u32 = 1;

/// Immutable vocabulary. Serialises as its ordered token list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "VocabFile", try_from = "VocabFile")]
pub struct Vocab {
    stoi: HashMap<String, u32>,
    itos: Vec<String>,
}

/// On-disk form: `{"tokens": ["[UNK]", "[PAD]", ...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabFile {
    pub tokens: Vec<String>,
}

impl Vocab {
    /// Count tokens over `texts` in one pass and keep the `top_k - 2`
    /// most frequent alongside [UNK] and [PAD].
    ///
    /// The result has at most `top_k` entries, fewer when the corpus
    /// has fewer distinct tokens.
    pub fn build<I, S>(texts: I, top_k: usize, tokenizer: &dyn Tokenizer) -> Result<Self, CorpusError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if top_k < 2 {
            return Err(CorpusError::InvalidConfig(format!(
                "top_k must be at least 2 to hold {UNK} and {PAD}, got {top_k}"
            )));
        }
        tracing::info!("Building vocabulary from the training split (top_k={})", top_k);

        // index into `counts` per token; `counts` keeps first-seen order
        let mut index:  HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<(String, usize)>   = Vec::new();

        for text in texts {
            for token in tokenizer.tokenize(text.as_ref()) {
                match index.get(&token) {
                    Some(&i) => counts[i].1 += 1,
                    None => {
                        index.insert(token.clone(), counts.len());
                        counts.push((token, 1));
                    }
                }
            }
        }

        // sort_by is stable, so equal counts stay in first-seen order
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let mut itos = vec![UNK.to_string(), PAD.to_string()];
        itos.extend(
            counts
                .into_iter()
                .filter(|(token, _)| token != UNK && token != PAD)
                .take(top_k - 2)
                .map(|(token, _)| token),
        );

        let vocab = Self::from_tokens(itos)?;
        tracing::debug!(
            "Vocabulary built, first entries: {:?}",
            vocab.itos.iter().take(100).collect::<Vec<_>>()
        );
        Ok(vocab)
    }

    /// Rebuild a vocabulary from its ordered token list.
    /// The list must start with [UNK], [PAD] and hold no duplicates.
    pub fn from_tokens(itos: Vec<String>) -> Result<Self, CorpusError> {
        if itos.first().map(String::as_str) != Some(UNK)
            || itos.get(1).map(String::as_str) != Some(PAD)
        {
            return Err(CorpusError::InvalidConfig(format!(
                "vocabulary must start with {UNK} and {PAD}"
            )));
        }

        let mut stoi = HashMap::with_capacity(itos.len());
        for (id, token) in itos.iter().enumerate() {
            if stoi.insert(token.clone(), id as u32).is_some() {
                return Err(CorpusError::InvalidConfig(format!(
                    "duplicate vocabulary token {token:?}"
                )));
            }
        }

        Ok(Self { stoi, itos })
    }

    /// Id of `token`, or the [UNK] id when absent.
    pub fn id(&self, token: &str) -> u32 {
        self.stoi.get(token).copied().unwrap_or(UNK_ID)
    }

    pub fn token(&self, id: u32) -> Option<&str> {
        self.itos.get(id as usize).map(String::as_str)
    }

    /// Ordered token list, index = id
    pub fn tokens(&self) -> &[String] {
        &self.itos
    }

    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<u32> {
        tokens.iter().map(|t| self.id(t.as_ref())).collect()
    }

    /// Ids outside the vocabulary are dropped.
    pub fn decode(&self, ids: &[u32]) -> Vec<&str> {
        ids.iter().filter_map(|&id| self.token(id)).collect()
    }

    pub fn unk_id(&self) -> u32 {
        UNK_ID
    }

    pub fn pad_id(&self) -> u32 {
        PAD_ID
    }

    pub fn len(&self) -> usize {
        self.itos.len()
    }

    /// Always false: [UNK] and [PAD] are always present.
    pub fn is_empty(&self) -> bool {
        self.itos.is_empty()
    }
}

impl From<Vocab> for VocabFile {
    fn from(v: Vocab) -> Self {
        VocabFile { tokens: v.itos }
    }
}

impl TryFrom<VocabFile> for Vocab {
    type Error = CorpusError;

    fn try_from(file: VocabFile) -> Result<Self, Self::Error> {
        Vocab::from_tokens(file.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tokenizer::CharTokenizer;

    fn build(texts: &[&str], top_k: usize) -> Vocab {
        Vocab::build(texts.iter().copied(), top_k, &CharTokenizer::new()).unwrap()
    }

    #[test]
    fn test_small_corpus_gives_fewer_than_k_entries() {
        let vocab = build(&["aab", "ab"], 5);
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.id(UNK), 0);
        assert_eq!(vocab.id(PAD), 1);
        assert_eq!(vocab.id("a"), 2);
        assert_eq!(vocab.id("b"), 3);
    }

    #[test]
    fn test_top_k_caps_the_size() {
        let vocab = build(&["aaaabbbccd"], 4);
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.tokens(), &[UNK, PAD, "a", "b"]);
        // 'c' and 'd' fell outside the top 2
        assert_eq!(vocab.id("c"), UNK_ID);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let vocab = build(&["xyzzyx"], 10);
        // every token appears twice, order = first encounter
        assert_eq!(vocab.tokens(), &[UNK, PAD, "x", "y", "z"]);
    }

    #[test]
    fn test_reserved_ids_are_fixed() {
        let vocab = build(&["上联：一夜春风去", "怎么对下联？"], 2000);
        assert_eq!(vocab.unk_id(), 0);
        assert_eq!(vocab.pad_id(), 1);
        assert_eq!(vocab.token(0), Some(UNK));
        assert_eq!(vocab.token(1), Some(PAD));
        assert!(vocab.len() <= 2000);
        // '联' appears twice so it ranks first
        assert_eq!(vocab.id("联"), 2);
    }

    #[test]
    fn test_unseen_token_resolves_to_unk() {
        let vocab = build(&["ab"], 10);
        assert_eq!(vocab.id("z"), UNK_ID);
        assert_eq!(vocab.encode(&["a", "q", "b"]), vec![2, 0, 3]);
    }

    #[test]
    fn test_decode_skips_unknown_ids() {
        let vocab = build(&["ab"], 10);
        assert_eq!(vocab.decode(&[2, 3, 99]), vec!["a", "b"]);
    }

    #[test]
    fn test_top_k_below_two_is_rejected() {
        let err = Vocab::build(["ab"], 1, &CharTokenizer::new()).unwrap_err();
        assert!(matches!(err, CorpusError::InvalidConfig(_)));
    }

    #[test]
    fn test_exactly_two_keeps_only_reserved() {
        let vocab = build(&["abc"], 2);
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.id("a"), UNK_ID);
    }

    #[test]
    fn test_json_roundtrip_preserves_ids() {
        let vocab = build(&["上联上联夜"], 10);
        let json  = serde_json::to_string(&vocab).unwrap();
        assert!(json.starts_with("{\"tokens\":[\"[UNK]\",\"[PAD]\""));
        let back: Vocab = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vocab);
    }

    #[test]
    fn test_from_tokens_rejects_missing_reserved_entries() {
        assert!(Vocab::from_tokens(vec!["a".into(), "b".into()]).is_err());
        assert!(Vocab::from_tokens(vec![UNK.into(), PAD.into(), "a".into(), "a".into()]).is_err());
    }
}
