// ============================================================
// Layer 4 — Character Tokenizer
// ============================================================
// Splits text on every character boundary:
//
//   "上联：一夜春风去" → ["上", "联", "：", "一", "夜", "春", "风", "去"]
//
// Punctuation is kept as its own token. Whitespace characters are
// separators only and never become tokens, so "a b" yields
// ["a", "b"].

use crate::domain::traits::Tokenizer;

#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl CharTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for CharTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.chars()
            .filter(|c| !c.is_whitespace())
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chinese_couplet_is_split_per_character() {
        let tokens = CharTokenizer::new().tokenize("上联：一夜春风去");
        assert_eq!(
            tokens,
            vec!["上", "联", "：", "一", "夜", "春", "风", "去"]
        );
    }

    #[test]
    fn test_punctuation_is_kept() {
        let tokens = CharTokenizer::new().tokenize("对下联？");
        assert_eq!(tokens.last().map(String::as_str), Some("？"));
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_whitespace_is_dropped() {
        let tokens = CharTokenizer::new().tokenize(" a b\tc\n");
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tokenize_is_idempotent() {
        let t    = CharTokenizer::new();
        let text = "隋唐五代｜欧阳询《温彦博碑》";
        assert_eq!(t.tokenize(text), t.tokenize(text));
    }

    #[test]
    fn test_empty_text() {
        assert!(CharTokenizer::new().tokenize("").is_empty());
    }
}
