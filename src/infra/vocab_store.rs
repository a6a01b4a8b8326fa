// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Saves and loads the vocabulary as JSON so inference maps text
// to exactly the ids the training run used.
//
// File format (vocab.json):
//   {"tokens": ["[UNK]", "[PAD]", "，", "。", "不", ...]}
//   index in the list = token id

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::data::vocab::Vocab;

pub const VOCAB_FILE: &str = "vocab.json";

pub struct VocabStore {
    path: PathBuf,
}

impl VocabStore {
    /// `path` is either a directory (vocab.json is used inside it)
    /// or a full file path ending in .json.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = if path.extension().is_some_and(|e| e == "json") {
            path
        } else {
            path.join(VOCAB_FILE)
        };
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn save(&self, vocab: &Vocab) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create '{}'", dir.display()))?;
        }

        fs::write(&self.path, serde_json::to_string_pretty(vocab)?)
            .with_context(|| format!("Cannot write vocabulary to '{}'", self.path.display()))?;

        tracing::info!("Saved {} tokens to '{}'", vocab.len(), self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Vocab> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read vocabulary '{}'", self.path.display()))?;
        let vocab: Vocab = serde_json::from_str(&json)
            .with_context(|| format!("Invalid vocabulary file '{}'", self.path.display()))?;

        tracing::info!("Loaded {} tokens from '{}'", vocab.len(), self.path.display());
        Ok(vocab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tokenizer::CharTokenizer;

    fn sample_vocab() -> Vocab {
        Vocab::build(["白日依山盡", "黃河入海流"], 50, &CharTokenizer::new()).unwrap()
    }

    #[test]
    fn test_directory_path_gets_default_file_name() {
        let store = VocabStore::new("checkpoints");
        assert!(store.path().ends_with(VOCAB_FILE));
        let store = VocabStore::new("out/poetry_vocab.json");
        assert!(store.path().ends_with("poetry_vocab.json"));
    }

    #[test]
    fn test_save_then_load() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path().join("nested"));
        let vocab = sample_vocab();

        store.save(&vocab).unwrap();
        assert_eq!(store.load().unwrap(), vocab);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        fs::write(store.path(), r#"{"tokens": ["a", "b"]}"#).unwrap();
        assert!(store.load().is_err());
    }
}
