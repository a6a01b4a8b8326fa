// ============================================================
// Layer 2 — InferUseCase
// ============================================================
// Turns free-form prompts into id sequences for a generation or
// classification model:
//
//   prompt → ScriptConverter → CharTokenizer → Vocab ids
//
// Poetry prompts are usually typed in simplified characters while
// the Tang corpus is traditional, so an s2t table is normally
// supplied. Without one the text is used as-is.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::prepare_use_case::{CorpusKind, PipelineConfig, PrepareUseCase};
use crate::data::converter::{CharTableConverter, Conversion, IdentityConverter};
use crate::data::loader::ToutiaoNews;
use crate::data::poetry::TangShi;
use crate::domain::traits::ScriptConverter;

/// One prompt and the ids it maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferSample {
    pub text:      String,
    pub token_ids: Vec<u32>,
}

pub struct InferUseCase {
    config:    PipelineConfig,
    converter: Box<dyn ScriptConverter>,
}

impl InferUseCase {
    /// `conversion` needs a character table; both or neither.
    pub fn new(
        config:     PipelineConfig,
        conversion: Option<(Conversion, PathBuf)>,
    ) -> Result<Self> {
        let converter: Box<dyn ScriptConverter> = match conversion {
            Some((direction, table)) => Box::new(
                CharTableConverter::from_file(&table, direction)
                    .with_context(|| format!("Cannot load {direction} table"))?,
            ),
            None => Box::new(IdentityConverter),
        };
        Ok(Self { config, converter })
    }

    pub fn run<T: AsRef<str>>(&self, srcs: &[T]) -> Result<Vec<InferSample>> {
        let prepare = PrepareUseCase::new(self.config.clone());
        let ids = match self.config.corpus {
            CorpusKind::Tangshi => {
                let source = TangShi::new(self.config.data_dir())
                    .with_shard_stride(self.config.shard_stride);
                prepare.open(source)?.make_infer_sample(srcs, self.converter.as_ref())
            }
            CorpusKind::Toutiao => {
                let source = ToutiaoNews::new(self.config.data_dir(), self.config.corpus_config.malformed);
                prepare.open(source)?.make_infer_sample(srcs, self.converter.as_ref())
            }
        };

        Ok(srcs
            .iter()
            .zip(ids)
            .map(|(text, token_ids)| InferSample {
                text: text.as_ref().to_string(),
                token_ids,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::vocab::{Vocab, UNK_ID};
    use crate::infra::vocab_store::VocabStore;
    use std::fs;

    #[test]
    fn test_prompts_are_converted_before_lookup() {
        let dir = tempfile::tempdir().unwrap();

        // vocabulary of traditional characters only
        let vocab = Vocab::from_tokens(
            ["[UNK]", "[PAD]", "李", "白", "將", "辭"].map(String::from).to_vec(),
        )
        .unwrap();
        let vocab_path = dir.path().join("vocab.json");
        VocabStore::new(&vocab_path).save(&vocab).unwrap();

        let table = dir.path().join("STCharacters.txt");
        fs::write(&table, "将\t將\n辞\t辭\n").unwrap();

        let config = PipelineConfig {
            corpus:     CorpusKind::Tangshi,
            data_dir:   Some(dir.path().display().to_string()),
            vocab_path: Some(vocab_path.display().to_string()),
            ..Default::default()
        };

        let plain = InferUseCase::new(config.clone(), None).unwrap();
        assert_eq!(plain.run(&["李白将"]).unwrap()[0].token_ids, vec![2, 3, UNK_ID]);

        let s2t = InferUseCase::new(config, Some((Conversion::S2t, table))).unwrap();
        let out = s2t.run(&["李白将", "辞"]).unwrap();
        assert_eq!(out[0].token_ids, vec![2, 3, 4]);
        assert_eq!(out[1], InferSample { text: "辞".into(), token_ids: vec![5] });
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let result = InferUseCase::new(
            PipelineConfig::default(),
            Some((Conversion::S2t, PathBuf::from("no/such/table.txt"))),
        );
        assert!(result.is_err());
    }
}
