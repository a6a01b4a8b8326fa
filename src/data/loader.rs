// ============================================================
// Layer 4 — News Title Loader
// ============================================================
// Reads the Toutiao news-title classification corpus.
//
// Directory layout:
//   <data_dir>/toutiao_train.txt
//   <data_dir>/toutiao_val.txt
//   <data_dir>/toutiao_test.txt
//
// Line format (UTF-8, one sample per line):
//   上联：一夜春风去，怎么对下联？_!_1
//   ^ text                        ^ class id
//
// Only the first two `_!_` fields are used; anything after the
// label is ignored. Lines without a delimiter are handled by the
// configured MalformedLinePolicy.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::domain::error::CorpusError;
use crate::domain::sample::{ClassLabel, RawSample, Split};
use crate::domain::traits::CorpusSource;

pub const FIELD_DELIMITER: &str = "_!_";

// ─── MalformedLinePolicy ──────────────────────────────────────────────────────
/// What to do with a line that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedLinePolicy {
    /// Stop at the first bad line
    #[default]
    Fail,
    /// Log a warning and drop the line
    Skip,
}

impl MalformedLinePolicy {
    /// Apply the policy to a parse error: `Ok(())` means "skip it".
    pub fn handle(self, err: CorpusError) -> Result<(), CorpusError> {
        match self {
            MalformedLinePolicy::Fail => Err(err),
            MalformedLinePolicy::Skip => {
                tracing::warn!("Skipping sample: {}", err);
                Ok(())
            }
        }
    }
}

/// Split one corpus line into (text, label). An empty text field is
/// kept; only a missing delimiter makes the line malformed.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let mut fields = line.split(FIELD_DELIMITER);
    let text  = fields.next()?;
    let label = fields.next()?;
    Some((text, label))
}

/// Read a whole UTF-8 file, mapping "not found" to MissingFile.
pub(crate) fn read_corpus_file(path: &Path) -> Result<String, CorpusError> {
    fs::read_to_string(path).map_err(|e| CorpusError::from_io(path, e))
}

// ─── ToutiaoNews ──────────────────────────────────────────────────────────────
/// The 15-category Toutiao news-title dataset.
pub struct ToutiaoNews {
    data_dir:  PathBuf,
    malformed: MalformedLinePolicy,
}

impl ToutiaoNews {
    pub fn new(data_dir: impl Into<PathBuf>, malformed: MalformedLinePolicy) -> Self {
        Self {
            data_dir: data_dir.into(),
            malformed,
        }
    }

    pub fn split_path(&self, split: Split) -> PathBuf {
        let file = match split {
            Split::Train => "toutiao_train.txt",
            Split::Val   => "toutiao_val.txt",
            Split::Test  => "toutiao_test.txt",
        };
        self.data_dir.join(file)
    }

    /// Load every line of one file as a raw sample.
    pub fn load_file(&self, path: &Path) -> Result<Vec<RawSample>, CorpusError> {
        tracing::info!("Loading raw text from '{}'", path.display());
        let content = read_corpus_file(path)?;

        let mut samples = Vec::new();
        for (i, line) in content.lines().enumerate() {
            match parse_line(line) {
                Some((text, label)) => samples.push(RawSample::new(text, label)),
                None => self.malformed.handle(CorpusError::MalformedLine {
                    path:    path.to_path_buf(),
                    line:    i + 1,
                    content: line.to_string(),
                })?,
            }
        }

        tracing::debug!("Read {} samples from '{}'", samples.len(), path.display());
        Ok(samples)
    }
}

impl CorpusSource for ToutiaoNews {
    type Target = ClassLabel;

    fn name(&self) -> &str {
        "toutiao"
    }

    fn load_raw(&self, split: Split) -> Result<Vec<RawSample>, CorpusError> {
        self.load_file(&self.split_path(split))
    }

    fn encode_target(
        &self,
        split:   Split,
        index:   usize,
        label:   &str,
        _encode: &dyn Fn(&str) -> Vec<u32>,
    ) -> Result<ClassLabel, CorpusError> {
        label
            .trim()
            .parse::<u32>()
            .map(ClassLabel)
            .map_err(|_| CorpusError::InvalidLabel {
                path:   self.split_path(split),
                sample: index + 1,
                label:  label.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_split(dir: &Path, split: Split, body: &str) -> ToutiaoNews {
        let source = ToutiaoNews::new(dir, MalformedLinePolicy::Fail);
        fs::write(source.split_path(split), body).unwrap();
        source
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("春风去_!_1"), Some(("春风去", "1")));
        assert_eq!(parse_line("a_!_2_!_extra"), Some(("a", "2")));
        assert_eq!(parse_line("no delimiter"), None);
        assert_eq!(parse_line("_!_3"), Some(("", "3")));
    }

    #[test]
    fn test_empty_text_is_a_sample() {
        let dir    = tempfile::tempdir().unwrap();
        let source = write_split(dir.path(), Split::Train, "春风_!_1\n_!_2\n");

        let samples = source.load_raw(Split::Train).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1], RawSample::new("", "2"));
    }

    #[test]
    fn test_load_raw_reads_text_and_label() {
        let dir    = tempfile::tempdir().unwrap();
        let source = write_split(dir.path(), Split::Train, "上联：一夜春风去_!_1\n欧阳询_!_2\n");

        let samples = source.load_raw(Split::Train).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], RawSample::new("上联：一夜春风去", "1"));
        assert_eq!(samples[1].label, "2");
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir    = tempfile::tempdir().unwrap();
        let source = ToutiaoNews::new(dir.path(), MalformedLinePolicy::Fail);
        let err    = source.load_raw(Split::Test).unwrap_err();
        assert!(matches!(err, CorpusError::MissingFile { .. }));
    }

    #[test]
    fn test_malformed_line_fails_by_default() {
        let dir    = tempfile::tempdir().unwrap();
        let source = write_split(dir.path(), Split::Val, "ok_!_1\nbroken line\n");
        match source.load_raw(Split::Val).unwrap_err() {
            CorpusError::MalformedLine { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "broken line");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_line_can_be_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_split(dir.path(), Split::Val, "ok_!_1\nbroken line\nfine_!_0\n");
        let source = ToutiaoNews::new(dir.path(), MalformedLinePolicy::Skip);
        assert_eq!(source.load_raw(Split::Val).unwrap().len(), 2);
    }

    #[test]
    fn test_encode_target_parses_class_id() {
        let source = ToutiaoNews::new("unused", MalformedLinePolicy::Fail);
        let encode = |_: &str| Vec::new();
        assert_eq!(
            source.encode_target(Split::Train, 0, "14", &encode).unwrap(),
            ClassLabel(14)
        );
        assert!(matches!(
            source.encode_target(Split::Train, 4, "体育", &encode).unwrap_err(),
            CorpusError::InvalidLabel { sample: 5, .. }
        ));
    }
}
