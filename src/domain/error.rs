// ============================================================
// Layer 3 — Corpus Errors
// ============================================================
// Every failure the data pipeline can surface to its caller.
//
// Unknown tokens are deliberately absent from this list: a token
// missing from the vocabulary resolves to the [UNK] id and is
// never reported as an error.
//
// Nothing in the pipeline retries. Callers (the CLI and the
// use cases) wrap these with anyhow::Context and abort the run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    /// Corpus file does not exist on disk
    #[error("corpus file not found: '{}'", path.display())]
    MissingFile { path: PathBuf },

    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line without the `_!_` delimiter, or with an empty text field
    #[error("malformed line {line} in '{}': {content:?}", path.display())]
    MalformedLine {
        path:    PathBuf,
        line:    usize,
        content: String,
    },

    /// The label of the `sample`-th sample (1-based) is not an
    /// integer class id
    #[error("invalid class label {label:?} for sample {sample} of '{}'", path.display())]
    InvalidLabel {
        path:   PathBuf,
        sample: usize,
        label:  String,
    },

    #[error("malformed JSON in '{}': {source}", path.display())]
    MalformedJson {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Split file names must look like `prefix.START-END.json`
    #[error("invalid shard range file name '{name}', expected 'prefix.START-END.json'")]
    InvalidShardName { name: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid script conversion: {0}")]
    InvalidConversion(String),
}

impl CorpusError {
    /// Map an I/O error on `path` to MissingFile when the file is
    /// absent and to Io otherwise.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            CorpusError::MissingFile { path }
        } else {
            CorpusError::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_missing_file() {
        let err = CorpusError::from_io(
            "nowhere.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, CorpusError::MissingFile { .. }));
        assert!(err.to_string().contains("nowhere.txt"));
    }

    #[test]
    fn test_other_io_errors_keep_their_source() {
        let err = CorpusError::from_io(
            "locked.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, CorpusError::Io { .. }));
    }
}
