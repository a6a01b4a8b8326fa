// ============================================================
// Layer 6 — Corpus Statistics
// ============================================================
// Summarises a processed split and appends it to a CSV report.
//
// Columns:
//   corpus     toutiao | tangshi
//   split      train | val | test
//   samples    number of samples kept
//   min_len    shortest id sequence
//   mean_len   mean id sequence length
//   max_len    longest id sequence
//   unk_rate   share of ids that are [UNK]
//   truncated  samples longer than max_len (0 when unset)
//
// Output file: <dir>/corpus_stats.csv
//
// Example:
//   corpus,split,samples,min_len,mean_len,max_len,unk_rate,truncated
//   toutiao,train,267881,2,22.415300,145,0.003120,0
//
// A high unk_rate on val/test means top_k is too small for the
// corpus; a high truncated count means max_len cuts real content.

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

use crate::data::dataset::CorpusDataset;
use crate::data::vocab::UNK_ID;
use crate::domain::sample::Split;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitStats {
    pub corpus:    String,
    pub split:     Split,
    pub samples:   usize,
    pub min_len:   usize,
    pub mean_len:  f64,
    pub max_len:   usize,
    pub unk_rate:  f64,
    pub truncated: usize,
}

impl SplitStats {
    pub fn compute<T>(
        corpus:  &str,
        split:   Split,
        dataset: &CorpusDataset<T>,
        max_len: Option<usize>,
    ) -> Self {
        let lengths: Vec<usize> = dataset.iter().map(|s| s.len()).collect();
        let total: usize        = lengths.iter().sum();
        let unknown: usize      = dataset
            .iter()
            .map(|s| s.token_ids.iter().filter(|&&id| id == UNK_ID).count())
            .sum();

        Self {
            corpus:    corpus.to_string(),
            split,
            samples:   lengths.len(),
            min_len:   lengths.iter().copied().min().unwrap_or(0),
            mean_len:  if lengths.is_empty() { 0.0 } else { total as f64 / lengths.len() as f64 },
            max_len:   dataset.longest(),
            unk_rate:  if total == 0 { 0.0 } else { unknown as f64 / total as f64 },
            truncated: max_len.map_or(0, |m| lengths.iter().filter(|&&l| l > m).count()),
        }
    }
}

/// Appends split statistics to a CSV file.
pub struct StatsLogger {
    csv_path: PathBuf,
}

impl StatsLogger {
    /// Writes the header when the file does not exist yet, so
    /// repeated runs append to one report.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("corpus_stats.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "corpus,split,samples,min_len,mean_len,max_len,unk_rate,truncated")?;
            tracing::debug!("Created stats CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, s: &SplitStats) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{},{},{},{:.6},{},{:.6},{}",
            s.corpus, s.split, s.samples, s.min_len, s.mean_len, s.max_len, s.unk_rate, s.truncated,
        )?;

        tracing::debug!("Logged {} {} stats to '{}'", s.corpus, s.split, self.csv_path.display());
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
