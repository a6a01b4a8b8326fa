// ============================================================
// Layer 4 — Batch Padder
// ============================================================
// Turns a ragged list of id sequences into a rectangle.
//
//   max_len = None     → pad every row up to the longest row
//   max_len = Some(n)  → pad short rows up to n and cut long rows
//                        down to their first n ids
//
// Truncation loses data by design: a fixed max_len is a promise
// about tensor shape, not about sample content.
//
// Example, padding value 0, no max_len, batch-first:
//   [1 2 3]          [1 2 3 0 0]
//   [1 2 3 4 5]  →   [1 2 3 4 5]
//   [1 2]            [1 2 0 0 0]

use serde::{Deserialize, Serialize};

/// Which axis leads in a padded batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// `[batch_size, seq_len]`
    #[default]
    BatchFirst,
    /// `[seq_len, batch_size]`
    SequenceFirst,
}

/// A rectangular block of ids. Every row has the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedBatch {
    rows:   Vec<Vec<u32>>,
    width:  usize,
    layout: Layout,
}

impl PaddedBatch {
    /// `(rows, columns)` in the current layout
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.width)
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn rows(&self) -> &[Vec<u32>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[u32]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn into_rows(self) -> Vec<Vec<u32>> {
        self.rows
    }

    /// Row-major flattening, ready for a `[rows, columns]` tensor
    pub fn to_flat(&self) -> Vec<u32> {
        self.rows.iter().flatten().copied().collect()
    }

    /// Swap the leading axis.
    pub fn transpose(self) -> Self {
        let (n_rows, n_cols) = self.shape();
        let rows = (0..n_cols)
            .map(|c| (0..n_rows).map(|r| self.rows[r][c]).collect())
            .collect();

        let layout = match self.layout {
            Layout::BatchFirst    => Layout::SequenceFirst,
            Layout::SequenceFirst => Layout::BatchFirst,
        };
        Self { rows, width: n_rows, layout }
    }
}

/// Pad (and truncate) `sequences` to a common length.
///
/// An empty input yields an empty batch of shape `(0, max_len or 0)`
/// in batch-first layout, transposed for sequence-first.
pub fn pad_sequence<S: AsRef<[u32]>>(
    sequences:     &[S],
    padding_value: u32,
    max_len:       Option<usize>,
    layout:        Layout,
) -> PaddedBatch {
    let target = max_len.unwrap_or_else(|| {
        sequences
            .iter()
            .map(|s| s.as_ref().len())
            .max()
            .unwrap_or(0)
    });

    let rows: Vec<Vec<u32>> = sequences
        .iter()
        .map(|s| {
            let s       = s.as_ref();
            let keep    = s.len().min(target);
            let mut row = Vec::with_capacity(target);
            row.extend_from_slice(&s[..keep]);
            row.resize(target, padding_value);
            row
        })
        .collect();

    let batch = PaddedBatch {
        rows,
        width: target,
        layout: Layout::BatchFirst,
    };

    match layout {
        Layout::BatchFirst    => batch,
        Layout::SequenceFirst => batch.transpose(),
    }
}
