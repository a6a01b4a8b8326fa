// ============================================================
// Layer 4 — Batch Iterator
// ============================================================
// Walks a materialised CorpusDataset in mini-batches and pads each
// one into a rectangle.
//
// One BatchIter is one epoch. When shuffling is on, a fresh index
// permutation is drawn when the iterator is created; the dataset
// itself is only borrowed and never reordered. The last batch is
// short when the sample count is not a multiple of batch_size.
//
// Targets collate according to their kind:
//   ClassLabel → Vec<u32>     one class id per sample
//   Vec<u32>   → PaddedBatch  padded exactly like the inputs

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::dataset::CorpusDataset;
use crate::data::padding::{pad_sequence, Layout, PaddedBatch};
use crate::domain::sample::{ClassLabel, TokenizedSample};

// ─── Target collation ─────────────────────────────────────────────────────────
/// How a list of per-sample targets becomes one batch-level value.
pub trait Collate: Sized {
    type Batched;

    fn collate(targets: Vec<&Self>, padding: &PaddingOptions) -> Self::Batched;
}

impl Collate for ClassLabel {
    type Batched = Vec<u32>;

    fn collate(targets: Vec<&Self>, _padding: &PaddingOptions) -> Vec<u32> {
        targets.into_iter().map(|t| t.id()).collect()
    }
}

impl Collate for Vec<u32> {
    type Batched = PaddedBatch;

    fn collate(targets: Vec<&Self>, padding: &PaddingOptions) -> PaddedBatch {
        padding.pad(&targets)
    }
}

/// Padding parameters shared by inputs and sequence targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddingOptions {
    pub padding_value: u32,
    pub max_len:       Option<usize>,
    pub layout:        Layout,
}

impl PaddingOptions {
    pub fn pad<S: AsRef<[u32]>>(&self, sequences: &[S]) -> PaddedBatch {
        pad_sequence(sequences, self.padding_value, self.max_len, self.layout)
    }
}

// ─── Batch ────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T: Collate> {
    /// `[batch_size, seq_len]` (or transposed, per layout)
    pub inputs:  PaddedBatch,
    pub targets: T::Batched,
}

impl<T: Collate> Batch<T> {
    pub fn from_samples(samples: &[&TokenizedSample<T>], padding: &PaddingOptions) -> Self {
        let inputs: Vec<&[u32]> = samples.iter().map(|s| s.token_ids.as_slice()).collect();
        let targets: Vec<&T>    = samples.iter().map(|s| &s.target).collect();

        Self {
            inputs:  padding.pad(&inputs),
            targets: T::collate(targets, padding),
        }
    }

    pub fn batch_size(&self) -> usize {
        match self.inputs.layout() {
            Layout::BatchFirst    => self.inputs.shape().0,
            Layout::SequenceFirst => self.inputs.shape().1,
        }
    }
}

// ─── BatchIter ────────────────────────────────────────────────────────────────
pub struct BatchIter<'a, T> {
    dataset:    &'a CorpusDataset<T>,
    order:      Vec<usize>,
    cursor:     usize,
    batch_size: usize,
    padding:    PaddingOptions,
}

impl<'a, T: Collate> BatchIter<'a, T> {
    /// One pass over `dataset`. `shuffle = Some(rng)` permutes the
    /// visiting order; `None` keeps file order.
    ///
    /// # Panics
    /// Panics if `batch_size` is 0.
    pub fn new(
        dataset:    &'a CorpusDataset<T>,
        batch_size: usize,
        padding:    PaddingOptions,
        shuffle:    Option<&mut StdRng>,
    ) -> Self {
        assert!(batch_size > 0, "batch_size must be positive");

        let mut order: Vec<usize> = (0..dataset.sample_count()).collect();
        if let Some(rng) = shuffle {
            order.shuffle(rng);
        }

        Self {
            dataset,
            order,
            cursor: 0,
            batch_size,
            padding,
        }
    }

    /// Convenience for a one-off seeded shuffle
    pub fn shuffled(
        dataset:    &'a CorpusDataset<T>,
        batch_size: usize,
        padding:    PaddingOptions,
        seed:       u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new(dataset, batch_size, padding, Some(&mut rng))
    }

    pub fn num_batches(&self) -> usize {
        self.order.len().div_ceil(self.batch_size)
    }
}

impl<'a, T: Collate> Iterator for BatchIter<'a, T> {
    type Item = Batch<T>;

    fn next(&mut self) -> Option<Batch<T>> {
        if self.cursor >= self.order.len() {
            return None;
        }

        let end = (self.cursor + self.batch_size).min(self.order.len());
        let samples: Vec<&TokenizedSample<T>> = self.order[self.cursor..end]
            .iter()
            .map(|&i| &self.dataset.samples()[i])
            .collect();
        self.cursor = end;

        Some(Batch::from_samples(&samples, &self.padding))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.order.len() - self.cursor;
        let n    = left.div_ceil(self.batch_size);
        (n, Some(n))
    }
}

impl<'a, T: Collate> ExactSizeIterator for BatchIter<'a, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn padding(max_len: Option<usize>) -> PaddingOptions {
        PaddingOptions { padding_value: 1, max_len, layout: Layout::BatchFirst }
    }

    fn classification() -> CorpusDataset<ClassLabel> {
        CorpusDataset::new(
            (0..5u32)
                .map(|i| TokenizedSample::new(vec![2; i as usize + 1], ClassLabel(i)))
                .collect(),
        )
    }

    #[test]
    fn test_batches_in_order_with_short_tail() {
        let ds      = classification();
        let batches: Vec<_> = BatchIter::new(&ds, 2, padding(None), None).collect();

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].targets, vec![0, 1]);
        assert_eq!(batches[0].inputs.rows(), &[vec![2, 1], vec![2, 2]]);
        assert_eq!(batches[2].batch_size(), 1);
        assert_eq!(batches[2].inputs.shape(), (1, 5));
    }

    #[test]
    fn test_size_hint_matches_batch_count() {
        let ds   = classification();
        let iter = BatchIter::new(&ds, 2, padding(None), None);
        assert_eq!(iter.num_batches(), 3);
        assert_eq!(iter.len(), 3);
    }

    #[test]
    fn test_shuffle_visits_every_sample_once() {
        let ds = classification();
        let mut seen: Vec<u32> = BatchIter::shuffled(&ds, 2, padding(None), 7)
            .flat_map(|b| b.targets)
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        // the dataset is untouched
        assert_eq!(ds.samples()[0].target, ClassLabel(0));
    }

    #[test]
    fn test_same_seed_same_order() {
        let ds = classification();
        let a: Vec<_> = BatchIter::shuffled(&ds, 2, padding(None), 42).collect();
        let b: Vec<_> = BatchIter::shuffled(&ds, 2, padding(None), 42).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sequence_targets_are_padded_like_inputs() {
        let ds = CorpusDataset::new(vec![
            TokenizedSample::new(vec![2, 3, 4], vec![3, 4, 4]),
            TokenizedSample::new(vec![5, 6], vec![6, 6]),
        ]);
        let batch = BatchIter::new(&ds, 4, padding(Some(2)), None).next().unwrap();
        assert_eq!(batch.inputs.rows(), &[vec![2, 3], vec![5, 6]]);
        assert_eq!(batch.targets.rows(), &[vec![3, 4], vec![6, 6]]);
    }

    #[test]
    fn test_empty_dataset_yields_nothing() {
        let ds: CorpusDataset<ClassLabel> = CorpusDataset::new(Vec::new());
        assert_eq!(BatchIter::new(&ds, 3, padding(None), None).count(), 0);
    }

    #[test]
    #[should_panic]
    fn test_zero_batch_size_panics() {
        let ds = classification();
        let _ = BatchIter::new(&ds, 0, padding(None), None);
    }
}
