use burn::data::dataset::Dataset;

use crate::domain::sample::TokenizedSample;

/// A fully tokenised split held in memory.
///
/// Built once by `Corpus::process` and never mutated afterwards;
/// every epoch re-reads the same samples.
#[derive(Debug, Clone)]
pub struct CorpusDataset<T> {
    samples: Vec<TokenizedSample<T>>,
}

impl<T> CorpusDataset<T> {
    pub fn new(samples: Vec<TokenizedSample<T>>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    pub fn samples(&self) -> &[TokenizedSample<T>] { &self.samples }

    pub fn iter(&self) -> std::slice::Iter<'_, TokenizedSample<T>> { self.samples.iter() }

    pub fn longest(&self) -> usize {
        self.samples.iter().map(TokenizedSample::len).max().unwrap_or(0)
    }
}

impl<T> Dataset<TokenizedSample<T>> for CorpusDataset<T>
where
    T: Clone + Send + Sync,
{
    fn get(&self, index: usize) -> Option<TokenizedSample<T>> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
