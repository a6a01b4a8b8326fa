// ============================================================
// Layer 4 — Tensor Batchers
// ============================================================
// Implements Burn's Batcher trait so a CorpusDataset can feed a
// Burn DataLoader directly.
//
//   Input:  Vec of N TokenizedSamples with ragged lengths
//   Output: inputs tensor of shape [N, S]
//           + labels  [N]     (classification)
//           or targets [N, S] (next-character prediction)
//
// S is max_len when one is configured, otherwise the longest
// sample in this batch. Padding uses the vocabulary's [PAD] id.
// Tensors are always batch-first.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::padding::{pad_sequence, Layout, PaddedBatch};
use crate::data::vocab::PAD_ID;
use crate::domain::sample::{ClassLabel, TokenizedSample};

/// Row-major copy of a batch-first PaddedBatch into an Int tensor
fn to_int_tensor<B: Backend>(batch: &PaddedBatch, device: &B::Device) -> Tensor<B, 2, Int> {
    let (rows, cols) = batch.shape();
    let flat: Vec<i32> = batch.to_flat().into_iter().map(|x| x as i32).collect();

    Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device).reshape([rows, cols])
}

// ─── ClassificationBatch ──────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct ClassificationBatch<B: Backend> {
    /// Token ids — shape: [batch_size, seq_len]
    pub inputs: Tensor<B, 2, Int>,

    /// Class ids — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct ClassificationBatcher<B: Backend> {
    device:        B::Device,
    padding_value: u32,
    max_len:       Option<usize>,
}

impl<B: Backend> ClassificationBatcher<B> {
    pub fn new(device: B::Device, max_len: Option<usize>) -> Self {
        Self { device, padding_value: PAD_ID, max_len }
    }
}

impl<B: Backend> Batcher<TokenizedSample<ClassLabel>, ClassificationBatch<B>>
    for ClassificationBatcher<B>
{
    fn batch(&self, items: Vec<TokenizedSample<ClassLabel>>) -> ClassificationBatch<B> {
        let seqs: Vec<&[u32]> = items.iter().map(|s| s.token_ids.as_slice()).collect();
        let padded = pad_sequence(&seqs, self.padding_value, self.max_len, Layout::BatchFirst);

        let labels: Vec<i32> = items.iter().map(|s| s.target.id() as i32).collect();

        ClassificationBatch {
            inputs: to_int_tensor(&padded, &self.device),
            labels: Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device),
        }
    }
}

// ─── SequenceBatch ────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    /// Token ids — shape: [batch_size, seq_len]
    pub inputs: Tensor<B, 2, Int>,

    /// Next-character ids — shape: [batch_size, seq_len]
    pub targets: Tensor<B, 2, Int>,
}

#[derive(Clone, Debug)]
pub struct SequenceBatcher<B: Backend> {
    device:        B::Device,
    padding_value: u32,
    max_len:       Option<usize>,
}

impl<B: Backend> SequenceBatcher<B> {
    pub fn new(device: B::Device, max_len: Option<usize>) -> Self {
        Self { device, padding_value: PAD_ID, max_len }
    }
}

impl<B: Backend> Batcher<TokenizedSample<Vec<u32>>, SequenceBatch<B>> for SequenceBatcher<B> {
    fn batch(&self, items: Vec<TokenizedSample<Vec<u32>>>) -> SequenceBatch<B> {
        let inputs:  Vec<&[u32]> = items.iter().map(|s| s.token_ids.as_slice()).collect();
        let targets: Vec<&[u32]> = items.iter().map(|s| s.target.as_slice()).collect();

        let inputs  = pad_sequence(&inputs, self.padding_value, self.max_len, Layout::BatchFirst);
        let targets = pad_sequence(&targets, self.padding_value, self.max_len, Layout::BatchFirst);

        SequenceBatch {
            inputs:  to_int_tensor(&inputs, &self.device),
            targets: to_int_tensor(&targets, &self.device),
        }
    }
}
