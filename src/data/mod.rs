// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from corpus files on disk to padded batches.
//
//   toutiao_*.txt / poet.tang.*.json
//       │
//       ▼
//   ToutiaoNews / TangShi   → raw (text, label) pairs
//       │
//       ▼
//   CharTokenizer + Vocab   → token ids, built from train only
//       │
//       ▼
//   CorpusDataset           → materialised split, Burn Dataset
//       │
//       ▼
//   BatchIter / Batchers    → padded batches (Vec or Burn tensors)
//
// Each module handles one step and is tested on its own.

/// Reads the `_!_`-delimited news title corpus
pub mod loader;

/// Reads the sharded Tang poetry JSON corpus
pub mod poetry;

/// Character-level tokenizer
pub mod tokenizer;

/// Top-K vocabulary with [UNK] and [PAD]
pub mod vocab;

/// Right padding and truncation into rectangles
pub mod padding;

/// Simplified / traditional Chinese normalisation
pub mod converter;

/// In-memory tokenised split, implements Burn's Dataset
pub mod dataset;

/// Epoch iterator over padded batches
pub mod batches;

/// Burn Batcher implementations producing Int tensors
pub mod batcher;

/// Orchestrates source, tokenizer and vocabulary
pub mod corpus;
