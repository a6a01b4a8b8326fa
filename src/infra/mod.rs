// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence and reporting used by the use cases:
//
//   vocab_store.rs — saves the training vocabulary as JSON and
//                    loads it back for inference
//
//   metrics.rs     — per-split corpus statistics appended to a
//                    CSV report

/// Vocabulary JSON persistence
pub mod vocab_store;

/// Corpus statistics CSV logger
pub mod metrics;
