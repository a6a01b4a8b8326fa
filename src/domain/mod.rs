// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain structs, enums and traits that define what the pipeline
// works on. No file I/O and no tensor types live here.
//
//   error.rs   — CorpusError, every failure the pipeline surfaces
//   sample.rs  — Split, RawSample, ClassLabel, TokenizedSample
//   traits.rs  — Tokenizer, CorpusSource, ScriptConverter

pub mod error;

pub mod sample;

pub mod traits;
