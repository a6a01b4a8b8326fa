// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Coordinates the data and infra layers for one goal each. No
// parsing or padding logic lives here, and nothing is printed;
// the CLI layer owns output.

// Vocabulary building and batch preparation for a corpus
pub mod prepare_use_case;

// Id sequences for inference prompts
pub mod infer_use_case;
