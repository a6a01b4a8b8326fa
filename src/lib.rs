//! Corpus batching pipeline for text classification and poetry
//! generation.
//!
//! Builds a top-K character vocabulary from a training split, maps
//! text to token ids and assembles ragged id sequences into padded
//! batches, either as plain `Vec`s ([`data::batches::BatchIter`]) or
//! as Burn tensors ([`data::batcher`]).
//!
//! ```no_run
//! use corpus_pipeline::data::{
//!     corpus::{Corpus, CorpusConfig},
//!     loader::{MalformedLinePolicy, ToutiaoNews},
//!     tokenizer::CharTokenizer,
//! };
//!
//! let source = ToutiaoNews::new("data/toutiao", MalformedLinePolicy::Fail);
//! let corpus = Corpus::new(source, CharTokenizer::new(), CorpusConfig::default())?;
//! let (train, _val) = corpus.load_train_val()?;
//! for batch in corpus.make_batches(&train, true) {
//!     let (rows, cols) = batch.inputs.shape();
//!     println!("{rows}x{cols}");
//! }
//! # Ok::<(), corpus_pipeline::domain::error::CorpusError>(())
//! ```

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod infra;

pub use data::corpus::{Corpus, CorpusConfig};
pub use data::padding::{pad_sequence, Layout, PaddedBatch};
pub use data::vocab::Vocab;
pub use domain::error::CorpusError;
pub use domain::traits::{CorpusSource, ScriptConverter, Tokenizer};
