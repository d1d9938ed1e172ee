//! # `wordmill` Subword Vocabulary Trainer
//!
//! `wordmill` trains subword vocabularies from plain-text corpora with two
//! complementary algorithms:
//!
//! * [`bpe`] - Byte-Pair Encoding: greedy bottom-up merging of the most
//!   frequent adjacent symbol pair over a mutable symbol lattice.
//! * [`unigram`] - Unigram language model: EM-style pruning of an over-sized
//!   seed lexicon, segmenting with Viterbi and re-estimating token scores.
//!
//! Both engines share the [`normalizer`] pass and the support structures in
//! [`collections`].
//!
//! ## Training Example
//!
//! ```rust,no_run
//! use wordmill::bpe::{BpeTrainer, BpeTrainerOptions};
//!
//! fn example(corpus: &str) -> wordmill::WmResult<()> {
//!     let options = BpeTrainerOptions::default()
//!         .with_target_vocab_size(1000)
//!         .with_min_pair_freq(2);
//!
//!     let mut trainer = BpeTrainer::new(options)?;
//!     trainer.load_corpus(corpus)?;
//!
//!     let merges = trainer.train()?;
//!     log::info!("learned {merges} merges");
//!
//!     trainer.save("bpe.model", "bpe.vocab")?;
//!     Ok(())
//! }
//! ```
#![warn(missing_docs, unused)]

pub mod collections;
pub mod normalizer;

pub mod bpe;
pub mod unigram;

mod errors;
mod types;

#[doc(inline)]
pub use errors::{WmResult, WordmillError};
#[doc(inline)]
pub use types::{Pair, TokenId, WmHashMap, WmHashSet, pack_pair, unpack_pair};
