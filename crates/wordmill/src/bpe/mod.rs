//! # Byte-Pair Encoding Training
//!
//! Greedy bottom-up merging of the most frequent adjacent symbol pair.
//!
//! Each unique word is a [`SymbolLattice`] the merge loop rewrites in
//! place; the [`PairFreqIndex`] carries authoritative pair frequencies with
//! version counters, and the trainer's lazy max-heap ranks candidates,
//! discarding entries whose version has moved on.
//!
//! ## Training Example
//!
//! ```rust,no_run
//! use wordmill::bpe::{BpeTrainer, BpeTrainerOptions};
//!
//! fn example() -> wordmill::WmResult<()> {
//!     let options = BpeTrainerOptions::default().with_target_vocab_size(512);
//!     let mut trainer = BpeTrainer::new(options)?;
//!     trainer.load_corpus("corpus.txt")?;
//!     let merges = trainer.train()?;
//!     log::info!("performed {merges} merges");
//!     trainer.save("bpe.model", "bpe.vocab")?;
//!     Ok(())
//! }
//! ```

mod corpus;
mod lattice;
mod model_io;
mod pair_index;
mod trainer;

#[doc(inline)]
pub use corpus::BpeCorpus;
#[doc(inline)]
pub use lattice::SymbolLattice;
#[doc(inline)]
pub use model_io::{
    apply_merges, expand_merge_tokens, read_merge_table, write_merge_table, write_vocab,
};
#[doc(inline)]
pub use pair_index::{PairFreqIndex, PairStats};
#[doc(inline)]
pub use trainer::{BpeTrainer, BpeTrainerOptions};
