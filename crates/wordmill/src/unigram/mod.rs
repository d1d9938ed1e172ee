//! # Unigram Language-Model Training
//!
//! EM-style vocabulary pruning: an over-sized seed lexicon of candidate
//! subwords is repeatedly segmented against the corpus with [`viterbi`],
//! re-scored from realised piece counts, and pruned of its weakest tokens
//! until the target vocabulary size is reached.
//!
//! Tokens are byte strings (`Vec<u8>`): candidate substrings are byte
//! spans of UTF-8 text and need not fall on character boundaries.
//!
//! ## Training Example
//!
//! ```rust,no_run
//! use wordmill::unigram::{UnigramTrainer, UnigramTrainerOptions};
//!
//! fn example() -> wordmill::WmResult<()> {
//!     let options = UnigramTrainerOptions::default().with_vocab_size(8000);
//!     let mut trainer = UnigramTrainer::new(options)?;
//!     trainer.load_corpus("corpus.txt")?;
//!     let size = trainer.train()?;
//!     log::info!("final vocabulary: {size} tokens");
//!     trainer.save_vocab("unigram.vocab")?;
//!     Ok(())
//! }
//! ```

mod subword;
mod trainer;
mod viterbi;
mod vocab_io;

#[doc(inline)]
pub use subword::{SeedVocab, build_seed_vocab, enumerate_substrings};
#[doc(inline)]
pub use trainer::{UnigramTrainer, UnigramTrainerOptions};
#[doc(inline)]
pub use viterbi::viterbi_segment;
#[doc(inline)]
pub use vocab_io::{read_vocab, write_model_meta, write_vocab};
