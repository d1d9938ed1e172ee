use std::path::PathBuf;

use anyhow::Context;
use wordmill::bpe::{BpeTrainer, BpeTrainerOptions};
use wordmill::unigram::{UnigramTrainer, UnigramTrainerOptions};

use crate::logging::Verbosity;

/// Model families the trainer can produce.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ModelType {
    /// Byte-pair encoding: a merge table plus token frequencies.
    Bpe,
    /// Unigram language model: a scored token list.
    Unigram,
}

/// Args for the train command.
#[derive(clap::Args, Debug)]
pub struct TrainArgs {
    /// Input corpus: UTF-8 text, one sentence per line.
    #[arg(long)]
    input: PathBuf,

    /// Which model family to train.
    #[arg(long, value_enum)]
    model_type: ModelType,

    /// Output model file (merge table for BPE, metadata for unigram).
    #[arg(long)]
    output_model: PathBuf,

    /// Output vocab file.
    #[arg(long)]
    output_vocab: PathBuf,

    /// Target vocabulary size.
    #[arg(long, default_value = "32000")]
    vocab_size: usize,

    /// Fraction of observed bytes kept as real symbols (BPE).
    #[arg(long, default_value = "0.9995")]
    character_coverage: f64,

    /// Minimum pair frequency for a BPE merge.
    #[arg(long, default_value = "2000")]
    min_pair_freq: u64,

    /// Minimum seed-candidate frequency (unigram).
    #[arg(long, default_value = "1")]
    min_token_freq: u64,

    /// EM iteration budget (unigram).
    #[arg(long, default_value = "10")]
    num_iterations: usize,

    /// Seed lexicon cap (unigram).
    #[arg(long, default_value = "1000000")]
    seed_size: usize,

    /// Longest candidate token, in bytes (unigram).
    #[arg(long, default_value = "16")]
    max_piece_length: usize,

    #[clap(flatten)]
    verbosity: Verbosity,
}

impl TrainArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        self.verbosity.init()?;

        match self.model_type {
            ModelType::Bpe => self.train_bpe(),
            ModelType::Unigram => self.train_unigram(),
        }
    }

    fn train_bpe(&self) -> anyhow::Result<()> {
        log::info!("BPE training: vocab size {}", self.vocab_size);

        let options = BpeTrainerOptions::default()
            .with_target_vocab_size(self.vocab_size)
            .with_character_coverage(self.character_coverage)
            .with_min_pair_freq(self.min_pair_freq);

        let mut trainer = BpeTrainer::new(options)?;
        trainer
            .load_corpus(&self.input)
            .with_context(|| format!("reading corpus {}", self.input.display()))?;

        let merges = trainer.train()?;
        log::info!("training completed with {merges} merges");

        trainer.save(&self.output_model, &self.output_vocab)?;
        log::info!(
            "saved model to {} and vocab to {}",
            self.output_model.display(),
            self.output_vocab.display()
        );
        Ok(())
    }

    fn train_unigram(&self) -> anyhow::Result<()> {
        log::info!("unigram training: vocab size {}", self.vocab_size);

        let options = UnigramTrainerOptions::default()
            .with_vocab_size(self.vocab_size)
            .with_max_piece_length(self.max_piece_length)
            .with_seed_size(self.seed_size)
            .with_min_token_freq(self.min_token_freq)
            .with_num_iterations(self.num_iterations);

        let mut trainer = UnigramTrainer::new(options)?;
        trainer
            .load_corpus(&self.input)
            .with_context(|| format!("reading corpus {}", self.input.display()))?;

        let size = trainer.train()?;
        log::info!("training completed with {size} tokens");

        trainer.save_vocab(&self.output_vocab)?;
        trainer.save_model_meta(&self.output_model)?;
        log::info!(
            "saved model to {} and vocab to {}",
            self.output_model.display(),
            self.output_vocab.display()
        );
        Ok(())
    }
}
