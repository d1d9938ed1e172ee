//! # wordmill CLI
//!
//! Trains BPE or unigram subword vocabularies from a text corpus.

mod commands;
mod logging;

use clap::Parser;
use commands::train::TrainArgs;

/// Subword vocabulary trainer.
#[derive(clap::Parser, Debug)]
#[command(name = "wordmill", version, about)]
pub struct Args {
    #[clap(flatten)]
    train: TrainArgs,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    args.train.run()
}
