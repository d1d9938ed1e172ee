//! # BPE Trainer

use crate::bpe::corpus::BpeCorpus;
use crate::bpe::model_io;
use crate::bpe::pair_index::PairFreqIndex;
use crate::collections::LazyPairHeap;
use crate::errors::{WmResult, WordmillError};
use crate::types::{Pair, TokenId, WmHashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// The number of single-byte tokens; merge ids start here.
pub const BYTE_TOKENS: usize = 256;

/// Fallback when `min_pair_freq` is configured as zero.
const DEFAULT_MIN_PAIR_FREQ: u64 = 2000;

/// Fallback when `character_coverage` is outside `(0, 1]`.
const DEFAULT_CHARACTER_COVERAGE: f64 = 0.995;

/// Deleted lattice nodes are swept every this many merges.
const SWEEP_INTERVAL: usize = 100;

/// Options for [`BpeTrainer`].
#[derive(Debug, Clone)]
pub struct BpeTrainerOptions {
    /// The target vocabulary size; must be >= 256 (the u8 space).
    pub target_vocab_size: usize,

    /// Fraction of observed bytes kept as real symbols; the rest become
    /// `unk`. Values outside `(0, 1]` fall back to `0.995`.
    pub character_coverage: f64,

    /// Pairs below this frequency are never merged. Zero falls back to the
    /// default of 2000.
    pub min_pair_freq: u64,

    /// The id assigned to bytes outside the keep-set. Never merged.
    pub unk_id: TokenId,
}

impl Default for BpeTrainerOptions {
    fn default() -> Self {
        Self {
            target_vocab_size: 32_000,
            character_coverage: 0.9995,
            min_pair_freq: DEFAULT_MIN_PAIR_FREQ,
            unk_id: -1,
        }
    }
}

impl BpeTrainerOptions {
    /// Sets the target vocab size.
    pub fn with_target_vocab_size(
        self,
        target_vocab_size: usize,
    ) -> Self {
        Self {
            target_vocab_size,
            ..self
        }
    }

    /// Sets the character coverage.
    pub fn with_character_coverage(
        self,
        character_coverage: f64,
    ) -> Self {
        Self {
            character_coverage,
            ..self
        }
    }

    /// Sets the minimum pair frequency.
    pub fn with_min_pair_freq(
        self,
        min_pair_freq: u64,
    ) -> Self {
        Self {
            min_pair_freq,
            ..self
        }
    }

    /// Clamp out-of-range values to their documented fallbacks.
    fn sanitized(mut self) -> Self {
        if !(self.character_coverage > 0.0 && self.character_coverage <= 1.0) {
            self.character_coverage = DEFAULT_CHARACTER_COVERAGE;
        }
        if self.min_pair_freq == 0 {
            self.min_pair_freq = DEFAULT_MIN_PAIR_FREQ;
        }
        self
    }
}

/// Trainer for byte-pair-encoding vocabularies.
///
/// Lifecycle: feed the corpus ([`Self::load_corpus`] or
/// [`Self::update_from_samples`]), then [`Self::train`], then
/// [`Self::save`]. Training may be re-run; it rebuilds the heap and index
/// from the current lattices.
pub struct BpeTrainer {
    /// Trainer options.
    pub options: BpeTrainerOptions,

    corpus: BpeCorpus,
    index: PairFreqIndex,
    heap: LazyPairHeap,
    merge_ops: Vec<Pair>,
    lattices_built: bool,
}

impl BpeTrainer {
    /// Initializes a [`BpeTrainer`].
    ///
    /// ## Errors
    /// [`WordmillError::VocabSizeTooSmall`] if the target is below 256.
    pub fn new(options: BpeTrainerOptions) -> WmResult<Self> {
        if options.target_vocab_size < BYTE_TOKENS {
            return Err(WordmillError::VocabSizeTooSmall {
                size: options.target_vocab_size,
            });
        }
        Ok(Self {
            options: options.sanitized(),
            corpus: BpeCorpus::new(),
            index: PairFreqIndex::new(),
            heap: LazyPairHeap::default(),
            merge_ops: Vec::new(),
            lattices_built: false,
        })
    }

    /// Read a corpus file, one sentence per line, blank lines skipped.
    pub fn load_corpus<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> WmResult<()> {
        let reader = BufReader::new(File::open(path)?);
        let mut buf = String::new();
        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                self.corpus.update_from_text(&line, &mut buf);
            }
        }
        self.lattices_built = false;
        log::info!("corpus loaded: {} unique words", self.corpus.unique_words());
        Ok(())
    }

    /// Update word counts from in-memory samples.
    pub fn update_from_samples<I>(
        &mut self,
        samples: I,
    ) where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.corpus.update_from_samples(samples);
        self.lattices_built = false;
    }

    /// The merge log, in creation order. Its length is the merge count.
    pub fn merge_ops(&self) -> &[Pair] {
        &self.merge_ops
    }

    /// The number of merges performed.
    pub fn num_merges(&self) -> usize {
        self.merge_ops.len()
    }

    /// Reset the heap and pair index and recount bigrams from the lattices.
    fn init(&mut self) {
        if !self.lattices_built {
            self.corpus
                .build_lattices(self.options.character_coverage, self.options.unk_id);
            self.lattices_built = true;
        }
        self.index = PairFreqIndex::new();
        self.heap.clear();
        self.merge_ops.clear();
        self.count_bigrams();
    }

    /// Count adjacent live non-unk pairs and prime the heap.
    fn count_bigrams(&mut self) {
        log::info!("counting bigrams from {} words", self.corpus.words.len());

        let mut total_pairs: u64 = 0;
        for (word, &count) in self.corpus.words.iter().zip(&self.corpus.counts) {
            for pair in word.live_pairs() {
                self.index.add(pair, count);
                total_pairs += count;
            }
        }

        let min_freq = self.options.min_pair_freq;
        let mut heap_entries = 0usize;
        for (pair, stats) in self.index.iter() {
            if stats.freq >= min_freq {
                self.heap.push(pair, stats.freq, stats.version);
                heap_entries += 1;
            }
        }
        log::info!(
            "counted {} bigram occurrences, {} unique pairs, {} above threshold {}",
            total_pairs,
            self.index.len(),
            heap_entries,
            min_freq
        );
    }

    /// Recount a pair's authoritative frequency across all lattices.
    fn recompute_freq(
        &self,
        pair: Pair,
    ) -> u64 {
        if pair.0 == self.options.unk_id || pair.1 == self.options.unk_id {
            return 0;
        }
        let mut freq = 0;
        for (word, &count) in self.corpus.words.iter().zip(&self.corpus.counts) {
            freq += word.live_pairs().filter(|&p| p == pair).count() as u64 * count;
        }
        freq
    }

    /// Run the full training loop.
    ///
    /// Returns the number of merges performed. Heap exhaustion before the
    /// target is reached is normal termination, not an error.
    pub fn train(&mut self) -> WmResult<usize> {
        log::info!(
            "starting BPE training (target vocab size: {})",
            self.options.target_vocab_size
        );
        self.init();

        let target_merges = self.options.target_vocab_size - BYTE_TOKENS;
        let mut total_merges = 0;
        let mut last_sweep = 0;

        while total_merges < target_merges {
            let Some(top) = self.heap.peek() else {
                log::info!("heap exhausted, stopping at {} merges", total_merges);
                break;
            };

            let batch_size = batch_size_for(top.freq).min(target_merges - total_merges);
            let merged = self.merge_batch(batch_size);
            if merged == 0 {
                break;
            }
            total_merges += merged;

            if total_merges - last_sweep >= SWEEP_INTERVAL {
                log::debug!("sweeping deleted symbols after {} merges", total_merges);
                self.sweep_lattices();
                last_sweep = total_merges;
            }
        }

        self.sweep_lattices();
        log::info!("training completed: {} merges", total_merges);
        debug_assert!(self.merge_ops.len() <= target_merges);
        Ok(total_merges)
    }

    /// Perform up to `batch_size` merges. Returns the number performed.
    fn merge_batch(
        &mut self,
        batch_size: usize,
    ) -> usize {
        let min_freq = self.options.min_pair_freq;
        let mut merges_done = 0;
        let mut stale_entries = 0usize;

        while merges_done < batch_size {
            let Some(entry) = self.heap.pop() else {
                break;
            };
            let pair = entry.pair;
            let stats = self.index.stats(pair);

            if entry.version != stats.version {
                stale_entries += 1;
                continue;
            }

            // The index tracks deltas incrementally; a full recount is the
            // authority and wins on disagreement.
            let actual_freq = self.recompute_freq(pair);
            if actual_freq != stats.freq {
                self.index.set_freq(pair, actual_freq);
                if actual_freq >= min_freq {
                    let stats = self.index.stats(pair);
                    self.heap.push(pair, stats.freq, stats.version);
                }
                continue;
            }
            if actual_freq < min_freq {
                continue;
            }

            let new_id = (BYTE_TOKENS + self.merge_ops.len()) as TokenId;
            log::debug!(
                "merging ({}, {}) freq={} -> id {}",
                pair.0,
                pair.1,
                actual_freq,
                new_id
            );
            self.merge_ops.push(pair);

            // Aggregate neighbour deltas locally; duplicates sum.
            let mut deltas: WmHashMap<Pair, i64> = WmHashMap::default();
            let mut occurrences: u64 = 0;
            for (word, &count) in self.corpus.words.iter_mut().zip(&self.corpus.counts) {
                let merged = word.merge_pair(pair, new_id, &mut |p, d| {
                    *deltas.entry(p).or_default() += d * count as i64;
                });
                occurrences += merged * count;
            }

            for (&p, &delta) in deltas.iter() {
                if p == pair || delta == 0 {
                    continue;
                }
                self.index.apply_delta(p, delta);
                let stats = self.index.stats(p);
                if stats.freq >= min_freq {
                    self.heap.push(p, stats.freq, stats.version);
                }
            }
            self.index.zero(pair);

            merges_done += 1;
            log::debug!("merged {} occurrences in corpus", occurrences);
        }

        if stale_entries > 0 {
            log::debug!("skipped {} stale heap entries", stale_entries);
        }
        merges_done
    }

    fn sweep_lattices(&mut self) {
        for word in &mut self.corpus.words {
            word.sweep();
        }
    }

    /// Final per-token frequencies: live lattice nodes weighted by word
    /// count. Unk nodes are skipped.
    pub fn token_frequencies(&self) -> Vec<u64> {
        let total = BYTE_TOKENS + self.merge_ops.len();
        let mut freqs = vec![0u64; total];
        for (word, &count) in self.corpus.words.iter().zip(&self.corpus.counts) {
            for id in word.live_ids() {
                if id >= 0 {
                    freqs[id as usize] += count;
                }
            }
        }
        freqs
    }

    /// Write the model (merge table) and vocab files.
    pub fn save<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        model_path: P,
        vocab_path: Q,
    ) -> WmResult<()> {
        let tokens = model_io::expand_merge_tokens(&self.merge_ops);
        model_io::write_vocab(vocab_path, &tokens, &self.token_frequencies())?;
        model_io::write_merge_table(model_path, &self.merge_ops)?;
        log::info!(
            "saved {}-token vocab and {} merges",
            tokens.len(),
            self.merge_ops.len()
        );
        Ok(())
    }
}

/// Batch size schedule: larger batches while frequencies are high.
///
/// Scheduling only; the merge output is identical for any batch size.
fn batch_size_for(top_freq: u64) -> usize {
    match top_freq {
        f if f > 50_000 => 10,
        f if f > 20_000 => 5,
        f if f > 10_000 => 3,
        f if f > 5_000 => 2,
        _ => 1,
    }
}
