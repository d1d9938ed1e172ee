//! # Unigram Trainer

use crate::collections::{LruCache, SubwordTrie, TokenScoreHeap};
use crate::errors::{WmResult, WordmillError};
use crate::normalizer;
use crate::types::WmHashMap;
use crate::unigram::subword::{SeedVocab, build_seed_vocab};
use crate::unigram::viterbi::viterbi_segment;
use crate::unigram::vocab_io;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Training texts are capped at this many sentences.
const MAX_TRAIN_TEXTS: usize = 50_000;

/// Sentences sampled per loss computation.
const MAX_LOSS_TEXTS: usize = 2_000;

/// Sentences sampled per re-scoring pass.
const MAX_SCORE_TEXTS: usize = 5_000;

/// Per-iteration shrink factor during pruning.
const REDUCTION_RATIO: f64 = 0.8;

/// Outer-loop convergence threshold on the corpus loss.
const CONVERGENCE_THRESHOLD: f64 = 0.001;

/// Capacity of the per-iteration loss cache.
const LOSS_CACHE_CAPACITY: usize = 100_000;

/// Fixed-point scale for loss values stored in the cache.
const LOSS_CACHE_SCALE: f64 = 10_000.0;

/// Score charged for a piece missing from the lexicon.
const UNKNOWN_PIECE_SCORE: f64 = -20.0;

/// Options for [`UnigramTrainer`].
#[derive(Debug, Clone)]
pub struct UnigramTrainerOptions {
    /// The target vocabulary size.
    pub vocab_size: usize,

    /// Longest candidate token, in bytes.
    pub max_piece_length: usize,

    /// Cap on the seed lexicon's multi-byte candidates.
    pub seed_size: usize,

    /// Seed candidates below this occurrence count are dropped.
    pub min_token_freq: u64,

    /// Maximum number of EM iterations.
    pub num_iterations: usize,
}

impl Default for UnigramTrainerOptions {
    fn default() -> Self {
        Self {
            vocab_size: 32_000,
            max_piece_length: 16,
            seed_size: 1_000_000,
            min_token_freq: 1,
            num_iterations: 10,
        }
    }
}

impl UnigramTrainerOptions {
    /// Sets the target vocab size.
    pub fn with_vocab_size(
        self,
        vocab_size: usize,
    ) -> Self {
        Self { vocab_size, ..self }
    }

    /// Sets the maximum piece length.
    pub fn with_max_piece_length(
        self,
        max_piece_length: usize,
    ) -> Self {
        Self {
            max_piece_length,
            ..self
        }
    }

    /// Sets the seed lexicon cap.
    pub fn with_seed_size(
        self,
        seed_size: usize,
    ) -> Self {
        Self { seed_size, ..self }
    }

    /// Sets the minimum seed-candidate frequency.
    pub fn with_min_token_freq(
        self,
        min_token_freq: u64,
    ) -> Self {
        Self {
            min_token_freq,
            ..self
        }
    }

    /// Sets the iteration budget.
    pub fn with_num_iterations(
        self,
        num_iterations: usize,
    ) -> Self {
        Self {
            num_iterations,
            ..self
        }
    }
}

/// Trainer for unigram language-model vocabularies.
///
/// Lifecycle: feed the corpus ([`Self::load_corpus`] or [`Self::add_text`]),
/// then [`Self::train`], then [`Self::save_vocab`] /
/// [`Self::save_model_meta`].
pub struct UnigramTrainer {
    /// Trainer options.
    pub options: UnigramTrainerOptions,

    texts: Vec<Vec<u8>>,
    lexicon: WmHashMap<Vec<u8>, f64>,
    token_freqs: WmHashMap<Vec<u8>, u64>,
    trie: SubwordTrie,
    heap: TokenScoreHeap,
    loss_cache: LruCache,
    hash_state: ahash::RandomState,
    final_vocab: Vec<(Vec<u8>, f64)>,
}

impl UnigramTrainer {
    /// Initializes a [`UnigramTrainer`].
    ///
    /// ## Errors
    /// [`WordmillError::InvalidConfig`] for a zero vocab size, piece
    /// length, or iteration budget.
    pub fn new(options: UnigramTrainerOptions) -> WmResult<Self> {
        if options.vocab_size == 0 {
            return Err(WordmillError::InvalidConfig(
                "vocab_size must be positive".into(),
            ));
        }
        if options.max_piece_length == 0 {
            return Err(WordmillError::InvalidConfig(
                "max_piece_length must be positive".into(),
            ));
        }
        if options.num_iterations == 0 {
            return Err(WordmillError::InvalidConfig(
                "num_iterations must be positive".into(),
            ));
        }
        Ok(Self {
            options,
            texts: Vec::new(),
            lexicon: WmHashMap::default(),
            token_freqs: WmHashMap::default(),
            trie: SubwordTrie::new(),
            heap: TokenScoreHeap::new(),
            loss_cache: LruCache::new(LOSS_CACHE_CAPACITY),
            hash_state: ahash::RandomState::new(),
            final_vocab: Vec::new(),
        })
    }

    /// Add one raw sentence; it is normalized immediately.
    ///
    /// Sentences that normalize to nothing are skipped, not fatal.
    pub fn add_text(
        &mut self,
        line: &str,
    ) {
        let normalized = normalizer::normalize(line);
        if !normalized.is_empty() {
            self.texts.push(normalized.into_bytes());
        }
    }

    /// Read a corpus file, one sentence per line, blank lines skipped.
    pub fn load_corpus<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> WmResult<()> {
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                self.add_text(&line);
            }
        }
        log::info!("corpus loaded: {} texts", self.texts.len());
        Ok(())
    }

    /// The number of loaded texts.
    pub fn num_texts(&self) -> usize {
        self.texts.len()
    }

    /// The final vocabulary, sorted by score descending.
    ///
    /// Empty until [`Self::train`] has run.
    pub fn final_vocab(&self) -> &[(Vec<u8>, f64)] {
        &self.final_vocab
    }

    /// Run the full training loop.
    ///
    /// Returns the final vocabulary size.
    ///
    /// ## Errors
    /// [`WordmillError::EmptyCorpus`] when no text survived normalization.
    pub fn train(&mut self) -> WmResult<usize> {
        if self.texts.is_empty() {
            return Err(WordmillError::EmptyCorpus);
        }
        self.texts.truncate(MAX_TRAIN_TEXTS);

        log::info!(
            "starting unigram training (target vocab size: {}, {} texts)",
            self.options.vocab_size,
            self.texts.len()
        );

        let SeedVocab {
            lexicon,
            token_freqs,
            trie,
            heap,
        } = build_seed_vocab(
            &self.texts,
            self.options.max_piece_length,
            self.options.seed_size,
            self.options.min_token_freq,
        );
        self.lexicon = lexicon;
        self.token_freqs = token_freqs;
        self.trie = trie;
        self.heap = heap;
        self.loss_cache = LruCache::new(LOSS_CACHE_CAPACITY);

        let mut prev_loss = f64::INFINITY;
        for iteration in 0..self.options.num_iterations {
            let loss = self.compute_loss();
            log::info!(
                "iteration {}/{}: loss {:.4}, lexicon {}",
                iteration + 1,
                self.options.num_iterations,
                loss,
                self.lexicon.len()
            );

            if (prev_loss - loss).abs() < CONVERGENCE_THRESHOLD {
                log::info!("convergence reached");
                break;
            }
            prev_loss = loss;

            self.update_token_scores();
            if self.lexicon.len() > self.options.vocab_size {
                self.prune_step();
                log::info!("pruned lexicon to {} tokens", self.lexicon.len());
            }

            // The cache must never serve losses across a score update.
            self.loss_cache = LruCache::new(LOSS_CACHE_CAPACITY);
        }

        self.finalize();
        log::info!("final vocabulary: {} tokens", self.final_vocab.len());
        Ok(self.final_vocab.len())
    }

    /// Corpus loss over a bounded sample: per-sentence Viterbi cost,
    /// normalized by total byte length, memoized in the LRU cache.
    fn compute_loss(&mut self) -> f64 {
        let mut total_loss = 0.0;
        let mut total_len = 0usize;

        for text in self.texts.iter().take(MAX_LOSS_TEXTS) {
            let key = self.hash_state.hash_one(text);
            let text_loss = match self.loss_cache.get(key) {
                Some(cached) => cached as f64 / LOSS_CACHE_SCALE,
                None => {
                    let pieces =
                        viterbi_segment(text, &self.lexicon, self.options.max_piece_length);
                    let loss: f64 = pieces
                        .iter()
                        .map(|piece| {
                            -self
                                .lexicon
                                .get(piece)
                                .copied()
                                .unwrap_or(UNKNOWN_PIECE_SCORE)
                        })
                        .sum();
                    self.loss_cache.put(key, (loss * LOSS_CACHE_SCALE) as i64);
                    loss
                }
            };
            total_loss += text_loss;
            total_len += text.len();
        }

        if total_len == 0 {
            0.0
        } else {
            total_loss / total_len as f64
        }
    }

    /// Re-estimate token scores from realised piece counts over a bounded
    /// sample. Unobserved tokens keep a count of one so they retain a tiny
    /// probability mass; scores are normalized log probabilities.
    fn update_token_scores(&mut self) {
        let mut observed: WmHashMap<Vec<u8>, u64> = WmHashMap::default();
        for text in self.texts.iter().take(MAX_SCORE_TEXTS) {
            for piece in viterbi_segment(text, &self.lexicon, self.options.max_piece_length) {
                if self.lexicon.contains_key(&piece) {
                    *observed.entry(piece).or_default() += 1;
                }
            }
        }
        if observed.is_empty() {
            return;
        }

        let total: u64 = self
            .lexicon
            .keys()
            .map(|token| observed.get(token).copied().unwrap_or(1))
            .sum();
        let log_total = (total as f64).ln();

        for (token, score) in self.lexicon.iter_mut() {
            let count = observed.get(token).copied().unwrap_or(1);
            *score = (count as f64).ln() - log_total;
            self.heap.update_freq(token, count);
            self.token_freqs.insert(token.clone(), count);
        }
    }

    /// Remove the weakest multi-byte tokens until at most
    /// `max(target, 0.8 * current)` remain. Single-byte tokens are never
    /// removed, so every corpus byte stays segmentable.
    fn prune_step(&mut self) {
        let current = self.lexicon.len();
        let floor = (current as f64 * REDUCTION_RATIO) as usize;
        let target = self.options.vocab_size.max(floor);
        let to_remove = current.saturating_sub(target);
        if to_remove == 0 {
            return;
        }

        // Constant-time loss-increase estimate: count * |score|.
        let mut candidates: Vec<(f64, Vec<u8>)> = self
            .lexicon
            .iter()
            .filter(|(token, _)| token.len() > 1)
            .map(|(token, &score)| {
                let count = self.token_freqs.get(token).copied().unwrap_or(1);
                (count as f64 * score.abs(), token.clone())
            })
            .collect();
        candidates.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(core::cmp::Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });

        for (_, token) in candidates.into_iter().take(to_remove) {
            self.lexicon.remove(&token);
            self.token_freqs.remove(&token);
            self.trie.remove(&token);
            self.heap.remove(&token);
        }
    }

    /// Partition into single- and multi-byte tokens, keep the best-scoring
    /// multi-byte tokens up to the target, and sort the result by score.
    fn finalize(&mut self) {
        let mut singles: Vec<(Vec<u8>, f64)> = Vec::new();
        let mut multi: Vec<(Vec<u8>, f64)> = Vec::new();
        for (token, &score) in self.lexicon.iter() {
            if token.len() == 1 {
                singles.push((token.clone(), score));
            } else {
                multi.push((token.clone(), score));
            }
        }

        multi.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(core::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        multi.truncate(self.options.vocab_size.saturating_sub(singles.len()));

        self.final_vocab = multi;
        self.final_vocab.append(&mut singles);
        self.final_vocab.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(core::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
    }

    /// Segment text with the final vocabulary (normalizing first).
    ///
    /// Intended for post-training inspection; returns normalized byte
    /// pieces whose concatenation is the normalized text.
    pub fn segment(
        &self,
        text: &str,
    ) -> Vec<Vec<u8>> {
        let normalized = normalizer::normalize(text);
        let lexicon: WmHashMap<Vec<u8>, f64> = self.final_vocab.iter().cloned().collect();
        viterbi_segment(
            normalized.as_bytes(),
            &lexicon,
            self.options.max_piece_length,
        )
    }

    /// Write the vocab file, sorted by score descending.
    pub fn save_vocab<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> WmResult<()> {
        vocab_io::write_vocab(path, &self.final_vocab)
    }

    /// Write the model metadata header.
    pub fn save_model_meta<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> WmResult<()> {
        vocab_io::write_model_meta(path, self.final_vocab.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trainer(vocab_size: usize) -> UnigramTrainer {
        let options = UnigramTrainerOptions::default()
            .with_vocab_size(vocab_size)
            .with_num_iterations(5)
            .with_min_token_freq(2);
        UnigramTrainer::new(options).unwrap()
    }

    #[test]
    fn test_options_builders() {
        let options = UnigramTrainerOptions::default()
            .with_vocab_size(100)
            .with_max_piece_length(8)
            .with_seed_size(500)
            .with_min_token_freq(3)
            .with_num_iterations(7);

        assert_eq!(options.vocab_size, 100);
        assert_eq!(options.max_piece_length, 8);
        assert_eq!(options.seed_size, 500);
        assert_eq!(options.min_token_freq, 3);
        assert_eq!(options.num_iterations, 7);
    }

    #[test]
    fn test_rejects_zero_config() {
        assert!(UnigramTrainer::new(UnigramTrainerOptions::default().with_vocab_size(0)).is_err());
        assert!(
            UnigramTrainer::new(UnigramTrainerOptions::default().with_max_piece_length(0)).is_err()
        );
        assert!(
            UnigramTrainer::new(UnigramTrainerOptions::default().with_num_iterations(0)).is_err()
        );
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let mut t = trainer(50);
        assert!(matches!(t.train(), Err(WordmillError::EmptyCorpus)));

        // Whitespace-only lines normalize to nothing.
        let mut t = trainer(50);
        t.add_text("   ");
        assert!(matches!(t.train(), Err(WordmillError::EmptyCorpus)));
    }

    #[test]
    fn test_one_byte_corpus() {
        let mut t = trainer(50);
        t.add_text("a");
        let size = t.train().unwrap();

        assert_eq!(size, 1);
        assert_eq!(t.final_vocab()[0].0, b"a");
    }

    #[test]
    fn test_single_bytes_survive_pruning() {
        let mut t = trainer(6);
        for _ in 0..50 {
            t.add_text("the cat");
        }
        t.train().unwrap();

        // Normalized "the▁cat" has 8 distinct bytes; all must survive even
        // though the target (6) is smaller.
        let singles = t
            .final_vocab()
            .iter()
            .filter(|(token, _)| token.len() == 1)
            .count();
        assert_eq!(singles, 8);
    }

    #[test]
    fn test_vocab_bounded_by_target_plus_bytes() {
        let mut t = trainer(12);
        for _ in 0..100 {
            t.add_text("the cat");
        }
        let size = t.train().unwrap();
        assert!(size <= 12.max(8));
    }

    #[test]
    fn test_segmentation_reconstructs() {
        let mut t = trainer(12);
        for _ in 0..100 {
            t.add_text("the cat");
        }
        t.train().unwrap();

        let pieces = t.segment("the cat");
        let joined: Vec<u8> = pieces.concat();
        assert_eq!(joined, normalizer::normalize("the cat").into_bytes());

        let lexicon: WmHashMap<Vec<u8>, f64> = t.final_vocab().iter().cloned().collect();
        for piece in pieces {
            assert!(lexicon.contains_key(&piece));
        }
    }

    #[test]
    fn test_scores_normalize() {
        let mut t = trainer(20);
        for _ in 0..30 {
            t.add_text("abc abd");
        }
        t.train().unwrap();

        // After re-scoring, the lexicon is a probability distribution.
        let sum: f64 = t.lexicon.values().map(|s| s.exp()).sum();
        assert!(sum <= 1.0 + 1e-6, "sum of probabilities {sum}");
    }

    #[test]
    fn test_deterministic() {
        let run = || {
            let mut t = trainer(10);
            for _ in 0..40 {
                t.add_text("low lower lowest");
                t.add_text("newer wider");
            }
            t.train().unwrap();
            t.final_vocab().to_vec()
        };
        assert_eq!(run(), run());
    }
}
