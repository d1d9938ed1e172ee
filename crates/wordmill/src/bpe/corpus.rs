//! # BPE Corpus
//!
//! Word counting and lattice construction for the BPE trainer. Lines are
//! normalized and split into words at the boundary marker; each unique word
//! becomes one [`SymbolLattice`] weighted by its occurrence count.

use crate::bpe::lattice::SymbolLattice;
use crate::normalizer;
use crate::types::{TokenId, WmHashMap};
use compact_str::CompactString;

/// Word counter and lattice store for one training run.
#[derive(Debug)]
pub struct BpeCorpus {
    word_counts: WmHashMap<CompactString, u64>,

    /// One lattice per unique word, parallel to `counts`.
    pub words: Vec<SymbolLattice>,

    /// `counts[i]` is the corpus count of `words[i]`.
    pub counts: Vec<u64>,

    /// Bytes retained by character coverage; the rest map to `unk_id`.
    pub keep_set: [bool; 256],
}

impl Default for BpeCorpus {
    fn default() -> Self {
        Self::new()
    }
}

impl BpeCorpus {
    /// Create an empty corpus.
    pub fn new() -> Self {
        Self {
            word_counts: WmHashMap::with_capacity(100_000),
            words: Vec::new(),
            counts: Vec::new(),
            keep_set: [false; 256],
        }
    }

    /// Count the words of one raw corpus line.
    ///
    /// The line is normalized (lowercased, whitespace folded to the
    /// boundary marker) and split at the marker, so words never contain
    /// whitespace or marker bytes.
    pub fn update_from_text(
        &mut self,
        line: &str,
        buf: &mut String,
    ) {
        normalizer::normalize_into(line, buf);
        for word in buf.split(normalizer::BOUNDARY_MARKER) {
            if word.is_empty() {
                continue;
            }
            *self.word_counts.entry(word.into()).or_default() += 1;
        }
    }

    /// Update word counts from a sample iterator.
    pub fn update_from_samples<I>(
        &mut self,
        samples: I,
    ) where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut buf = String::new();
        for sample in samples {
            self.update_from_text(sample.as_ref(), &mut buf);
        }
    }

    /// The number of unique words counted so far.
    pub fn unique_words(&self) -> usize {
        self.word_counts.len()
    }

    /// Derive the keep-set and build one lattice per unique word.
    ///
    /// The byte histogram is weighted by word counts; the keep-set retains
    /// the top `ceil(unique_bytes * coverage)` bytes by (count desc, byte
    /// asc). Coverage `1.0` keeps every observed byte. Words are
    /// materialized in lexicographic order so runs are reproducible.
    pub fn build_lattices(
        &mut self,
        character_coverage: f64,
        unk_id: TokenId,
    ) {
        let mut histogram = [0u64; 256];
        for (word, &count) in self.word_counts.iter() {
            for &byte in word.as_bytes() {
                histogram[byte as usize] += count;
            }
        }

        let mut observed: Vec<u8> = (0u16..256)
            .map(|b| b as u8)
            .filter(|&b| histogram[b as usize] > 0)
            .collect();
        observed.sort_by_key(|&b| (core::cmp::Reverse(histogram[b as usize]), b));

        let keep = if character_coverage >= 1.0 {
            observed.len()
        } else {
            (observed.len() as f64 * character_coverage).ceil() as usize
        };

        self.keep_set = [false; 256];
        for &byte in observed.iter().take(keep) {
            self.keep_set[byte as usize] = true;
        }
        log::debug!(
            "byte histogram: {} unique bytes, keeping {}",
            observed.len(),
            keep
        );

        let mut entries: Vec<(&CompactString, u64)> = self
            .word_counts
            .iter()
            .map(|(word, &count)| (word, count))
            .collect();
        entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        self.words = Vec::with_capacity(entries.len());
        self.counts = Vec::with_capacity(entries.len());
        for (word, count) in entries {
            self.words.push(SymbolLattice::from_bytes(
                word.as_bytes(),
                &self.keep_set,
                unk_id,
            ));
            self.counts.push(count);
        }
    }
}
