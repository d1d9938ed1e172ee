//! # Pair-Frequency Index
//!
//! The authoritative `(left, right) -> {freq, version}` map behind the BPE
//! merge heap. Every actual frequency change bumps the pair's version, so a
//! heap entry stamped with an older version identifies itself as stale.

use crate::types::{Pair, WmHashMap, pack_pair};

/// A pair's current frequency and invalidation counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairStats {
    /// Occurrences of the pair across all words, weighted by word count.
    pub freq: u64,

    /// Bumped on every frequency change.
    pub version: u32,
}

/// Frequency/version index over packed token pairs.
#[derive(Debug, Default)]
pub struct PairFreqIndex {
    map: WmHashMap<u64, PairStats>,
}

impl PairFreqIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a pair's stats; missing pairs read as `{freq: 0, version: 0}`.
    pub fn stats(
        &self,
        pair: Pair,
    ) -> PairStats {
        self.map.get(&pack_pair(pair)).copied().unwrap_or_default()
    }

    /// Add `delta` occurrences to a pair.
    pub fn add(
        &mut self,
        pair: Pair,
        delta: u64,
    ) {
        if delta == 0 {
            return;
        }
        let stats = self.map.entry(pack_pair(pair)).or_default();
        stats.freq += delta;
        stats.version += 1;
    }

    /// Apply a signed delta, clamping the frequency at zero on underflow.
    pub fn apply_delta(
        &mut self,
        pair: Pair,
        delta: i64,
    ) {
        if delta == 0 {
            return;
        }
        let stats = self.map.entry(pack_pair(pair)).or_default();
        let next = if delta < 0 {
            stats.freq.saturating_sub(delta.unsigned_abs())
        } else {
            stats.freq + delta as u64
        };
        if next != stats.freq {
            stats.freq = next;
            stats.version += 1;
        }
    }

    /// Overwrite a pair's frequency with an authoritative recount.
    ///
    /// The version is bumped only when the value actually changes.
    pub fn set_freq(
        &mut self,
        pair: Pair,
        freq: u64,
    ) {
        let stats = self.map.entry(pack_pair(pair)).or_default();
        if stats.freq != freq {
            stats.freq = freq;
            stats.version += 1;
        }
    }

    /// Zero a pair's frequency (used for the just-merged pair).
    pub fn zero(
        &mut self,
        pair: Pair,
    ) {
        self.set_freq(pair, 0);
    }

    /// The number of pairs ever touched.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Is the index empty?
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate all `(pair, stats)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, PairStats)> + '_ {
        self.map
            .iter()
            .map(|(&key, &stats)| (crate::types::unpack_pair(key), stats))
    }
}
