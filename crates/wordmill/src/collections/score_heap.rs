//! # Token Score Heap
//!
//! Min-heap ranking unigram tokens by frequency, with a secondary hash
//! index carrying the authoritative frequency and a `removed` flag. Popping
//! skips entries whose recorded frequency no longer matches the index or
//! whose token has been removed, so updates never touch the heap in place.

use crate::types::WmHashMap;
use core::cmp::{Ordering, Reverse};
use dary_heap::OctonaryHeap;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScoreEntry {
    freq: u64,
    token: Vec<u8>,
}

impl ScoreEntry {
    /// Min-heap by frequency; tie-break on token bytes (deterministic).
    fn heap_key(&self) -> (u64, &[u8]) {
        (self.freq, &self.token)
    }
}

impl PartialOrd for ScoreEntry {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoreEntry {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.heap_key().cmp(&other.heap_key())
    }
}

#[derive(Debug, Clone, Copy)]
struct TokenState {
    freq: u64,
    removed: bool,
}

/// Min-heap of `(token, frequency)` entries with lazy invalidation.
#[derive(Debug, Default)]
pub struct TokenScoreHeap {
    heap: OctonaryHeap<Reverse<ScoreEntry>>,
    index: WmHashMap<Vec<u8>, TokenState>,
    active: usize,
}

impl TokenScoreHeap {
    /// Create an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a token at the given frequency.
    ///
    /// Re-pushing an existing token updates its authoritative frequency and
    /// clears any `removed` flag; the superseded heap entry becomes stale.
    pub fn push(
        &mut self,
        token: &[u8],
        freq: u64,
    ) {
        self.heap.push(Reverse(ScoreEntry {
            freq,
            token: token.to_vec(),
        }));

        match self.index.get_mut(token) {
            Some(state) => {
                if state.removed {
                    state.removed = false;
                    self.active += 1;
                }
                state.freq = freq;
            }
            None => {
                self.index.insert(
                    token.to_vec(),
                    TokenState {
                        freq,
                        removed: false,
                    },
                );
                self.active += 1;
            }
        }
    }

    /// Pop the active token with the lowest frequency.
    ///
    /// Stale entries (frequency mismatch or removed token) are discarded
    /// silently; the popped token is marked removed.
    pub fn pop(&mut self) -> Option<(Vec<u8>, u64)> {
        while let Some(Reverse(entry)) = self.heap.pop() {
            let Some(state) = self.index.get_mut(&entry.token) else {
                continue;
            };
            if state.removed || state.freq != entry.freq {
                continue;
            }
            state.removed = true;
            self.active -= 1;
            return Some((entry.token, entry.freq));
        }
        None
    }

    /// Flag a token as removed.
    ///
    /// Returns `false` if the token is unknown or already removed.
    pub fn remove(
        &mut self,
        token: &[u8],
    ) -> bool {
        match self.index.get_mut(token) {
            Some(state) if !state.removed => {
                state.removed = true;
                self.active -= 1;
                true
            }
            _ => false,
        }
    }

    /// Replace a token's frequency (remove + push).
    pub fn update_freq(
        &mut self,
        token: &[u8],
        freq: u64,
    ) {
        self.remove(token);
        self.push(token, freq);
    }

    /// Is the token present and active?
    pub fn contains(
        &self,
        token: &[u8],
    ) -> bool {
        self.index.get(token).is_some_and(|state| !state.removed)
    }

    /// The number of active tokens.
    pub fn len(&self) -> usize {
        self.active
    }

    /// Are there no active tokens?
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }
}
