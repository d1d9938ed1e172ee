//! # Lazy Pair Heap
//!
//! Max-heap over pair-frequency entries stamped with the pair index version
//! they were pushed at. The heap never updates in place: when a pair's
//! frequency changes, the index bumps its version and the trainer pushes a
//! fresh entry, leaving the old one to be discarded as stale on pop.

use crate::types::Pair;
use core::cmp::Ordering;
use dary_heap::OctonaryHeap;

/// A pair candidate with the frequency and index version seen at push time.
#[derive(Debug, Clone, Copy, Eq)]
pub struct PairEntry {
    /// The candidate pair.
    pub pair: Pair,

    /// The pair's frequency when this entry was pushed.
    pub freq: u64,

    /// The pair's index version when this entry was pushed.
    ///
    /// An entry is stale iff this no longer matches the index; stale
    /// entries are skipped by the consumer, never surfaced.
    pub version: u32,
}

impl PairEntry {
    /// The heap key.
    ///
    /// Max-heap by frequency; tie-break on pair order (deterministic).
    fn heap_key(&self) -> (u64, Pair) {
        (self.freq, self.pair)
    }
}

impl PartialEq for PairEntry {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.heap_key() == other.heap_key()
    }
}

impl PartialOrd for PairEntry {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PairEntry {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.heap_key().cmp(&other.heap_key())
    }
}

/// Max-heap of [`PairEntry`] values.
#[derive(Debug, Default)]
pub struct LazyPairHeap {
    heap: OctonaryHeap<PairEntry>,
}

impl LazyPairHeap {
    /// Create an empty heap with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
        }
    }

    /// Push an entry.
    pub fn push(
        &mut self,
        pair: Pair,
        freq: u64,
        version: u32,
    ) {
        self.heap.push(PairEntry {
            pair,
            freq,
            version,
        });
    }

    /// Pop the entry with the highest frequency.
    pub fn pop(&mut self) -> Option<PairEntry> {
        self.heap.pop()
    }

    /// Peek at the entry with the highest frequency.
    pub fn peek(&self) -> Option<&PairEntry> {
        self.heap.peek()
    }

    /// Is the heap empty?
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The number of entries, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_order() {
        let mut heap = LazyPairHeap::with_capacity(4);
        heap.push((1, 2), 10, 0);
        heap.push((3, 4), 30, 0);
        heap.push((5, 6), 20, 0);

        assert_eq!(heap.peek().map(|e| e.pair), Some((3, 4)));
        assert_eq!(heap.pop().map(|e| e.freq), Some(30));
        assert_eq!(heap.pop().map(|e| e.freq), Some(20));
        assert_eq!(heap.pop().map(|e| e.freq), Some(10));
        assert!(heap.pop().is_none());
        assert!(heap.is_empty());
    }

    #[test]
    fn test_tie_break_on_pair() {
        let mut heap = LazyPairHeap::default();
        heap.push((1, 9), 5, 0);
        heap.push((2, 0), 5, 0);

        // Equal frequencies pop in descending pair order.
        assert_eq!(heap.pop().map(|e| e.pair), Some((2, 0)));
        assert_eq!(heap.pop().map(|e| e.pair), Some((1, 9)));
    }

    #[test]
    fn test_version_is_carried() {
        let mut heap = LazyPairHeap::default();
        heap.push((1, 2), 5, 7);
        let entry = heap.pop().unwrap();
        assert_eq!(entry.version, 7);
    }

    #[test]
    fn test_clear() {
        let mut heap = LazyPairHeap::default();
        heap.push((1, 2), 5, 0);
        assert_eq!(heap.len(), 1);
        heap.clear();
        assert!(heap.is_empty());
    }
}
