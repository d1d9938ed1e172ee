//! # LRU Cache
//!
//! Fixed-capacity `u64 -> i64` cache used to memoize per-sentence loss.
//! Arena-backed doubly-linked recency list plus a hash index; the arena
//! indices stand in for pointers, so eviction reuses slots in place.

use crate::types::WmHashMap;

const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct LruEntry {
    key: u64,
    value: i64,
    prev: usize,
    next: usize,
}

/// A least-recently-used cache with integer keys and values.
#[derive(Debug)]
pub struct LruCache {
    entries: Vec<LruEntry>,
    index: WmHashMap<u64, usize>,
    head: usize,
    tail: usize,
    capacity: usize,
}

impl LruCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// Capacity is fixed at construction; zero is rounded up to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity.min(1024)),
            index: WmHashMap::default(),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    /// Look up `key`, promoting it to most-recently-used on a hit.
    pub fn get(
        &mut self,
        key: u64,
    ) -> Option<i64> {
        let slot = *self.index.get(&key)?;
        self.detach(slot);
        self.attach_front(slot);
        Some(self.entries[slot].value)
    }

    /// Insert or update `key`.
    ///
    /// At capacity, the least-recently-used entry is dropped first.
    pub fn put(
        &mut self,
        key: u64,
        value: i64,
    ) {
        if let Some(&slot) = self.index.get(&key) {
            self.entries[slot].value = value;
            self.detach(slot);
            self.attach_front(slot);
            return;
        }

        let slot = if self.index.len() >= self.capacity {
            // Evict the tail and reuse its slot.
            let slot = self.tail;
            self.detach(slot);
            self.index.remove(&self.entries[slot].key);
            self.entries[slot].key = key;
            self.entries[slot].value = value;
            slot
        } else {
            self.entries.push(LruEntry {
                key,
                value,
                prev: NIL,
                next: NIL,
            });
            self.entries.len() - 1
        };

        self.index.insert(key, slot);
        self.attach_front(slot);
    }

    /// The number of cached entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Is the cache empty?
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn detach(
        &mut self,
        slot: usize,
    ) {
        let LruEntry { prev, next, .. } = self.entries[slot];
        if prev != NIL {
            self.entries[prev].next = next;
        } else if self.head == slot {
            self.head = next;
        }
        if next != NIL {
            self.entries[next].prev = prev;
        } else if self.tail == slot {
            self.tail = prev;
        }
        self.entries[slot].prev = NIL;
        self.entries[slot].next = NIL;
    }

    fn attach_front(
        &mut self,
        slot: usize,
    ) {
        self.entries[slot].prev = NIL;
        self.entries[slot].next = self.head;
        if self.head != NIL {
            self.entries[self.head].prev = slot;
        }
        self.head = slot;
        if self.tail == NIL {
            self.tail = slot;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_put() {
        let mut cache = LruCache::new(2);
        assert_eq!(cache.get(1), None);

        cache.put(1, 10);
        cache.put(2, 20);
        assert_eq!(cache.get(1), Some(10));
        assert_eq!(cache.get(2), Some(20));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_eviction_order() {
        let mut cache = LruCache::new(2);
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(3, 30);

        assert_eq!(cache.get(1), None);
        assert_eq!(cache.get(2), Some(20));
        assert_eq!(cache.get(3), Some(30));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_get_promotes() {
        let mut cache = LruCache::new(2);
        cache.put(1, 10);
        cache.put(2, 20);

        // Touch 1 so 2 becomes the eviction victim.
        assert_eq!(cache.get(1), Some(10));
        cache.put(3, 30);

        assert_eq!(cache.get(1), Some(10));
        assert_eq!(cache.get(2), None);
        assert_eq!(cache.get(3), Some(30));
    }

    #[test]
    fn test_update_existing_key() {
        let mut cache = LruCache::new(2);
        cache.put(1, 10);
        cache.put(1, 11);
        assert_eq!(cache.get(1), Some(11));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_one() {
        let mut cache = LruCache::new(1);
        cache.put(1, 10);
        cache.put(2, 20);
        assert_eq!(cache.get(1), None);
        assert_eq!(cache.get(2), Some(20));

        let zero = LruCache::new(0);
        assert_eq!(zero.capacity(), 1);
    }

    #[test]
    fn test_many_entries() {
        let mut cache = LruCache::new(64);
        for i in 0..200u64 {
            cache.put(i, i as i64);
        }
        assert_eq!(cache.len(), 64);
        for i in 0..136u64 {
            assert_eq!(cache.get(i), None);
        }
        for i in 136..200u64 {
            assert_eq!(cache.get(i), Some(i as i64));
        }
    }
}
