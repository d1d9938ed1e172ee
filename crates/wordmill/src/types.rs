//! # Common Types

/// A token identifier.
///
/// IDs `0..=255` denote the single-byte tokens. During BPE training the
/// `m`th merge allocates `256 + m`. Negative values are reserved for the
/// configurable `unk` sentinel (default `-1`, meaning "none").
pub type TokenId = i32;

/// A pair of adjacent tokens.
pub type Pair = (TokenId, TokenId);

/// Type alias for hash maps in this crate.
pub type WmHashMap<K, V> = ahash::AHashMap<K, V>;

/// Type alias for hash sets in this crate.
pub type WmHashSet<V> = ahash::AHashSet<V>;

/// Pack a [`Pair`] into the 64-bit key `(left << 32) | right`.
#[inline]
pub fn pack_pair(pair: Pair) -> u64 {
    ((pair.0 as u32 as u64) << 32) | (pair.1 as u32 as u64)
}

/// Unpack a 64-bit key produced by [`pack_pair`].
#[inline]
pub fn unpack_pair(key: u64) -> Pair {
    ((key >> 32) as u32 as TokenId, key as u32 as TokenId)
}
