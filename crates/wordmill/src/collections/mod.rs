//! # Support Structures
//!
//! The shared containers behind both training engines: the lazily
//! invalidated heaps, the subword trie, and the loss cache.

mod lazy_heap;
mod lru_cache;
mod score_heap;
mod trie;

#[doc(inline)]
pub use lazy_heap::{LazyPairHeap, PairEntry};
#[doc(inline)]
pub use lru_cache::LruCache;
#[doc(inline)]
pub use score_heap::TokenScoreHeap;
#[doc(inline)]
pub use trie::SubwordTrie;
