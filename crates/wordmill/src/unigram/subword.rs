//! # Subword Extraction & Seed Vocabulary
//!
//! Enumerates candidate subwords and builds the over-sized seed lexicon
//! the unigram trainer prunes down. Multi-byte candidates are gathered
//! from a bounded text sample, re-counted across the full text set by
//! walking the candidate trie at every position, then thresholded and
//! capped; single-byte tokens are seeded unconditionally so every input
//! stays segmentable.

use crate::collections::{SubwordTrie, TokenScoreHeap};
use crate::types::{WmHashMap, WmHashSet};

/// Texts sampled for candidate enumeration.
const CANDIDATE_SAMPLE_TEXTS: usize = 10_000;

/// Yield every contiguous substring of `text` up to `max_len` bytes.
pub fn enumerate_substrings<'a>(
    text: &'a [u8],
    max_len: usize,
) -> impl Iterator<Item = &'a [u8]> {
    (0..text.len()).flat_map(move |start| {
        let end = (start + max_len).min(text.len());
        (start + 1..=end).map(move |stop| &text[start..stop])
    })
}

/// The seed lexicon and its side tables.
#[derive(Debug)]
pub struct SeedVocab {
    /// `token -> log(count)` scores.
    pub lexicon: WmHashMap<Vec<u8>, f64>,

    /// `token -> count` estimates.
    pub token_freqs: WmHashMap<Vec<u8>, u64>,

    /// Candidate trie mirroring the lexicon.
    pub trie: SubwordTrie,

    /// Min-heap of token frequencies mirroring the lexicon.
    pub heap: TokenScoreHeap,
}

/// Build the seed vocabulary from preprocessed texts.
///
/// ## Arguments
/// * `texts` - normalized sentences.
/// * `max_piece_len` - longest candidate, in bytes.
/// * `seed_size` - cap on kept multi-byte candidates.
/// * `min_token_freq` - candidates below this occurrence count are dropped.
pub fn build_seed_vocab(
    texts: &[Vec<u8>],
    max_piece_len: usize,
    seed_size: usize,
    min_token_freq: u64,
) -> SeedVocab {
    // Single-byte tokens come from the whole corpus.
    let mut byte_counts = [0u64; 256];
    for text in texts {
        for &byte in text {
            byte_counts[byte as usize] += 1;
        }
    }

    // Multi-byte candidates from a bounded sample.
    let mut candidates: WmHashSet<Vec<u8>> = WmHashSet::default();
    for text in texts.iter().take(CANDIDATE_SAMPLE_TEXTS) {
        for piece in enumerate_substrings(text, max_piece_len) {
            if piece.len() >= 2 {
                candidates.insert(piece.to_vec());
            }
        }
    }
    log::info!(
        "enumerated {} candidate subwords from {} sampled texts",
        candidates.len(),
        texts.len().min(CANDIDATE_SAMPLE_TEXTS)
    );

    // Re-count candidates across the full text set with one trie walk per
    // position.
    let mut trie = SubwordTrie::new();
    for candidate in &candidates {
        trie.insert(candidate, 0);
    }
    for text in texts {
        for start in 0..text.len() {
            let stop = (start + max_piece_len).min(text.len());
            trie.increment_matches(&text[start..stop], 1);
        }
    }

    // Threshold, then cap at seed_size by descending count.
    let mut counted: Vec<(Vec<u8>, u64)> = trie
        .collect_all()
        .into_iter()
        .filter(|(_, freq)| *freq >= min_token_freq.max(1))
        .collect();
    counted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counted.truncate(seed_size);

    let kept: WmHashSet<&[u8]> = counted.iter().map(|(token, _)| token.as_slice()).collect();
    for candidate in &candidates {
        if !kept.contains(candidate.as_slice()) {
            trie.remove(candidate);
        }
    }

    let mut seed = SeedVocab {
        lexicon: WmHashMap::with_capacity(counted.len() + 256),
        token_freqs: WmHashMap::with_capacity(counted.len() + 256),
        trie,
        heap: TokenScoreHeap::new(),
    };

    for byte in 0..=255u8 {
        let count = byte_counts[byte as usize];
        if count == 0 {
            continue;
        }
        let token = vec![byte];
        seed.lexicon.insert(token.clone(), (count as f64).ln());
        seed.token_freqs.insert(token.clone(), count);
        seed.trie.insert(&token, count);
        seed.heap.push(&token, count);
    }

    for (token, freq) in counted {
        seed.lexicon.insert(token.clone(), (freq as f64).ln());
        seed.heap.push(&token, freq);
        seed.token_freqs.insert(token, freq);
    }

    log::info!("seed vocabulary: {} tokens", seed.lexicon.len());
    seed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerate_substrings() {
        let pieces: Vec<&[u8]> = enumerate_substrings(b"abc", 2).collect();
        assert_eq!(
            pieces,
            vec![
                b"a".as_slice(),
                b"ab",
                b"b",
                b"bc",
                b"c",
            ]
        );
    }

    #[test]
    fn test_enumerate_respects_max_len() {
        assert!(enumerate_substrings(b"abcdef", 3).all(|p| p.len() <= 3));
        assert_eq!(enumerate_substrings(b"", 3).count(), 0);
    }

    fn texts(samples: &[&str]) -> Vec<Vec<u8>> {
        samples.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_seed_contains_all_bytes() {
        let seed = build_seed_vocab(&texts(&["abab", "cd"]), 4, 1000, 2);

        for byte in [b'a', b'b', b'c', b'd'] {
            assert!(seed.lexicon.contains_key([byte].as_slice()));
            assert!(seed.trie.contains(&[byte]));
        }
        assert!(!seed.lexicon.contains_key([b'x'].as_slice()));
    }

    #[test]
    fn test_seed_counts_occurrences() {
        let seed = build_seed_vocab(&texts(&["abab", "ab"]), 4, 1000, 2);

        // "ab" occurs three times across the corpus.
        assert_eq!(seed.token_freqs.get(b"ab".as_slice()).copied(), Some(3));
        assert_eq!(seed.trie.search(b"ab"), Some(3));
        let expected = (3f64).ln();
        let score = seed.lexicon[b"ab".as_slice()];
        assert!((score - expected).abs() < 1e-9);

        // "ba" occurs once, below the threshold of 2.
        assert!(!seed.lexicon.contains_key(b"ba".as_slice()));
        assert!(!seed.trie.contains(b"ba"));
    }

    #[test]
    fn test_seed_size_cap() {
        let seed = build_seed_vocab(&texts(&["abcd abcd abcd"]), 4, 2, 1);

        let multi = seed
            .lexicon
            .keys()
            .filter(|token| token.len() > 1)
            .count();
        assert_eq!(multi, 2);
    }

    #[test]
    fn test_heap_mirrors_lexicon() {
        let seed = build_seed_vocab(&texts(&["aa bb aa"]), 2, 1000, 2);
        assert_eq!(seed.heap.len(), seed.lexicon.len());
    }
}
