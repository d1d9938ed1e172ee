//! # Viterbi Segmenter
//!
//! Maximum-score segmentation of a byte string against a scored lexicon.

use crate::types::WmHashMap;

const NO_PARENT: usize = usize::MAX;

/// Segment `text` into the highest-scoring piece sequence.
///
/// `dp[i]` is the best total score over segmentations of the first `i`
/// bytes; each piece must be in `lexicon` and at most `max_piece_len`
/// bytes. Ties prefer the longest piece. If no position reaches the end,
/// the fallback is one piece per byte. The concatenation of the returned
/// pieces always equals `text`.
pub fn viterbi_segment(
    text: &[u8],
    lexicon: &WmHashMap<Vec<u8>, f64>,
    max_piece_len: usize,
) -> Vec<Vec<u8>> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }

    let mut dp = vec![f64::NEG_INFINITY; n + 1];
    let mut parent = vec![NO_PARENT; n + 1];
    dp[0] = 0.0;

    for end in 1..=n {
        let min_start = end.saturating_sub(max_piece_len);
        for start in min_start..end {
            if dp[start] == f64::NEG_INFINITY {
                continue;
            }
            let Some(&score) = lexicon.get(&text[start..end]) else {
                continue;
            };
            let candidate = dp[start] + score;
            // Strict improvement keeps the smallest start on ties, which
            // is the longest piece.
            if candidate > dp[end] {
                dp[end] = candidate;
                parent[end] = start;
            }
        }
    }

    if parent[n] == NO_PARENT {
        // No valid segmentation; fall back to one piece per byte.
        return text.iter().map(|&b| vec![b]).collect();
    }

    let mut bounds = Vec::new();
    let mut pos = n;
    while pos > 0 {
        bounds.push(pos);
        pos = parent[pos];
    }
    bounds.reverse();

    let mut pieces = Vec::with_capacity(bounds.len());
    let mut start = 0;
    for end in bounds {
        pieces.push(text[start..end].to_vec());
        start = end;
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon(entries: &[(&[u8], f64)]) -> WmHashMap<Vec<u8>, f64> {
        entries
            .iter()
            .map(|&(token, score)| (token.to_vec(), score))
            .collect()
    }

    #[test]
    fn test_empty_text() {
        let lex = lexicon(&[(b"a", -1.0)]);
        assert!(viterbi_segment(b"", &lex, 8).is_empty());
    }

    #[test]
    fn test_prefers_high_score_path() {
        let lex = lexicon(&[
            (b"a", -3.0),
            (b"b", -3.0),
            (b"ab", -1.0),
        ]);
        assert_eq!(viterbi_segment(b"ab", &lex, 8), vec![b"ab".to_vec()]);
    }

    #[test]
    fn test_ties_prefer_longest_piece() {
        // "ab" as one piece scores the same as "a"+"b" minus... equal here:
        // dp: "ab" = -2.0 vs "a"+"b" = -2.0; the longer piece must win.
        let lex = lexicon(&[
            (b"a", -1.0),
            (b"b", -1.0),
            (b"ab", -2.0),
        ]);
        assert_eq!(viterbi_segment(b"ab", &lex, 8), vec![b"ab".to_vec()]);
    }

    #[test]
    fn test_max_piece_len_bound() {
        let lex = lexicon(&[
            (b"a", -1.0),
            (b"b", -1.0),
            (b"ab", 0.0),
        ]);
        // With pieces capped at one byte, "ab" is unusable.
        assert_eq!(
            viterbi_segment(b"ab", &lex, 1),
            vec![b"a".to_vec(), b"b".to_vec()]
        );
    }

    #[test]
    fn test_fallback_per_byte() {
        let lex = lexicon(&[(b"a", -1.0)]);
        assert_eq!(
            viterbi_segment(b"axe", &lex, 8),
            vec![b"a".to_vec(), b"x".to_vec(), b"e".to_vec()]
        );
    }

    #[test]
    fn test_reconstruction_is_exact() {
        let lex = lexicon(&[
            (b"t", -4.0),
            (b"h", -4.0),
            (b"e", -4.0),
            (b"th", -2.5),
            (b"the", -1.5),
        ]);
        let text = b"thethe";
        let pieces = viterbi_segment(text, &lex, 16);
        let joined: Vec<u8> = pieces.concat();
        assert_eq!(joined, text);
        assert_eq!(pieces, vec![b"the".to_vec(), b"the".to_vec()]);
    }

    #[test]
    fn test_splits_inside_multibyte_sequences() {
        // The boundary marker is three bytes; a lexicon of single bytes
        // must still segment it.
        let marker = "\u{2581}".as_bytes();
        let lex = lexicon(&[
            (&marker[0..1], -1.0),
            (&marker[1..2], -1.0),
            (&marker[2..3], -1.0),
        ]);
        let pieces = viterbi_segment(marker, &lex, 16);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces.concat(), marker);
    }
}
