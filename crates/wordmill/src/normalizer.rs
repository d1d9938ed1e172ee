//! # Text Normalization
//!
//! Lowercases ASCII letters and rewrites whitespace runs as a single
//! boundary marker, the pre-pass both training engines share.

/// The boundary marker `U+2581` inserted for each whitespace run.
pub const BOUNDARY_MARKER: &str = "\u{2581}";

/// The UTF-8 bytes of [`BOUNDARY_MARKER`].
pub const BOUNDARY_MARKER_BYTES: [u8; 3] = [0xE2, 0x96, 0x81];

/// Is `byte` one of the ASCII whitespace characters the normalizer folds?
///
/// Space, tab, newline, carriage return, vertical tab, form feed.
#[inline]
pub fn is_fold_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'\x0B' | b'\x0C')
}

/// Normalize `raw` into a fresh string.
///
/// * ASCII letters are lowercased.
/// * Each maximal run of ASCII whitespace becomes one [`BOUNDARY_MARKER`].
/// * A leading whitespace run produces nothing; a trailing marker is
///   stripped.
/// * Every other byte passes through unchanged.
///
/// The output is at most 3x the input length.
pub fn normalize(raw: &str) -> String {
    let mut out = String::new();
    normalize_into(raw, &mut out);
    out
}

/// Normalize `raw` into `out`, clearing it first.
///
/// Buffer-reusing variant of [`normalize`] for corpus loaders that
/// normalize line after line.
pub fn normalize_into(
    raw: &str,
    out: &mut String,
) {
    out.clear();
    out.reserve(raw.len());

    let mut prev_was_space = true;
    for ch in raw.chars() {
        if ch.is_ascii() && is_fold_whitespace(ch as u8) {
            if !prev_was_space {
                out.push_str(BOUNDARY_MARKER);
                prev_was_space = true;
            }
        } else {
            out.push(ch.to_ascii_lowercase());
            prev_was_space = false;
        }
    }

    if out.as_bytes().ends_with(&BOUNDARY_MARKER_BYTES) {
        out.truncate(out.len() - BOUNDARY_MARKER_BYTES.len());
    }
}
