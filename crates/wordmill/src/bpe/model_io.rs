//! # BPE Model & Vocab IO
//!
//! The model file is the merge table: little-endian `i32` triples
//! `left, right, new` per merge, in creation order. The vocab file is one
//! record per token id ascending, raw token bytes, a space, and the token's
//! post-training corpus frequency.

use crate::errors::{WmResult, WordmillError};
use crate::types::{Pair, TokenId};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::trainer::BYTE_TOKENS;

/// Expand the merge table into token byte strings.
///
/// Index `i` holds the bytes token `i` decodes to: ids `0..=255` are the
/// single bytes, each merge concatenates its two operands.
pub fn expand_merge_tokens(merge_ops: &[Pair]) -> Vec<Vec<u8>> {
    let mut tokens: Vec<Vec<u8>> = Vec::with_capacity(BYTE_TOKENS + merge_ops.len());
    for byte in 0..BYTE_TOKENS {
        tokens.push(vec![byte as u8]);
    }
    for &(left, right) in merge_ops {
        let mut token = tokens[left as usize].clone();
        token.extend_from_slice(&tokens[right as usize]);
        tokens.push(token);
    }
    tokens
}

/// Apply a merge table to a byte sequence, replaying merges in order.
///
/// Returns the resulting token ids. Replaying the full table over any
/// training word reproduces the trained segmentation.
pub fn apply_merges(
    bytes: &[u8],
    merge_ops: &[Pair],
) -> Vec<TokenId> {
    let mut ids: Vec<TokenId> = bytes.iter().map(|&b| b as TokenId).collect();
    for (m, &(left, right)) in merge_ops.iter().enumerate() {
        let new_id = (BYTE_TOKENS + m) as TokenId;
        let mut out = Vec::with_capacity(ids.len());
        let mut i = 0;
        while i < ids.len() {
            if i + 1 < ids.len() && ids[i] == left && ids[i + 1] == right {
                out.push(new_id);
                i += 2;
            } else {
                out.push(ids[i]);
                i += 1;
            }
        }
        ids = out;
    }
    ids
}

/// Write the vocab file: `<token bytes><space><freq>\n` per id ascending.
pub fn write_vocab<P: AsRef<Path>>(
    path: P,
    tokens: &[Vec<u8>],
    freqs: &[u64],
) -> WmResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for (token, freq) in tokens.iter().zip(freqs) {
        writer.write_all(token)?;
        writeln!(writer, " {freq}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the merge table as little-endian `i32` triples.
pub fn write_merge_table<P: AsRef<Path>>(
    path: P,
    merge_ops: &[Pair],
) -> WmResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for (m, &(left, right)) in merge_ops.iter().enumerate() {
        let new_id = (BYTE_TOKENS + m) as i32;
        writer.write_all(&left.to_le_bytes())?;
        writer.write_all(&right.to_le_bytes())?;
        writer.write_all(&new_id.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a merge table written by [`write_merge_table`].
///
/// ## Errors
/// [`WordmillError::Parse`] when the file length is not a whole number of
/// records or the recorded new-ids are out of sequence.
pub fn read_merge_table<P: AsRef<Path>>(path: P) -> WmResult<Vec<Pair>> {
    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;

    if bytes.len() % 12 != 0 {
        return Err(WordmillError::Parse(format!(
            "merge table length {} is not a multiple of 12",
            bytes.len()
        )));
    }

    let mut merge_ops = Vec::with_capacity(bytes.len() / 12);
    for (m, record) in bytes.chunks_exact(12).enumerate() {
        let left = i32::from_le_bytes(record[0..4].try_into().unwrap());
        let right = i32::from_le_bytes(record[4..8].try_into().unwrap());
        let new_id = i32::from_le_bytes(record[8..12].try_into().unwrap());

        let expected = (BYTE_TOKENS + m) as i32;
        if new_id != expected {
            return Err(WordmillError::Parse(format!(
                "merge record {m}: new id {new_id}, expected {expected}"
            )));
        }
        if !(0..expected).contains(&left) || !(0..expected).contains(&right) {
            return Err(WordmillError::Parse(format!(
                "merge record {m}: operands ({left}, {right}) out of range"
            )));
        }
        merge_ops.push((left, right));
    }
    Ok(merge_ops)
}
