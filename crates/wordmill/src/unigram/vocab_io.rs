//! # Unigram Vocab & Model IO
//!
//! The vocab file carries the trained lexicon, one `<token>\t<score>`
//! record per line sorted by score descending. Token bytes are written
//! raw; the normalizer folds away tabs and newlines, so corpus-derived
//! tokens never contain the separators. The model file is a two-line
//! metadata header; the vocabulary itself lives in the vocab file.

use crate::errors::{WmResult, WordmillError};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Write the vocab file, sorted by score descending.
pub fn write_vocab<P: AsRef<Path>>(
    path: P,
    entries: &[(Vec<u8>, f64)],
) -> WmResult<()> {
    let mut sorted: Vec<&(Vec<u8>, f64)> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(core::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut writer = BufWriter::new(File::create(path)?);
    for (token, score) in sorted {
        writer.write_all(token)?;
        writeln!(writer, "\t{score:.6}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a vocab file written by [`write_vocab`].
pub fn read_vocab<P: AsRef<Path>>(path: P) -> WmResult<Vec<(Vec<u8>, f64)>> {
    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;

    let mut entries = Vec::new();
    for (line_no, record) in bytes.split(|&b| b == b'\n').enumerate() {
        if record.is_empty() {
            continue;
        }
        let tab = record
            .iter()
            .rposition(|&b| b == b'\t')
            .ok_or_else(|| WordmillError::Parse(format!("vocab line {}: no tab", line_no + 1)))?;

        let token = record[..tab].to_vec();
        let score = std::str::from_utf8(&record[tab + 1..])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| {
                WordmillError::Parse(format!("vocab line {}: bad score", line_no + 1))
            })?;
        entries.push((token, score));
    }
    Ok(entries)
}

/// Write the model metadata header.
pub fn write_model_meta<P: AsRef<Path>>(
    path: P,
    vocab_size: usize,
) -> WmResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "vocab_size={vocab_size}")?;
    writeln!(writer, "model_type=unigram")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_vocab_roundtrip() {
        let dir = TempDir::new("wordmill_vocab_io").unwrap();
        let path = dir.path().join("unigram.vocab");

        let entries = vec![
            (b"the".to_vec(), -1.204_17),
            (b"a".to_vec(), -2.5),
            ("\u{2581}".as_bytes().to_vec(), -0.75),
        ];
        write_vocab(&path, &entries).unwrap();
        let loaded = read_vocab(&path).unwrap();

        assert_eq!(loaded.len(), entries.len());
        for (token, score) in &entries {
            let (_, loaded_score) = loaded
                .iter()
                .find(|(t, _)| t == token)
                .expect("token present");
            assert!((loaded_score - score).abs() < 1e-6);
        }
    }

    #[test]
    fn test_vocab_sorted_by_score_desc() {
        let dir = TempDir::new("wordmill_vocab_io").unwrap();
        let path = dir.path().join("unigram.vocab");

        let entries = vec![
            (b"low".to_vec(), -5.0),
            (b"high".to_vec(), -1.0),
            (b"mid".to_vec(), -3.0),
        ];
        write_vocab(&path, &entries).unwrap();

        let loaded = read_vocab(&path).unwrap();
        let scores: Vec<f64> = loaded.iter().map(|(_, s)| *s).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(loaded[0].0, b"high");
    }

    #[test]
    fn test_rejects_malformed_line() {
        let dir = TempDir::new("wordmill_vocab_io").unwrap();
        let path = dir.path().join("bad.vocab");
        std::fs::write(&path, b"token-without-tab\n").unwrap();

        assert!(matches!(read_vocab(&path), Err(WordmillError::Parse(_))));
    }

    #[test]
    fn test_model_meta() {
        let dir = TempDir::new("wordmill_vocab_io").unwrap();
        let path = dir.path().join("unigram.model");
        write_model_meta(&path, 42).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "vocab_size=42\nmodel_type=unigram\n");
    }
}
