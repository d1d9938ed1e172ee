//! End-to-end unigram training scenarios.

use tempdir::TempDir;
use wordmill::WmHashMap;
use wordmill::normalizer;
use wordmill::unigram::{UnigramTrainer, UnigramTrainerOptions, read_vocab, viterbi_segment};

fn trainer(vocab_size: usize) -> UnigramTrainer {
    let options = UnigramTrainerOptions::default()
        .with_vocab_size(vocab_size)
        .with_num_iterations(5)
        .with_min_token_freq(2);
    UnigramTrainer::new(options).unwrap()
}

#[test]
fn small_corpus_trains_and_reconstructs() {
    let mut t = trainer(12);
    for _ in 0..100 {
        t.add_text("the cat");
    }
    let size = t.train().unwrap();
    assert!(size <= 12);

    // Every byte of the normalized corpus is in the final lexicon.
    let normalized = normalizer::normalize("the cat");
    let lexicon: WmHashMap<Vec<u8>, f64> = t.final_vocab().iter().cloned().collect();
    for &byte in normalized.as_bytes() {
        assert!(lexicon.contains_key([byte].as_slice()), "byte {byte} missing");
    }

    // Viterbi over the final lexicon reconstructs the input exactly, all
    // pieces drawn from the lexicon.
    let pieces = t.segment("the cat");
    assert_eq!(pieces.concat(), normalized.as_bytes());
    for piece in &pieces {
        assert!(lexicon.contains_key(piece));
    }
}

#[test]
fn single_byte_corpus_yields_one_token() {
    let mut t = trainer(50);
    t.add_text("a");

    assert_eq!(t.train().unwrap(), 1);
    assert_eq!(t.final_vocab().len(), 1);
    assert_eq!(t.final_vocab()[0].0, b"a");
}

#[test]
fn empty_corpus_is_fatal() {
    let mut t = trainer(50);
    assert!(t.train().is_err());
}

#[test]
fn blank_lines_are_skipped_not_fatal() {
    let dir = TempDir::new("wordmill_unigram_e2e").unwrap();
    let corpus_path = dir.path().join("corpus.txt");
    std::fs::write(&corpus_path, "low lower lowest\n\n   \nnewer wider\n").unwrap();

    let mut t = trainer(40);
    t.load_corpus(&corpus_path).unwrap();
    assert_eq!(t.num_texts(), 2);
    assert!(t.train().unwrap() > 0);
}

#[test]
fn vocab_file_roundtrips_within_tolerance() {
    let dir = TempDir::new("wordmill_unigram_e2e").unwrap();
    let vocab_path = dir.path().join("unigram.vocab");

    let mut t = trainer(30);
    for _ in 0..50 {
        t.add_text("low lower lowest");
        t.add_text("newer wider");
    }
    t.train().unwrap();
    t.save_vocab(&vocab_path).unwrap();

    let loaded = read_vocab(&vocab_path).unwrap();
    assert_eq!(loaded.len(), t.final_vocab().len());

    let trained: WmHashMap<Vec<u8>, f64> = t.final_vocab().iter().cloned().collect();
    for (token, score) in &loaded {
        let original = trained.get(token).expect("token survives the round trip");
        assert!((original - score).abs() < 1e-6);
    }

    // Scores arrive in descending order.
    assert!(loaded.windows(2).all(|w| w[0].1 >= w[1].1));
}

#[test]
fn model_meta_header() {
    let dir = TempDir::new("wordmill_unigram_e2e").unwrap();
    let model_path = dir.path().join("unigram.model");

    let mut t = trainer(20);
    for _ in 0..20 {
        t.add_text("abc abd");
    }
    let size = t.train().unwrap();
    t.save_model_meta(&model_path).unwrap();

    let header = std::fs::read_to_string(&model_path).unwrap();
    assert_eq!(header, format!("vocab_size={size}\nmodel_type=unigram\n"));
}

#[test]
fn loaded_vocab_segments_like_the_trainer() {
    let dir = TempDir::new("wordmill_unigram_e2e").unwrap();
    let vocab_path = dir.path().join("unigram.vocab");

    let mut t = trainer(16);
    for _ in 0..60 {
        t.add_text("banana bandana");
    }
    t.train().unwrap();
    t.save_vocab(&vocab_path).unwrap();

    let lexicon: WmHashMap<Vec<u8>, f64> = read_vocab(&vocab_path).unwrap().into_iter().collect();
    let normalized = normalizer::normalize("banana bandana");
    let pieces = viterbi_segment(normalized.as_bytes(), &lexicon, 16);

    assert_eq!(pieces.concat(), normalized.as_bytes());
    assert_eq!(pieces, t.segment("banana bandana"));
}

#[test]
fn training_is_deterministic_across_runs() {
    let run = || {
        let mut t = trainer(14);
        for _ in 0..50 {
            t.add_text("tokenization test");
            t.add_text("low lower lowest");
        }
        t.train().unwrap();
        t.final_vocab().to_vec()
    };
    assert_eq!(run(), run());
}
