use cipherforge::alphabet::{Alphabet, WordCollection};
use cipherforge::validator::{
    compute_score, fingerprint_hash, fingerprint_signature, match_percentage, DictionaryValidator,
    Lexicon,
};
use rstest::rstest;
use std::sync::Arc;

fn validator(words: &[&str], threshold: f64) -> (DictionaryValidator, Alphabet) {
    let alpha = Alphabet::source();
    let dict = WordCollection::from_lines(words.iter().copied(), &alpha);
    let lexicon = Arc::new(Lexicon::from_words(&dict));
    (DictionaryValidator::new(lexicon, threshold), alpha)
}

#[rstest]
#[case(0, 0, 0.0)]
#[case(0, 5, 0.0)]
#[case(1, 1, 100.0 + 2.0f64.log10() * 5.0 - 18.0)]
#[case(5, 10, 50.0 + 6.0f64.log10() * 5.0)]
#[case(10, 10, 100.0)]
#[case(3, 20, 15.0 + 4.0f64.log10() * 5.0)]
fn score_formula(#[case] matched: usize, #[case] total: usize, #[case] expected: f64) {
    let score = compute_score(matched, total);
    assert!(
        (score - expected).abs() < 1e-9,
        "{}/{} scored {}, expected {}",
        matched,
        total,
        score,
        expected
    );
    assert!((0.0..=100.0).contains(&score));
}

#[test]
fn short_corpus_penalty_cannot_go_negative() {
    // 0 of 1: percentage 0, bonus 0, penalty 18
    assert_eq!(compute_score(0, 1), 0.0);
}

#[test]
fn percentage_handles_empty_batches() {
    assert_eq!(match_percentage(0, 0), 0.0);
    assert_eq!(match_percentage(1, 4), 25.0);
}

#[test]
fn dictionary_words_match_and_others_do_not() {
    let (v, alpha) = validator(&["daiin", "chol", "shey"], 10.0);
    let batch = vec![
        alpha.encode("daiin"),
        alpha.encode("chol"),
        alpha.encode("otedy"),
        alpha.encode("nida"), // same letter set as daiin
    ];
    let result = v.validate(&batch);
    assert_eq!(result.total_words, 4);
    assert_eq!(result.matched_words, 3);
    assert_eq!(result.match_percentage, 75.0);
}

#[test]
fn single_bit_perturbation_breaks_the_match() {
    let (v, alpha) = validator(&["shedy"], 0.0);
    let mask = alpha.encode("shedy");
    assert_eq!(v.validate(&[mask]).matched_words, 1);

    for bit in 0..27 {
        let flipped = mask ^ (1 << bit);
        if flipped == 0 {
            continue;
        }
        assert_eq!(v.validate(&[flipped]).matched_words, 0, "bit {}", bit);
    }
}

#[test]
fn invalid_masks_count_towards_the_total() {
    let (v, alpha) = validator(&["ok"], 0.0);
    let result = v.validate(&[alpha.encode("ok"), 0, 1 << 30]);
    assert_eq!(result.total_words, 3);
    assert_eq!(result.matched_words, 1);
}

#[test]
fn high_score_requires_strictly_exceeding_threshold() {
    let (v, alpha) = validator(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"], 100.0);
    let batch: Vec<u32> = "abcdefghij"
        .chars()
        .map(|c| alpha.encode(&c.to_string()))
        .collect();

    let result = v.validate(&batch);
    assert_eq!(result.score, 100.0);
    assert!(!result.is_high_score);

    let (lower, _) = validator(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"], 99.9);
    assert!(lower.validate(&batch).is_high_score);
}

#[test]
fn lexicon_rejects_unusable_words() {
    let lexicon = Lexicon::from_masks([0b1, 0, 1 << 28, 0b1]);
    let stats = lexicon.stats();
    assert_eq!(stats.word_count, 4);
    assert_eq!(stats.rejected, 2);
    assert_eq!(stats.unique_hashes, 1);
    assert_eq!(stats.unique_signatures, 1);
    assert!(!lexicon.contains(0));
}

#[test]
fn empty_lexicon_matches_nothing() {
    let lexicon = Lexicon::from_masks(Vec::new());
    assert!(lexicon.is_empty());
    assert!(!lexicon.contains(0b1));
}

#[test]
fn fingerprints_are_position_sensitive() {
    // {a, d} vs {b, c}: positions 1+4 vs 2+3
    let ad = 0b1001;
    let bc = 0b0110;
    assert_ne!(fingerprint_signature(ad), fingerprint_signature(bc));
    assert_ne!(fingerprint_hash(ad), fingerprint_hash(bc));
    assert_eq!(fingerprint_signature(ad) & 0xFFFF_FFFF, ad as u64);
    assert_eq!(fingerprint_signature(ad) >> 32, 1 + 16);
}

#[test]
fn hash_is_base_31_over_positions() {
    // bits 0 and 2 -> positions 1 and 3
    assert_eq!(fingerprint_hash(0b101), 31 + 3);
    assert_eq!(fingerprint_hash(0), 0);
}
