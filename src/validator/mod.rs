// ===== cipherforge/src/validator/mod.rs =====
pub mod lexicon;

pub use self::lexicon::{fingerprint_hash, fingerprint_signature, Lexicon, LexiconStats};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub total_words: usize,
    pub matched_words: usize,
    pub match_percentage: f64,
    pub score: f64,
    pub is_high_score: bool,
}

pub fn match_percentage(matched: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64 * 100.0
    }
}

/// Match percentage plus `log10(matched + 1) * 5`, minus `2` per word short
/// of ten, clamped to `[0, 100]`.
pub fn compute_score(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let match_bonus = (matched as f64 + 1.0).log10() * 5.0;
    let length_penalty = if total < 10 {
        (10 - total) as f64 * 2.0
    } else {
        0.0
    };
    (match_percentage(matched, total) + match_bonus - length_penalty).clamp(0.0, 100.0)
}

/// Scores translated batches against a shared [`Lexicon`].
#[derive(Debug, Clone)]
pub struct DictionaryValidator {
    lexicon: Arc<Lexicon>,
    threshold: f64,
}

impl DictionaryValidator {
    pub fn new(lexicon: Arc<Lexicon>, threshold: f64) -> Self {
        Self { lexicon, threshold }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Every entry of `translated` counts towards the total; invalid masks
    /// simply never match.
    pub fn validate(&self, translated: &[u32]) -> ValidationResult {
        let total = translated.len();
        let matched = translated
            .iter()
            .filter(|&&m| self.lexicon.contains(m))
            .count();

        let score = compute_score(matched, total);
        ValidationResult {
            total_words: total,
            matched_words: matched,
            match_percentage: match_percentage(matched, total),
            score,
            is_high_score: score > self.threshold,
        }
    }
}
