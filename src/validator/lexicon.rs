use crate::alphabet::{is_valid_mask, WordCollection};
use crate::ALPHABET_SIZE;
use fnv::FnvHashSet;

/// Polynomial rolling hash (base 31) over the set bit positions. Positions
/// are offset by one so bit 0 still contributes.
#[inline(always)]
pub fn fingerprint_hash(mask: u32) -> u32 {
    let mut hash = 0u32;
    for i in 0..ALPHABET_SIZE {
        if mask & (1 << i) != 0 {
            hash = hash.wrapping_mul(31).wrapping_add(i as u32 + 1);
        }
    }
    hash
}

/// Low 32 bits: the presence mask. High 32 bits: sum of `(position + 1)^2`.
#[inline(always)]
pub fn fingerprint_signature(mask: u32) -> u64 {
    let mut weighted = 0u64;
    for i in 0..ALPHABET_SIZE {
        if mask & (1 << i) != 0 {
            weighted += (i as u64 + 1) * (i as u64 + 1);
        }
    }
    (mask & crate::FULL_MASK) as u64 | (weighted << 32)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexiconStats {
    pub word_count: usize,
    pub rejected: usize,
    pub unique_hashes: usize,
    pub unique_signatures: usize,
}

/// Fingerprint sets of the reference dictionary. Immutable once built;
/// share it between workers behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    hashes: FnvHashSet<u32>,
    signatures: FnvHashSet<u64>,
    word_count: usize,
    rejected: usize,
}

impl Lexicon {
    pub fn from_masks<I: IntoIterator<Item = u32>>(masks: I) -> Self {
        let mut lexicon = Self::default();
        for mask in masks {
            lexicon.word_count += 1;
            if !is_valid_mask(mask) {
                lexicon.rejected += 1;
                continue;
            }
            lexicon.hashes.insert(fingerprint_hash(mask));
            lexicon.signatures.insert(fingerprint_signature(mask));
        }
        lexicon
    }

    pub fn from_words(words: &WordCollection) -> Self {
        Self::from_masks(words.iter().map(|w| w.mask()))
    }

    /// Both fingerprints must be known.
    #[inline(always)]
    pub fn contains(&self, mask: u32) -> bool {
        is_valid_mask(mask)
            && self.hashes.contains(&fingerprint_hash(mask))
            && self.signatures.contains(&fingerprint_signature(mask))
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn stats(&self) -> LexiconStats {
        LexiconStats {
            word_count: self.word_count,
            rejected: self.rejected,
            unique_hashes: self.hashes.len(),
            unique_signatures: self.signatures.len(),
        }
    }
}
