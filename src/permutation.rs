// ===== cipherforge/src/permutation.rs =====
//! Ordinal <-> permutation conversion via the factorial number system.
//!
//! Positions are filled from index 0 upward, so ordinals enumerate
//! permutations in lexicographic order and ordinal 0 is the identity.
//! Stepping an ordinal by one is therefore the same as [`next_permutation`].

use crate::ALPHABET_SIZE;

/// Size of the searchable ordinal space. Every ordinal in
/// `[0, TOTAL_PERMUTATIONS)` identifies one permutation. Exact value, do not
/// replace with a float or a recomputed factorial.
pub const TOTAL_PERMUTATIONS: u64 = 10_888_869_450_418_352_160;

pub type Permutation = [u8; ALPHABET_SIZE];

/// `n!` computed iteratively; `None` once the value no longer fits in 64 bits
/// (n > 20).
pub fn factorial(n: u32) -> Option<u64> {
    (2..=n as u64).try_fold(1u64, |acc, i| acc.checked_mul(i))
}

/// Converts an ordinal into a permutation of `0..27`.
///
/// Digits whose weight `(26 - p)!` exceeds 64 bits are always zero for any
/// 64-bit ordinal, so those positions take the smallest remaining index.
/// The choice is clamped to the remaining pool; that only triggers for
/// ordinals outside the search space.
pub fn ordinal_to_permutation(ordinal: u64) -> Permutation {
    let mut available: Vec<u8> = (0..ALPHABET_SIZE as u8).collect();
    let mut result = [0u8; ALPHABET_SIZE];
    let mut remaining = ordinal;

    for (position, slot) in result.iter_mut().enumerate() {
        let weight = factorial((ALPHABET_SIZE - 1 - position) as u32);
        let choice = match weight {
            Some(f) => {
                let c = (remaining / f) as usize;
                remaining %= f;
                c.min(available.len() - 1)
            }
            None => 0,
        };
        *slot = available.remove(choice);
    }

    result
}

/// Inverse of [`ordinal_to_permutation`]. Returns `None` if `perm` is not a
/// permutation of `0..27` or if its ordinal falls outside the search space.
pub fn permutation_to_ordinal(perm: &Permutation) -> Option<u64> {
    if !is_permutation(perm) {
        return None;
    }

    let mut used = 0u32;
    let mut ordinal: u64 = 0;

    for (position, &value) in perm.iter().enumerate() {
        // Lehmer digit: unused values smaller than this one
        let smaller_used = (used & ((1u32 << value) - 1)).count_ones();
        let digit = value as u64 - smaller_used as u64;
        used |= 1 << value;

        if digit == 0 {
            continue;
        }
        let weight = factorial((ALPHABET_SIZE - 1 - position) as u32)?;
        ordinal = ordinal.checked_add(digit.checked_mul(weight)?)?;
    }

    (ordinal < TOTAL_PERMUTATIONS).then_some(ordinal)
}

pub fn is_permutation(perm: &Permutation) -> bool {
    let mut seen = 0u32;
    for &v in perm {
        if v as usize >= ALPHABET_SIZE || seen & (1 << v) != 0 {
            return false;
        }
        seen |= 1 << v;
    }
    true
}

/// Advances `perm` to its lexicographic successor in place. Returns `false`
/// (leaving `perm` untouched) when it is already the last permutation.
pub fn next_permutation(perm: &mut Permutation) -> bool {
    let n = perm.len();
    let mut i = n - 1;
    while i > 0 && perm[i - 1] >= perm[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }

    let mut j = n - 1;
    while perm[j] <= perm[i - 1] {
        j -= 1;
    }
    perm.swap(i - 1, j);
    perm[i..].reverse();
    true
}
