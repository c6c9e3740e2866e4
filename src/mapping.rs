// ===== cipherforge/src/mapping.rs =====
use crate::alphabet::Alphabet;
use crate::ALPHABET_SIZE;

/// A 27x27 boolean relation from source symbols to target symbols.
///
/// Row `i` is stored as a bitmask: bit `j` of `rows[i]` is `M[i][j]`.
/// Mappings produced from permutations are bijections, but the matrix
/// allows any relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mapping {
    rows: [u32; ALPHABET_SIZE],
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity() -> Self {
        let mut m = Self::new();
        for i in 0..ALPHABET_SIZE {
            m.set_mapping(i, i);
        }
        m
    }

    /// Row `i` maps to `permutation[i]`.
    pub fn from_permutation(permutation: &[u8; ALPHABET_SIZE]) -> Self {
        let mut rows = [0u32; ALPHABET_SIZE];
        for (row, &target) in rows.iter_mut().zip(permutation.iter()) {
            *row = 1 << target;
        }
        Self { rows }
    }

    /// Out-of-range indices are ignored.
    pub fn set_mapping(&mut self, source: usize, target: usize) {
        if source < ALPHABET_SIZE && target < ALPHABET_SIZE {
            self.rows[source] |= 1 << target;
        }
    }

    pub fn get(&self, source: usize, target: usize) -> bool {
        source < ALPHABET_SIZE && target < ALPHABET_SIZE && self.rows[source] & (1 << target) != 0
    }

    pub fn rows(&self) -> &[u32; ALPHABET_SIZE] {
        &self.rows
    }

    /// Transposed view: bit `i` of `columns()[j]` is `M[i][j]`.
    pub fn columns(&self) -> [u32; ALPHABET_SIZE] {
        let mut cols = [0u32; ALPHABET_SIZE];
        for (i, &row) in self.rows.iter().enumerate() {
            let mut bits = row;
            while bits != 0 {
                let j = bits.trailing_zeros() as usize;
                cols[j] |= 1 << i;
                bits &= bits - 1;
            }
        }
        cols
    }

    /// Boolean vector-matrix product: `out[j] = OR_i (input[i] AND M[i][j])`.
    #[inline(always)]
    pub fn apply(&self, input: u32) -> u32 {
        let mut out = 0;
        let mut bits = input & crate::FULL_MASK;
        while bits != 0 {
            let i = bits.trailing_zeros() as usize;
            out |= self.rows[i];
            bits &= bits - 1;
        }
        out
    }

    /// Same product over an explicit 0/1 vector.
    pub fn apply_vector(&self, input: &[u8; ALPHABET_SIZE]) -> [u8; ALPHABET_SIZE] {
        let mask = input
            .iter()
            .enumerate()
            .filter(|(_, b)| **b != 0)
            .fold(0u32, |m, (i, _)| m | (1 << i));
        let out = self.apply(mask);
        let mut result = [0u8; ALPHABET_SIZE];
        for (j, slot) in result.iter_mut().enumerate() {
            *slot = ((out >> j) & 1) as u8;
        }
        result
    }

    /// True when every row and every column has exactly one set bit.
    pub fn is_bijection(&self) -> bool {
        self.rows.iter().all(|r| r.count_ones() == 1)
            && self.columns().iter().all(|c| c.count_ones() == 1)
    }

    /// Two-line audit rendering. The first set bit of each row wins; rows with
    /// no target render as `?`.
    pub fn visualize(&self, source: &Alphabet, target: &Alphabet) -> String {
        let src: Vec<String> = source.symbols().iter().map(|c| c.to_string()).collect();
        let tgt: Vec<String> = self
            .rows
            .iter()
            .map(|&row| {
                if row == 0 {
                    "?".to_string()
                } else {
                    target
                        .symbol(row.trailing_zeros() as usize)
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "?".to_string())
                }
            })
            .collect();

        format!("SRC: {}\nTGT: {}", src.join(" "), tgt.join(" "))
    }
}
