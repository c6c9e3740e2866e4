use super::provider::{check_lengths, MatrixProvider};
use crate::error::CfResult;
use crate::mapping::Mapping;
use crate::ALPHABET_SIZE;

/// One row of the product. `cols[j]` holds column `j` of the mapping, so
/// output bit `j` is the AND-OR reduction `(word & cols[j]) != 0`.
/// Four output columns per iteration.
#[inline(always)]
pub fn multiply_word(word: u32, cols: &[u32; ALPHABET_SIZE]) -> u32 {
    let mut out = 0u32;
    let mut j = 0;

    while j + 4 <= ALPHABET_SIZE {
        let a = ((word & cols[j]) != 0) as u32;
        let b = ((word & cols[j + 1]) != 0) as u32;
        let c = ((word & cols[j + 2]) != 0) as u32;
        let d = ((word & cols[j + 3]) != 0) as u32;
        out |= (a << j) | (b << (j + 1)) | (c << (j + 2)) | (d << (j + 3));
        j += 4;
    }

    while j < ALPHABET_SIZE {
        out |= (((word & cols[j]) != 0) as u32) << j;
        j += 1;
    }

    out
}

#[inline]
pub fn multiply_range(words: &[u32], cols: &[u32; ALPHABET_SIZE], out: &mut [u32]) {
    for (slot, &word) in out.iter_mut().zip(words) {
        *slot = multiply_word(word, cols);
    }
}

/// Single-threaded reference backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarProvider;

impl MatrixProvider for ScalarProvider {
    fn name(&self) -> &str {
        "scalar"
    }

    fn device_description(&self) -> String {
        "CPU (single thread)".to_string()
    }

    fn multiply_into(&self, words: &[u32], mapping: &Mapping, out: &mut [u32]) -> CfResult<()> {
        check_lengths(words, out)?;
        let cols = mapping.columns();
        multiply_range(words, &cols, out);
        Ok(())
    }
}
