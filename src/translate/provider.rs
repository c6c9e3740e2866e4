use crate::error::{CfResult, CipherForgeError};
use crate::mapping::Mapping;

/// A backend for the boolean word x mapping matrix product.
///
/// Every implementation must return bit-identical results to
/// [`ScalarProvider`](super::scalar::ScalarProvider). Accelerator backends
/// are plugged in through this trait so nothing device-specific leaks into
/// [`TranslationEngine`](super::TranslationEngine).
pub trait MatrixProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the backend can run on this machine.
    fn is_available(&self) -> bool {
        true
    }

    fn device_description(&self) -> String;

    /// Writes `mapping.apply(words[i])` into `out[i]`.
    fn multiply_into(&self, words: &[u32], mapping: &Mapping, out: &mut [u32]) -> CfResult<()>;

    /// All (mapping, word) products in one call, mapping-major:
    /// `result[m * words.len() + w]`.
    fn multiply_batch(&self, words: &[u32], mappings: &[Mapping]) -> CfResult<Vec<u32>> {
        let n = words.len();
        let mut out = vec![0u32; n * mappings.len()];
        if n == 0 {
            return Ok(out);
        }
        for (mapping, chunk) in mappings.iter().zip(out.chunks_mut(n)) {
            self.multiply_into(words, mapping, chunk)?;
        }
        Ok(out)
    }
}

pub(crate) fn check_lengths(words: &[u32], out: &[u32]) -> CfResult<()> {
    if words.len() != out.len() {
        return Err(CipherForgeError::Validation(format!(
            "Output buffer holds {} rows, expected {}",
            out.len(),
            words.len()
        )));
    }
    Ok(())
}
