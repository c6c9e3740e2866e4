use super::provider::{check_lengths, MatrixProvider};
use super::scalar::{multiply_range, multiply_word};
use crate::error::CfResult;
use crate::mapping::Mapping;
use rayon::prelude::*;

pub const DEFAULT_FALLBACK_MULTIPLE: usize = 10;

/// Multi-core backend on the rayon pool.
///
/// Words are cut into one contiguous range per thread; each range writes its
/// own slice of the output, so no synchronization is needed. Inputs shorter
/// than `threads * fallback_multiple` run on the calling thread.
#[derive(Debug, Clone, Copy)]
pub struct ParallelProvider {
    threads: usize,
    fallback_multiple: usize,
}

impl ParallelProvider {
    pub fn new(threads: usize, fallback_multiple: usize) -> Self {
        let threads = if threads == 0 {
            rayon::current_num_threads()
        } else {
            threads
        };
        Self {
            threads: threads.max(1),
            fallback_multiple,
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Inputs below this length are translated without dispatching.
    pub fn fallback_threshold(&self) -> usize {
        self.threads * self.fallback_multiple
    }
}

impl Default for ParallelProvider {
    fn default() -> Self {
        Self::new(0, DEFAULT_FALLBACK_MULTIPLE)
    }
}

impl MatrixProvider for ParallelProvider {
    fn name(&self) -> &str {
        "parallel"
    }

    fn device_description(&self) -> String {
        format!("CPU ({} threads)", self.threads)
    }

    fn multiply_into(&self, words: &[u32], mapping: &Mapping, out: &mut [u32]) -> CfResult<()> {
        check_lengths(words, out)?;
        let cols = mapping.columns();

        if words.len() < self.fallback_threshold() {
            multiply_range(words, &cols, out);
            return Ok(());
        }

        let chunk = words.len().div_ceil(self.threads);
        out.par_chunks_mut(chunk)
            .zip(words.par_chunks(chunk))
            .for_each(|(o, w)| multiply_range(w, &cols, o));
        Ok(())
    }

    fn multiply_batch(&self, words: &[u32], mappings: &[Mapping]) -> CfResult<Vec<u32>> {
        let n = words.len();
        let mut out = vec![0u32; n * mappings.len()];
        if n == 0 {
            return Ok(out);
        }

        let cols: Vec<_> = mappings.iter().map(Mapping::columns).collect();
        out.par_iter_mut().enumerate().for_each(|(k, slot)| {
            *slot = multiply_word(words[k % n], &cols[k / n]);
        });
        Ok(out)
    }
}
