// ===== cipherforge/src/translate/mod.rs =====
pub mod parallel;
pub mod provider;
pub mod scalar;

pub use self::parallel::ParallelProvider;
pub use self::provider::MatrixProvider;
pub use self::scalar::ScalarProvider;

use crate::error::{CfResult, CipherForgeError};
use crate::mapping::Mapping;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::info;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Scalar,
    Parallel,
    /// Requires an available accelerator provider.
    Accelerated,
    /// Accelerator when present, scalar otherwise.
    #[default]
    Auto,
}

impl Backend {
    /// Accepted backend names, comma separated.
    pub fn names() -> String {
        Self::iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Case-insensitive parse whose error lists every accepted name.
    pub fn parse_name(name: &str) -> Result<Self, String> {
        name.parse().map_err(|_| {
            format!(
                "unknown backend '{}', expected one of: {}",
                name,
                Self::names()
            )
        })
    }
}

#[derive(Debug, Clone)]
pub struct TranslationStats {
    pub words: usize,
    pub elapsed: Duration,
    pub words_per_second: f64,
    pub provider: String,
}

/// Applies mappings to word masks through the selected [`MatrixProvider`].
#[derive(Clone)]
pub struct TranslationEngine {
    provider: Arc<dyn MatrixProvider>,
}

impl TranslationEngine {
    /// Resolves `backend` to a provider.
    ///
    /// `Accelerated` fails if `accelerator` is missing or unavailable; `Auto`
    /// quietly falls back to the scalar backend in that case.
    pub fn new(
        backend: Backend,
        threads: usize,
        fallback_multiple: usize,
        accelerator: Option<Arc<dyn MatrixProvider>>,
    ) -> CfResult<Self> {
        let usable = accelerator.filter(|p| p.is_available());

        let provider: Arc<dyn MatrixProvider> = match backend {
            Backend::Scalar => Arc::new(ScalarProvider),
            Backend::Parallel => Arc::new(ParallelProvider::new(threads, fallback_multiple)),
            Backend::Accelerated => usable.ok_or_else(|| {
                let others: Vec<String> = Backend::iter()
                    .filter(|b| *b != Backend::Accelerated)
                    .map(|b| b.to_string())
                    .collect();
                CipherForgeError::Capability(format!(
                    "accelerated backend requested but no accelerator is available; choose one of: {}",
                    others.join(", ")
                ))
            })?,
            Backend::Auto => usable.unwrap_or_else(|| Arc::new(ScalarProvider)),
        };

        info!(
            "⚙️  Translation backend: {} -> {} [{}]",
            backend,
            provider.name(),
            provider.device_description()
        );
        Ok(Self { provider })
    }

    pub fn scalar() -> Self {
        Self {
            provider: Arc::new(ScalarProvider),
        }
    }

    pub fn with_provider(provider: Arc<dyn MatrixProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn device_description(&self) -> String {
        self.provider.device_description()
    }

    pub fn translate_batch(&self, words: &[u32], mapping: &Mapping) -> CfResult<Vec<u32>> {
        let mut out = vec![0u32; words.len()];
        self.provider.multiply_into(words, mapping, &mut out)?;
        Ok(out)
    }

    /// Like [`translate_batch`](Self::translate_batch) but reuses `out`.
    pub fn translate_into(
        &self,
        words: &[u32],
        mapping: &Mapping,
        out: &mut Vec<u32>,
    ) -> CfResult<()> {
        out.clear();
        out.resize(words.len(), 0);
        self.provider.multiply_into(words, mapping, out)
    }

    /// One translated batch per mapping, in mapping order.
    pub fn translate_many(&self, words: &[u32], mappings: &[Mapping]) -> CfResult<Vec<Vec<u32>>> {
        let flat = self.provider.multiply_batch(words, mappings)?;
        if words.is_empty() {
            return Ok(vec![Vec::new(); mappings.len()]);
        }
        Ok(flat.chunks(words.len()).map(<[u32]>::to_vec).collect())
    }

    pub fn translate_with_stats(
        &self,
        words: &[u32],
        mapping: &Mapping,
    ) -> CfResult<(Vec<u32>, TranslationStats)> {
        let start = Instant::now();
        let out = self.translate_batch(words, mapping)?;
        let elapsed = start.elapsed();

        let secs = elapsed.as_secs_f64();
        let stats = TranslationStats {
            words: words.len(),
            elapsed,
            words_per_second: if secs > 0.0 {
                words.len() as f64 / secs
            } else {
                0.0
            },
            provider: self.provider.name().to_string(),
        };
        Ok((out, stats))
    }
}
