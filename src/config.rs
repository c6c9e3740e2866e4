use crate::alphabet::{Alphabet, HEBREW_SYMBOLS, SOURCE_SYMBOLS};
use crate::error::{CfResult, CipherForgeError};
use crate::generator::{GeneratorConfig, DEFAULT_BLOCK_SIZE};
use crate::permutation::TOTAL_PERMUTATIONS;
use crate::translate::parallel::DEFAULT_FALLBACK_MULTIPLE;
use crate::translate::Backend;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Worker threads (0 = hardware concurrency)
    #[arg(short = 'j', long, default_value_t = 0)]
    pub threads: usize,

    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: u64,

    /// Scores strictly above this are logged as high scores
    #[arg(long, default_value_t = 25.0)]
    pub score_threshold: f64,

    #[arg(long, default_value = "data/corpus.txt")]
    pub corpus_path: PathBuf,

    #[arg(long, default_value = "data/dictionary.txt")]
    pub dictionary_path: PathBuf,

    #[arg(long, default_value = "cipherforge_state.json")]
    pub state_path: PathBuf,

    #[arg(long, default_value = "cipherforge_results.txt")]
    pub results_path: PathBuf,

    /// Stop after this many mappings (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub max_mappings: u64,

    /// Upper bound of the ordinal space to search
    #[arg(long, default_value_t = TOTAL_PERMUTATIONS)]
    pub space_size: u64,

    /// Translation backend; an unknown name lists the accepted ones
    #[arg(long, default_value_t = Backend::Auto, value_parser = Backend::parse_name)]
    pub backend: Backend,

    #[arg(long, default_value_t = 5)]
    pub status_interval_secs: u64,

    #[arg(long, default_value_t = 1000)]
    pub flush_interval_ms: u64,

    #[arg(long, default_value_t = DEFAULT_FALLBACK_MULTIPLE)]
    pub parallel_fallback_multiple: usize,

    #[arg(long, default_value = SOURCE_SYMBOLS)]
    pub source_alphabet: String,

    #[arg(long, default_value = HEBREW_SYMBOLS)]
    pub target_alphabet: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            block_size: DEFAULT_BLOCK_SIZE,
            score_threshold: 25.0,
            corpus_path: PathBuf::from("data/corpus.txt"),
            dictionary_path: PathBuf::from("data/dictionary.txt"),
            state_path: PathBuf::from("cipherforge_state.json"),
            results_path: PathBuf::from("cipherforge_results.txt"),
            max_mappings: 0,
            space_size: TOTAL_PERMUTATIONS,
            backend: Backend::Auto,
            status_interval_secs: 5,
            flush_interval_ms: 1000,
            parallel_fallback_multiple: DEFAULT_FALLBACK_MULTIPLE,
            source_alphabet: SOURCE_SYMBOLS.to_string(),
            target_alphabet: HEBREW_SYMBOLS.to_string(),
        }
    }
}

impl DecoderConfig {
    /// Missing fields take their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn validate(&self) -> CfResult<()> {
        if self.block_size == 0 {
            return Err(CipherForgeError::Config("block_size must be > 0".into()));
        }
        if self.space_size == 0 || self.space_size > TOTAL_PERMUTATIONS {
            return Err(CipherForgeError::Config(format!(
                "space_size must be within 1..={}",
                TOTAL_PERMUTATIONS
            )));
        }
        if !self.score_threshold.is_finite() {
            return Err(CipherForgeError::Config(
                "score_threshold must be a finite number".into(),
            ));
        }
        if self.status_interval_secs == 0 {
            return Err(CipherForgeError::Config(
                "status_interval_secs must be > 0".into(),
            ));
        }
        self.source()?;
        self.target()?;
        Ok(())
    }

    pub fn source(&self) -> CfResult<Alphabet> {
        Alphabet::from_symbols(&self.source_alphabet)
    }

    pub fn target(&self) -> CfResult<Alphabet> {
        Alphabet::from_symbols(&self.target_alphabet)
    }

    pub fn effective_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        }
    }

    pub fn mapping_limit(&self) -> Option<u64> {
        (self.max_mappings > 0).then_some(self.max_mappings)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            block_size: self.block_size,
            state_path: Some(self.state_path.clone()),
            space_size: self.space_size,
        }
    }
}
