// ===== cipherforge/src/pipeline/mod.rs =====
//! Worker orchestration: N threads pull blocks from the shared generator,
//! translate the corpus through every mapping, score it against the
//! lexicon, and report to a single aggregator thread.

pub mod aggregator;
pub mod results;
pub mod worker;

pub use self::aggregator::{Aggregator, StatsMessage, StatsSender, StatsSnapshot};
pub use self::results::{HighScoreEntry, HighScoresSummary, ResultsLog};

use self::worker::{run_worker, WorkerContext};
use crate::alphabet::{Alphabet, WordCollection};
use crate::config::DecoderConfig;
use crate::error::{CfResult, CipherForgeError};
use crate::generator::BlockGenerator;
use crate::loader::load_word_list;
use crate::translate::{MatrixProvider, TranslationEngine};
use crate::validator::{DictionaryValidator, Lexicon};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{error, info};

/// Cooperative stop flag, checked by workers between mappings.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Shared cap on the number of mappings processed in one run.
#[derive(Debug)]
pub struct MappingBudget {
    limit: Option<u64>,
    claimed: AtomicU64,
}

impl MappingBudget {
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            limit,
            claimed: AtomicU64::new(0),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Reserves one mapping. `false` once the limit has been handed out;
    /// never over-claims.
    pub fn try_claim(&self) -> bool {
        match self.limit {
            None => {
                self.claimed.fetch_add(1, Ordering::Relaxed);
                true
            }
            Some(limit) => self
                .claimed
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
                    (c < limit).then_some(c + 1)
                })
                .is_ok(),
        }
    }

    pub fn exhausted(&self) -> bool {
        self.limit
            .is_some_and(|limit| self.claimed.load(Ordering::Acquire) >= limit)
    }

    pub fn claimed(&self) -> u64 {
        self.claimed.load(Ordering::Acquire)
    }
}

/// The search process: shared read-only inputs plus the running threads.
pub struct Decoder {
    config: DecoderConfig,
    corpus: Arc<Vec<u32>>,
    lexicon: Arc<Lexicon>,
    generator: Arc<BlockGenerator>,
    engine: TranslationEngine,
    results: Arc<ResultsLog>,
    source: Arc<Alphabet>,
    target: Arc<Alphabet>,
    cancel: CancellationToken,
    budget: Arc<MappingBudget>,
    aggregator: Option<Aggregator>,
    workers: Vec<JoinHandle<u64>>,
}

impl Decoder {
    /// Loads corpus and dictionary from the configured paths. Any input
    /// problem is reported here, before a single thread exists.
    pub fn initialize(config: DecoderConfig) -> CfResult<Self> {
        Self::initialize_with(config, None)
    }

    /// Like [`initialize`](Self::initialize), with an optional accelerated
    /// matrix provider for the `accelerated`/`auto` backends.
    pub fn initialize_with(
        config: DecoderConfig,
        accelerator: Option<Arc<dyn MatrixProvider>>,
    ) -> CfResult<Self> {
        config.validate()?;

        info!("📂 Loading corpus: {}", config.corpus_path.display());
        let corpus = load_word_list(&config.corpus_path).map_err(|e| {
            CipherForgeError::Config(format!(
                "Cannot read corpus '{}': {}",
                config.corpus_path.display(),
                e
            ))
        })?;

        info!("📖 Loading dictionary: {}", config.dictionary_path.display());
        let dictionary = load_word_list(&config.dictionary_path).map_err(|e| {
            CipherForgeError::Config(format!(
                "Cannot read dictionary '{}': {}",
                config.dictionary_path.display(),
                e
            ))
        })?;

        Self::from_sources(config, corpus, dictionary, accelerator)
    }

    /// Builds a decoder from in-memory word lists.
    pub fn from_sources<C, D>(
        config: DecoderConfig,
        corpus: C,
        dictionary: D,
        accelerator: Option<Arc<dyn MatrixProvider>>,
    ) -> CfResult<Self>
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        config.validate()?;
        let source = config.source()?;
        let target = config.target()?;

        let corpus = WordCollection::from_lines(corpus, &source);
        if corpus.is_empty() {
            return Err(CipherForgeError::Config("Corpus contains no words".into()));
        }
        let dictionary = WordCollection::from_lines(dictionary, &target);
        if dictionary.is_empty() {
            return Err(CipherForgeError::Config(
                "Dictionary contains no words".into(),
            ));
        }

        let lexicon = Lexicon::from_words(&dictionary);
        let stats = lexicon.stats();
        info!(
            "✅ Corpus: {} words | Lexicon: {} words ({} rejected, {} fingerprints)",
            corpus.len(),
            stats.word_count,
            stats.rejected,
            stats.unique_hashes
        );
        if lexicon.is_empty() {
            return Err(CipherForgeError::Config(
                "Dictionary has no word expressible in the target alphabet".into(),
            ));
        }

        let engine = TranslationEngine::new(
            config.backend,
            config.threads,
            config.parallel_fallback_multiple,
            accelerator,
        )?;
        let generator = BlockGenerator::open(config.generator_config())?;
        let results = ResultsLog::new(config.results_path.clone());
        let budget = MappingBudget::new(config.mapping_limit());

        Ok(Self {
            corpus: Arc::new(corpus.masks()),
            lexicon: Arc::new(lexicon),
            generator: Arc::new(generator),
            engine,
            results: Arc::new(results),
            source: Arc::new(source),
            target: Arc::new(target),
            cancel: CancellationToken::new(),
            budget: Arc::new(budget),
            aggregator: None,
            workers: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn generator(&self) -> &Arc<BlockGenerator> {
        &self.generator
    }

    pub fn results(&self) -> &ResultsLog {
        &self.results
    }

    pub fn corpus_len(&self) -> usize {
        self.corpus.len()
    }

    pub fn engine(&self) -> &TranslationEngine {
        &self.engine
    }

    /// Handle that stops the run when cancelled, e.g. from a signal handler.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Spawns the aggregator and the worker threads.
    pub fn start(&mut self) -> CfResult<()> {
        if self.is_running() {
            return Err(CipherForgeError::Config("Decoder is already running".into()));
        }

        let threads = self.config.effective_threads();
        let aggregator = Aggregator::spawn(
            self.config.status_interval(),
            Some(self.generator.clone()),
        );
        let validator = DictionaryValidator::new(self.lexicon.clone(), self.config.score_threshold);

        info!(
            "🚀 Starting {} workers (block size {}, threshold {:.1}, backend {})",
            threads,
            self.generator.block_size(),
            self.config.score_threshold,
            self.engine.provider_name()
        );

        for id in 0..threads {
            let ctx = WorkerContext {
                id,
                corpus: self.corpus.clone(),
                generator: self.generator.clone(),
                engine: self.engine.clone(),
                validator: validator.clone(),
                results: self.results.clone(),
                stats: aggregator.sender(),
                cancel: self.cancel.clone(),
                budget: self.budget.clone(),
                flush_interval: self.config.flush_interval(),
                source: self.source.clone(),
                target: self.target.clone(),
            };

            let spawned = std::thread::Builder::new()
                .name(format!("cf-worker-{}", id))
                .spawn(move || run_worker(ctx));
            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(e) => {
                    self.cancel.cancel();
                    self.aggregator = Some(aggregator);
                    self.wait_for_completion();
                    return Err(e.into());
                }
            }
        }

        self.aggregator = Some(aggregator);
        Ok(())
    }

    /// Asks every worker to stop at its next mapping boundary.
    pub fn stop(&self) {
        info!("🛑 Stop requested");
        self.cancel.cancel();
    }

    /// Blocks until all workers exit, drains the aggregator and writes the
    /// generator state one last time.
    pub fn wait_for_completion(&mut self) -> StatsSnapshot {
        let mut processed = 0u64;
        for handle in self.workers.drain(..) {
            match handle.join() {
                Ok(n) => processed += n,
                Err(_) => error!("A worker thread panicked"),
            }
        }

        let snapshot = match self.aggregator.take() {
            Some(mut aggregator) => aggregator.shutdown(),
            None => StatsSnapshot::default(),
        };

        if !self.generator.save_state() {
            error!("Final generator state could not be saved");
        }
        info!(
            "🏁 Run finished: {} mappings processed, {} skipped, highest score {:.2}",
            processed, snapshot.skipped_mappings, snapshot.highest_score
        );
        snapshot
    }

    /// Current totals. Zeroed before `start`.
    pub fn snapshot(&self) -> StatsSnapshot {
        self.aggregator
            .as_ref()
            .map(Aggregator::snapshot)
            .unwrap_or_default()
    }

    pub fn request_status(&self) {
        if let Some(aggregator) = &self.aggregator {
            aggregator.request_status();
        }
    }
}

impl Drop for Decoder {
    fn drop(&mut self) {
        if self.is_running() {
            self.cancel.cancel();
            self.wait_for_completion();
        }
    }
}
