use super::aggregator::{StatsMessage, StatsSender};
use super::results::{HighScoreEntry, ResultsLog};
use super::{CancellationToken, MappingBudget};
use crate::alphabet::Alphabet;
use crate::error::CfResult;
use crate::generator::BlockGenerator;
use crate::mapping::Mapping;
use crate::translate::TranslationEngine;
use crate::validator::{DictionaryValidator, ValidationResult};
use chrono::Local;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Everything one worker thread needs. All heavy data is shared.
pub struct WorkerContext {
    pub id: usize,
    pub corpus: Arc<Vec<u32>>,
    pub generator: Arc<BlockGenerator>,
    pub engine: TranslationEngine,
    pub validator: DictionaryValidator,
    pub results: Arc<ResultsLog>,
    pub stats: StatsSender,
    pub cancel: CancellationToken,
    pub budget: Arc<MappingBudget>,
    pub flush_interval: Duration,
    pub source: Arc<Alphabet>,
    pub target: Arc<Alphabet>,
}

/// Per-thread counters, pushed to the aggregator as one `BatchStats`.
#[derive(Default)]
struct LocalBatch {
    mappings: u64,
    skipped: u64,
    words: u64,
    highest: f64,
}

impl LocalBatch {
    fn record(&mut self, result: &ValidationResult) {
        self.mappings += 1;
        self.words += result.total_words as u64;
        if result.score > self.highest {
            self.highest = result.score;
        }
    }

    fn flush(&mut self, worker: usize, stats: &StatsSender) {
        if self.mappings == 0 && self.skipped == 0 {
            return;
        }
        stats.send(StatsMessage::BatchStats {
            worker,
            mappings: self.mappings,
            skipped: self.skipped,
            words_validated: self.words,
            highest_score: self.highest,
        });
        *self = Self::default();
    }
}

/// Claims blocks until the space is exhausted, the budget runs out or the
/// run is cancelled. Returns the number of mappings this worker validated.
///
/// A block is marked completed once every ordinal in it has been visited,
/// including mappings that failed and were skipped. A block cut short is
/// released so a later run picks it up again.
pub fn run_worker(ctx: WorkerContext) -> u64 {
    let id = ctx.id;
    ctx.stats.send(StatsMessage::ThreadStarted { worker: id });
    debug!("Worker {} started", id);

    let mut translated = Vec::with_capacity(ctx.corpus.len());
    let mut batch = LocalBatch::default();
    let mut last_flush = Instant::now();
    let mut processed = 0u64;
    let mut skipped = 0u64;

    while !ctx.cancel.is_cancelled() && !ctx.budget.exhausted() {
        let Some(block) = ctx.generator.get_next_block(id) else {
            break;
        };
        debug!(
            "Worker {} processing block {} [{}..{})",
            id, block.index, block.start, block.end
        );

        let mut finished = true;
        for (ordinal, mapping) in block.mappings() {
            if ctx.cancel.is_cancelled() || !ctx.budget.try_claim() {
                finished = false;
                break;
            }

            match process_mapping(&ctx, ordinal, &mapping, &mut translated) {
                // high scores are counted right away, outside the batch
                Ok(result) if result.is_high_score => {
                    ctx.stats.send(StatsMessage::MappingProcessed {
                        worker: id,
                        mapping_id: ordinal,
                        words_validated: result.total_words as u64,
                        score: result.score,
                    });
                    processed += 1;
                }
                Ok(result) => {
                    batch.record(&result);
                    processed += 1;
                }
                Err(e) => {
                    warn!("Worker {}: mapping {} skipped: {}", id, ordinal, e);
                    batch.skipped += 1;
                    skipped += 1;
                }
            }

            if last_flush.elapsed() >= ctx.flush_interval {
                batch.flush(id, &ctx.stats);
                last_flush = Instant::now();
            }
        }

        if finished {
            ctx.generator.complete_block(id);
        } else {
            ctx.generator.release_block(id);
            break;
        }
    }

    batch.flush(id, &ctx.stats);
    ctx.stats.send(StatsMessage::ThreadCompleted {
        worker: id,
        processed,
        skipped,
    });
    debug!(
        "Worker {} exiting after {} mappings ({} skipped)",
        id, processed, skipped
    );
    processed
}

fn process_mapping(
    ctx: &WorkerContext,
    ordinal: u64,
    mapping: &Mapping,
    translated: &mut Vec<u32>,
) -> CfResult<ValidationResult> {
    ctx.engine.translate_into(&ctx.corpus, mapping, translated)?;
    let result = ctx.validator.validate(translated);

    if result.is_high_score {
        report_high_score(ctx, ordinal, mapping, &result);
    }
    Ok(result)
}

fn report_high_score(
    ctx: &WorkerContext,
    ordinal: u64,
    mapping: &Mapping,
    result: &ValidationResult,
) {
    let entry = HighScoreEntry {
        mapping_id: ordinal,
        score: result.score,
        matched_words: result.matched_words,
        total_words: result.total_words,
        timestamp: Local::now(),
        visualization: mapping.visualize(&ctx.source, &ctx.target),
    };

    if let Err(e) = ctx.results.append(&entry) {
        error!(
            "Failed to write high score for mapping {} to '{}': {}",
            ordinal,
            ctx.results.path().display(),
            e
        );
    } else {
        info!("📝 Mapping {} recorded ({:.2})", ordinal, result.score);
    }

    ctx.stats.send(StatsMessage::HighScore {
        worker: ctx.id,
        mapping_id: ordinal,
        score: result.score,
        matched: result.matched_words,
        total: result.total_words,
        match_percentage: result.match_percentage,
    });
}
