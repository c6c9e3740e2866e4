use crate::generator::BlockGenerator;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub enum StatsMessage {
    /// A single mapping reported outside a batch.
    MappingProcessed {
        worker: usize,
        mapping_id: u64,
        words_validated: u64,
        score: f64,
    },
    BatchStats {
        worker: usize,
        mappings: u64,
        /// Mappings that failed translation and were not validated.
        skipped: u64,
        words_validated: u64,
        highest_score: f64,
    },
    HighScore {
        worker: usize,
        mapping_id: u64,
        score: f64,
        matched: usize,
        total: usize,
        match_percentage: f64,
    },
    ThreadStarted {
        worker: usize,
    },
    ThreadCompleted {
        worker: usize,
        processed: u64,
        skipped: u64,
    },
    StatusRequest,
    Shutdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsSnapshot {
    /// Mappings that were translated and validated.
    pub total_mappings: u64,
    pub skipped_mappings: u64,
    pub total_words: u64,
    pub highest_score: f64,
    pub high_score_count: u64,
    pub active_threads: usize,
    pub mappings_per_second: f64,
    pub elapsed: Duration,
    /// Completed share of the search space, when a generator is attached.
    pub progress_percentage: Option<f64>,
}

/// Written only by the aggregator thread; read by snapshot callers.
#[derive(Default)]
struct SharedStats {
    mappings: AtomicU64,
    skipped: AtomicU64,
    words: AtomicU64,
    highest_bits: AtomicU64,
    high_scores: AtomicU64,
    active: AtomicUsize,
    rate_bits: AtomicU64,
}

impl SharedStats {
    fn highest(&self) -> f64 {
        f64::from_bits(self.highest_bits.load(Ordering::Relaxed))
    }

    fn raise_highest(&self, score: f64) {
        if score > self.highest() {
            self.highest_bits.store(score.to_bits(), Ordering::Relaxed);
        }
    }
}

/// Cheap handle given to each worker.
#[derive(Clone)]
pub struct StatsSender(Sender<StatsMessage>);

impl StatsSender {
    /// Never blocks; messages sent after shutdown are dropped.
    pub fn send(&self, msg: StatsMessage) {
        let _ = self.0.send(msg);
    }
}

/// Single consumer that merges statistics from every worker.
///
/// Workers only enqueue; totals and the running maximum are updated on the
/// aggregator thread. The thread also wakes every `interval` to log a
/// progress line even when the queue is idle.
pub struct Aggregator {
    sender: Sender<StatsMessage>,
    handle: Option<JoinHandle<()>>,
    shared: Arc<SharedStats>,
    generator: Option<Arc<BlockGenerator>>,
    started: Instant,
}

impl Aggregator {
    pub fn spawn(interval: Duration, generator: Option<Arc<BlockGenerator>>) -> Self {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::new(SharedStats::default());
        let started = Instant::now();

        let consumer = Consumer {
            rx,
            shared: shared.clone(),
            generator: generator.clone(),
            interval,
            started,
            last_status: started,
            last_count: 0,
        };

        let handle = std::thread::Builder::new()
            .name("cf-aggregator".into())
            .spawn(move || consumer.run());

        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                error!("Failed to spawn aggregator thread: {}", e);
                None
            }
        };

        Self {
            sender: tx,
            handle,
            shared,
            generator,
            started,
        }
    }

    pub fn sender(&self) -> StatsSender {
        StatsSender(self.sender.clone())
    }

    pub fn request_status(&self) {
        let _ = self.sender.send(StatsMessage::StatusRequest);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        build_snapshot(&self.shared, self.generator.as_deref(), self.started)
    }

    /// Drains everything queued so far, stops the thread and returns the
    /// final totals.
    pub fn shutdown(&mut self) -> StatsSnapshot {
        if let Some(handle) = self.handle.take() {
            let _ = self.sender.send(StatsMessage::Shutdown);
            if handle.join().is_err() {
                error!("Aggregator thread panicked");
            }
        }
        self.snapshot()
    }
}

impl Drop for Aggregator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn build_snapshot(
    shared: &SharedStats,
    generator: Option<&BlockGenerator>,
    started: Instant,
) -> StatsSnapshot {
    StatsSnapshot {
        total_mappings: shared.mappings.load(Ordering::Relaxed),
        skipped_mappings: shared.skipped.load(Ordering::Relaxed),
        total_words: shared.words.load(Ordering::Relaxed),
        highest_score: shared.highest(),
        high_score_count: shared.high_scores.load(Ordering::Relaxed),
        active_threads: shared.active.load(Ordering::Relaxed),
        mappings_per_second: f64::from_bits(shared.rate_bits.load(Ordering::Relaxed)),
        elapsed: started.elapsed(),
        progress_percentage: generator.map(BlockGenerator::progress_percentage),
    }
}

struct Consumer {
    rx: Receiver<StatsMessage>,
    shared: Arc<SharedStats>,
    generator: Option<Arc<BlockGenerator>>,
    interval: Duration,
    started: Instant,
    last_status: Instant,
    last_count: u64,
}

impl Consumer {
    fn run(mut self) {
        loop {
            match self.rx.recv_timeout(self.interval) {
                Ok(StatsMessage::Shutdown) => break,
                Ok(msg) => self.handle(msg),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if self.last_status.elapsed() >= self.interval {
                self.update_rate();
                self.print_status();
            }
        }

        self.update_rate();
        debug!("Aggregator stopped");
    }

    fn handle(&self, msg: StatsMessage) {
        let s = &self.shared;
        match msg {
            StatsMessage::MappingProcessed {
                words_validated,
                score,
                ..
            } => {
                s.mappings.fetch_add(1, Ordering::Relaxed);
                s.words.fetch_add(words_validated, Ordering::Relaxed);
                s.raise_highest(score);
            }
            StatsMessage::BatchStats {
                mappings,
                skipped,
                words_validated,
                highest_score,
                ..
            } => {
                s.mappings.fetch_add(mappings, Ordering::Relaxed);
                s.skipped.fetch_add(skipped, Ordering::Relaxed);
                s.words.fetch_add(words_validated, Ordering::Relaxed);
                s.raise_highest(highest_score);
            }
            StatsMessage::HighScore {
                worker,
                mapping_id,
                score,
                matched,
                total,
                match_percentage,
            } => {
                s.high_scores.fetch_add(1, Ordering::Relaxed);
                info!(
                    "*** HIGH SCORE *** worker {}: score={:.2}, matches={}/{} ({:.1}%), mapping={}",
                    worker, score, matched, total, match_percentage, mapping_id
                );
            }
            StatsMessage::ThreadStarted { worker } => {
                s.active.fetch_add(1, Ordering::Relaxed);
                debug!("Worker {} online", worker);
            }
            StatsMessage::ThreadCompleted {
                worker,
                processed,
                skipped,
            } => {
                s.active.fetch_sub(1, Ordering::Relaxed);
                if skipped > 0 {
                    warn!(
                        "Worker {} finished after {} mappings, {} skipped",
                        worker, processed, skipped
                    );
                } else {
                    info!("Worker {} finished after {} mappings", worker, processed);
                }
            }
            StatsMessage::StatusRequest => self.print_status(),
            StatsMessage::Shutdown => {}
        }
    }

    fn update_rate(&mut self) {
        let elapsed = self.last_status.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return;
        }
        let count = self.shared.mappings.load(Ordering::Relaxed);
        let rate = (count - self.last_count) as f64 / elapsed;
        self.shared.rate_bits.store(rate.to_bits(), Ordering::Relaxed);
        self.last_count = count;
        self.last_status = Instant::now();
    }

    fn print_status(&self) {
        let snap = build_snapshot(&self.shared, self.generator.as_deref(), self.started);
        let progress = snap
            .progress_percentage
            .map(|p| format!(", progress {:.12}%", p))
            .unwrap_or_default();
        info!(
            "[{:.1}min] mappings: {} ({:.1}/sec), highest score: {:.2}, active threads: {}{}",
            snap.elapsed.as_secs_f64() / 60.0,
            snap.total_mappings,
            snap.mappings_per_second,
            snap.highest_score,
            snap.active_threads,
            progress
        );
    }
}
