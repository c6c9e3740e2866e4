use cipherforge::alphabet::SOURCE_SYMBOLS;
use cipherforge::config::DecoderConfig;
use cipherforge::generator::persist::load_from_disk;
use cipherforge::generator::BlockState;
use cipherforge::pipeline::{
    Aggregator, CancellationToken, Decoder, MappingBudget, ResultsLog, StatsMessage,
};
use cipherforge::mapping::Mapping;
use cipherforge::translate::{Backend, MatrixProvider, ScalarProvider};
use cipherforge::{CfResult, CipherForgeError};
use rstest::rstest;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// "ab" under the identity lands on "xy"
const SHIFTED_TARGET: &str = "xyabcdefghijklmnopqrstuvwz ";

fn config(dir: &Path) -> DecoderConfig {
    DecoderConfig {
        threads: 1,
        block_size: 1,
        score_threshold: 25.0,
        state_path: dir.join("state.json"),
        results_path: dir.join("results.txt"),
        corpus_path: dir.join("corpus.txt"),
        dictionary_path: dir.join("dictionary.txt"),
        backend: Backend::Scalar,
        status_interval_secs: 1,
        flush_interval_ms: 10,
        target_alphabet: SHIFTED_TARGET.to_string(),
        ..Default::default()
    }
}

#[test]
fn single_word_identity_run() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = DecoderConfig {
        max_mappings: 1,
        ..config(dir.path())
    };
    std::fs::write(&cfg.corpus_path, "ab\n").unwrap();
    std::fs::write(&cfg.dictionary_path, "xy\n").unwrap();

    let mut decoder = Decoder::initialize(cfg.clone()).unwrap();
    decoder.start().unwrap();
    let snap = decoder.wait_for_completion();

    assert_eq!(snap.total_mappings, 1);
    assert_eq!(snap.total_words, 1);
    assert_eq!(snap.high_score_count, 1);
    // 100% match, +5*log10(2) bonus, -18 for a one-word corpus
    let expected = 100.0 + 2.0f64.log10() * 5.0 - 18.0;
    assert!((snap.highest_score - expected).abs() < 1e-9);

    let summary = ResultsLog::new(&cfg.results_path).summary().unwrap();
    assert_eq!(summary.total_results, 1);
    assert_eq!(summary.total_words_validated, 1);
    assert!((summary.highest_score - 83.51).abs() < 1e-9);

    let saved = load_from_disk(&cfg.state_path).unwrap();
    assert_eq!(saved.state.blocks_completed, 1);
    assert_eq!(saved.state.next_block_index, 1);
}

#[test]
fn full_match_on_ten_words_scores_one_hundred() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = DecoderConfig {
        space_size: 1,
        target_alphabet: SOURCE_SYMBOLS.to_string(),
        ..config(dir.path())
    };
    let words: Vec<String> = "abcdefghij".chars().map(|c| c.to_string()).collect();

    let mut decoder = Decoder::from_sources(cfg.clone(), &words, &words, None).unwrap();
    decoder.start().unwrap();
    let snap = decoder.wait_for_completion();

    assert_eq!(snap.total_mappings, 1);
    assert_eq!(snap.highest_score, 100.0);
    assert!(decoder.generator().is_generation_complete());

    let log = std::fs::read_to_string(&cfg.results_path).unwrap();
    assert!(log.contains("Mapping ID: 0"));
    assert!(log.contains("Score: 100.00% (10/10 matches)"));
}

#[test]
fn mapping_limit_is_exact_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = DecoderConfig {
        threads: 2,
        block_size: 10,
        max_mappings: 25,
        score_threshold: 90.0,
        ..config(dir.path())
    };

    let mut decoder = Decoder::from_sources(cfg, ["ab", "cd"], ["xy"], None).unwrap();
    decoder.start().unwrap();
    let snap = decoder.wait_for_completion();

    assert_eq!(snap.total_mappings, 25);
    assert_eq!(snap.total_words, 50);
    assert_eq!(snap.high_score_count, 0);

    let gen = decoder.generator();
    assert!(gen.state().blocks_completed <= 2);
    assert!(gen.window().iter().all(|b| b.state != BlockState::Assigned));
}

#[test]
fn cancelled_run_leaves_resumable_state() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = DecoderConfig {
        threads: 2,
        block_size: 1_000,
        score_threshold: 90.0,
        ..config(dir.path())
    };

    let mut decoder = Decoder::from_sources(cfg.clone(), ["ab", "ba"], ["xy"], None).unwrap();
    let token = decoder.cancellation_token();
    decoder.start().unwrap();
    std::thread::sleep(Duration::from_millis(50));
    token.cancel();
    let snap = decoder.wait_for_completion();
    drop(decoder);

    let saved = load_from_disk(&cfg.state_path).unwrap();
    assert!(saved.blocks.iter().all(|b| b.state != BlockState::Assigned));
    // a completed block was fully processed
    assert!(snap.total_mappings >= saved.state.blocks_completed * 1_000);

    // the next run starts with the unfinished blocks
    let resumed = Decoder::from_sources(cfg, ["ab"], ["xy"], None).unwrap();
    let gen = resumed.generator();
    let first_pending = saved
        .blocks
        .iter()
        .find(|b| b.state == BlockState::Pending)
        .map(|b| b.index);
    let block = gen.get_next_block(0).unwrap();
    match first_pending {
        Some(index) => assert_eq!(block.index, index),
        None => assert_eq!(block.index, saved.state.next_block_index),
    }
}

#[test]
fn stop_before_start_processes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut decoder = Decoder::from_sources(config(dir.path()), ["ab"], ["xy"], None).unwrap();
    decoder.stop();
    decoder.start().unwrap();
    let snap = decoder.wait_for_completion();
    assert_eq!(snap.total_mappings, 0);
    assert_eq!(decoder.generator().state().blocks_completed, 0);
}

#[test]
fn starting_twice_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = DecoderConfig {
        max_mappings: 1,
        ..config(dir.path())
    };
    let mut decoder = Decoder::from_sources(cfg, ["ab"], ["xy"], None).unwrap();
    assert_eq!(decoder.snapshot().total_mappings, 0);

    decoder.start().unwrap();
    assert!(matches!(decoder.start(), Err(CipherForgeError::Config(_))));
    decoder.wait_for_completion();
}

#[test]
fn missing_corpus_fails_initialization() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    std::fs::write(&cfg.dictionary_path, "xy\n").unwrap();

    let result = Decoder::initialize(cfg.clone());
    assert!(matches!(result, Err(CipherForgeError::Config(_))));
    assert!(!cfg.state_path.exists());
}

#[test]
fn empty_corpus_fails_initialization() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    std::fs::write(&cfg.corpus_path, "\n\n").unwrap();
    std::fs::write(&cfg.dictionary_path, "xy\n").unwrap();

    assert!(matches!(
        Decoder::initialize(cfg),
        Err(CipherForgeError::Config(_))
    ));
}

#[test]
fn missing_dictionary_fails_initialization() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    std::fs::write(&cfg.corpus_path, "ab\n").unwrap();

    assert!(matches!(
        Decoder::initialize(cfg),
        Err(CipherForgeError::Config(_))
    ));
}

#[test]
fn dictionary_outside_target_alphabet_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let result = Decoder::from_sources(config(dir.path()), ["ab"], ["123", "!!"], None);
    assert!(matches!(result, Err(CipherForgeError::Config(_))));
}

#[test]
fn demanding_an_accelerator_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = DecoderConfig {
        backend: Backend::Accelerated,
        ..config(dir.path())
    };
    let result = Decoder::from_sources(cfg, ["ab"], ["xy"], None);
    assert!(matches!(result, Err(CipherForgeError::Capability(_))));
}

#[test]
fn aggregator_merges_all_messages() {
    let mut aggregator = Aggregator::spawn(Duration::from_millis(5), None);
    let tx = aggregator.sender();

    tx.send(StatsMessage::ThreadStarted { worker: 0 });
    tx.send(StatsMessage::ThreadStarted { worker: 1 });
    tx.send(StatsMessage::MappingProcessed {
        worker: 0,
        mapping_id: 3,
        words_validated: 10,
        score: 12.5,
    });
    tx.send(StatsMessage::BatchStats {
        worker: 1,
        mappings: 4,
        skipped: 2,
        words_validated: 40,
        highest_score: 40.0,
    });
    tx.send(StatsMessage::HighScore {
        worker: 1,
        mapping_id: 9,
        score: 40.0,
        matched: 4,
        total: 10,
        match_percentage: 40.0,
    });
    tx.send(StatsMessage::ThreadCompleted {
        worker: 0,
        processed: 1,
        skipped: 0,
    });
    aggregator.request_status();

    let snap = aggregator.shutdown();
    assert_eq!(snap.total_mappings, 5);
    assert_eq!(snap.skipped_mappings, 2);
    assert_eq!(snap.total_words, 50);
    assert_eq!(snap.highest_score, 40.0);
    assert_eq!(snap.high_score_count, 1);
    assert_eq!(snap.active_threads, 1);
    assert_eq!(snap.progress_percentage, None);

    // late messages are dropped quietly
    tx.send(StatsMessage::StatusRequest);
}

#[test]
fn budget_hands_out_exactly_the_limit() {
    let budget = Arc::new(MappingBudget::new(Some(1_000)));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let budget = budget.clone();
            std::thread::spawn(move || {
                let mut granted = 0u64;
                while budget.try_claim() {
                    granted += 1;
                }
                granted
            })
        })
        .collect();

    let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 1_000);
    assert!(budget.exhausted());
    assert_eq!(budget.claimed(), 1_000);

    let unlimited = MappingBudget::unlimited();
    assert!(unlimited.try_claim());
    assert!(!unlimited.exhausted());
}

#[test]
fn cancellation_is_shared_between_clones() {
    let token = CancellationToken::new();
    let other = token.clone();
    assert!(!other.is_cancelled());
    token.cancel();
    assert!(other.is_cancelled());
}

/// Scalar products, except every third call fails.
struct FlakyProvider {
    calls: AtomicUsize,
}

impl MatrixProvider for FlakyProvider {
    fn name(&self) -> &str {
        "flaky"
    }

    fn device_description(&self) -> String {
        "fails on calls 1, 4, 7, ...".to_string()
    }

    fn multiply_into(&self, words: &[u32], mapping: &Mapping, out: &mut [u32]) -> CfResult<()> {
        if self.calls.fetch_add(1, Ordering::SeqCst) % 3 == 1 {
            return Err(CipherForgeError::Validation("device lost".into()));
        }
        ScalarProvider.multiply_into(words, mapping, out)
    }
}

// ordinals 0..6 only permute the last three positions, so "ab" always
// lands on "xy" and every validated mapping scores 83.5
#[rstest]
#[case::reported_one_by_one(25.0, 4)]
#[case::reported_in_batches(90.0, 0)]
fn failing_mappings_are_skipped_and_the_block_completes(
    #[case] threshold: f64,
    #[case] high_scores: u64,
) {
    let dir = tempfile::tempdir().unwrap();
    let cfg = DecoderConfig {
        block_size: 6,
        space_size: 6,
        score_threshold: threshold,
        backend: Backend::Accelerated,
        ..config(dir.path())
    };
    let provider = Arc::new(FlakyProvider {
        calls: AtomicUsize::new(0),
    });

    let mut decoder =
        Decoder::from_sources(cfg.clone(), ["ab"], ["xy"], Some(provider.clone())).unwrap();
    assert_eq!(decoder.engine().provider_name(), "flaky");
    decoder.start().unwrap();
    let snap = decoder.wait_for_completion();

    assert_eq!(provider.calls.load(Ordering::SeqCst), 6);
    assert_eq!(snap.total_mappings, 4);
    assert_eq!(snap.skipped_mappings, 2);
    assert_eq!(snap.total_words, 4);
    assert_eq!(snap.high_score_count, high_scores);
    assert!((snap.highest_score - 83.505149978).abs() < 1e-6);

    let gen = decoder.generator();
    assert_eq!(gen.state().blocks_completed, 1);
    assert!(gen.is_generation_complete());

    let summary = ResultsLog::new(&cfg.results_path).summary().unwrap();
    assert_eq!(summary.total_results, high_scores as usize);
    if high_scores > 0 {
        let log = std::fs::read_to_string(&cfg.results_path).unwrap();
        assert!(!log.contains("Mapping ID: 1\n"));
        assert!(!log.contains("Mapping ID: 4\n"));
        assert!(log.contains("Mapping ID: 5\n"));
    }
}
