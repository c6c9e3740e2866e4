// ===== cipherforge/benches/translate_bench.rs =====
use cipherforge::alphabet::Alphabet;
use cipherforge::mapping::Mapping;
use cipherforge::permutation::{ordinal_to_permutation, TOTAL_PERMUTATIONS};
use cipherforge::translate::{MatrixProvider, ParallelProvider, ScalarProvider};
use cipherforge::validator::{DictionaryValidator, Lexicon};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::sync::Arc;

fn random_words(rng: &mut fastrand::Rng, n: usize) -> Vec<u32> {
    let alphabet = Alphabet::source();
    (0..n)
        .map(|_| {
            let len = rng.usize(1..9);
            let word: String = (0..len)
                .map(|_| alphabet.symbol(rng.usize(0..26)).unwrap_or('a'))
                .collect();
            alphabet.encode(&word)
        })
        .collect()
}

fn random_mappings(rng: &mut fastrand::Rng, n: usize) -> Vec<Mapping> {
    (0..n)
        .map(|_| Mapping::from_permutation(&ordinal_to_permutation(rng.u64(0..TOTAL_PERMUTATIONS))))
        .collect()
}

fn translate_benchmark(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(27);
    let mapping = random_mappings(&mut rng, 1)[0];
    let scalar = ScalarProvider;
    let parallel = ParallelProvider::default();

    let mut group = c.benchmark_group("multiply_into");
    for size in [100usize, 10_000, 100_000] {
        let words = random_words(&mut rng, size);
        let mut out = vec![0u32; size];

        group.bench_with_input(BenchmarkId::new("scalar", size), &words, |b, w| {
            b.iter(|| scalar.multiply_into(black_box(w), &mapping, &mut out))
        });
        group.bench_with_input(BenchmarkId::new("parallel", size), &words, |b, w| {
            b.iter(|| parallel.multiply_into(black_box(w), &mapping, &mut out))
        });
    }
    group.finish();

    let words = random_words(&mut rng, 2_000);
    let mappings = random_mappings(&mut rng, 64);
    c.bench_function("multiply_batch (64 mappings x 2k words)", |b| {
        b.iter(|| parallel.multiply_batch(black_box(&words), black_box(&mappings)))
    });
}

fn validate_benchmark(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(7);
    let dictionary = random_words(&mut rng, 5_000);
    let corpus = random_words(&mut rng, 10_000);
    let validator = DictionaryValidator::new(Arc::new(Lexicon::from_masks(dictionary)), 25.0);

    c.bench_function("validate (10k words)", |b| {
        b.iter(|| validator.validate(black_box(&corpus)))
    });
}

criterion_group!(benches, translate_benchmark, validate_benchmark);
criterion_main!(benches);
