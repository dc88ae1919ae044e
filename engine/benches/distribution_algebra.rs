//! Criterion benchmarks for the reward-distribution algebra

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use riskdist_engine::merge::weighted_merge;
use riskdist_engine::truncate::truncate_upper_tail;
use riskdist_engine::{is_strongly_dominating, AccuracyParameters, RewardDistribution};

/// Simple LCG for deterministic pseudo-random supports
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Lcg { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = (self.state.wrapping_mul(1103515245).wrapping_add(12345)) & 0x7fffffff;
        self.state
    }
}

/// Distribution with `size` integer outcomes and uniform mass
fn random_distribution(size: usize, seed: u64, params: &AccuracyParameters) -> RewardDistribution {
    let mut lcg = Lcg::new(seed);
    let p = 1.0 / size as f64;
    let pairs: Vec<(f64, f64)> = (0..size).map(|_| ((lcg.next() % 1_000) as f64, p)).collect();
    RewardDistribution::from_pairs(pairs, params).expect("valid benchmark distribution")
}

fn benchmark_mixture(c: &mut Criterion) {
    let params = AccuracyParameters::EXACT;
    let branches: Vec<RewardDistribution> =
        (0..8).map(|i| random_distribution(256, i, &params)).collect();

    c.bench_function("mixture_8x256", |b| {
        b.iter(|| {
            let weighted = branches.iter().map(|d| (d, 0.125));
            black_box(RewardDistribution::mixture(weighted, &params).unwrap())
        })
    });
}

fn benchmark_weighted_merge(c: &mut Criterion) {
    let params = AccuracyParameters::EXACT;
    let dims: Vec<(Vec<RewardDistribution>, f64)> = (0..3)
        .map(|d| {
            let candidates = (0..6).map(|i| random_distribution(32, d * 10 + i, &params)).collect();
            (candidates, 1.0 / 3.0)
        })
        .collect();

    c.bench_function("weighted_merge_6x6x6", |b| {
        b.iter(|| black_box(weighted_merge(black_box(&dims), 1.0, &params).unwrap()))
    });
}

fn benchmark_truncation_and_dominance(c: &mut Criterion) {
    let params = AccuracyParameters::EXACT;
    let a = random_distribution(1_024, 1, &params);
    let b_dist = random_distribution(1_024, 2, &params);

    c.bench_function("truncate_upper_tail_1024", |b| {
        b.iter(|| black_box(truncate_upper_tail(black_box(&a), 0.1, &params).unwrap()))
    });
    c.bench_function("is_strongly_dominating_1024", |b| {
        b.iter(|| black_box(is_strongly_dominating(black_box(&a), black_box(&b_dist))))
    });
}

criterion_group!(
    benches,
    benchmark_mixture,
    benchmark_weighted_merge,
    benchmark_truncation_and_dominance,
);
criterion_main!(benches);
