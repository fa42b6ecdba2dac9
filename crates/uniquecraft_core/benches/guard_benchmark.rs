//! # Uniqueness Guard Benchmark
//!
//! The pre-check runs on every crafting grid change, so `is_available` must
//! stay cheap even with a large crafted set.
//!
//! Run with: `cargo bench --package uniquecraft_core`

// Benchmarks don't need strict docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use uniquecraft_core::{LedgerSnapshot, RecipeId, UniquenessGuard};

fn crafted_snapshot(size: usize) -> LedgerSnapshot {
    (0..size)
        .map(|i| (RecipeId::new(format!("relic_{i}")), true))
        .collect()
}

/// Benchmark: availability lookup against crafted sets of different sizes.
fn bench_is_available(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_available");

    for size in [10, 1_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let guard = UniquenessGuard::from_snapshot(&crafted_snapshot(size));
            let mut i = 0usize;
            b.iter(|| {
                // Half hits, half misses
                let id = if i % 2 == 0 { "relic_0" } else { "unclaimed" };
                i = i.wrapping_add(1);
                black_box(guard.is_available(black_box(id)))
            });
        });
    }

    group.finish();
}

/// Benchmark: claim then release, so every iteration takes the winning path.
fn bench_try_claim(c: &mut Criterion) {
    let guard = UniquenessGuard::new();
    let id = RecipeId::new("golden_sword");

    c.bench_function("try_claim_release", |b| {
        b.iter(|| {
            let won = guard.try_claim(black_box(&id));
            guard.release(id.as_str());
            black_box(won)
        });
    });

    let _ = guard.try_claim(&id);
    c.bench_function("try_claim_lost", |b| {
        b.iter(|| black_box(guard.try_claim(black_box(&id))));
    });
}

criterion_group!(benches, bench_is_available, bench_try_claim);
criterion_main!(benches);
