//! Benchmarks for arithmetic circuit construction
//!
//! Run with: cargo bench -p qdlog-arith

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qdlog_arith::{
    ArithmeticKind, ModExpBuilder, ModMulBuilder, controlled_constant_adder, ripple_carry_adder,
};

/// Benchmark full exponentiation circuits for each construction
fn bench_mod_exp(c: &mut Criterion) {
    let mut group = c.benchmark_group("mod_exp");

    for kind in ArithmeticKind::ALL {
        for &(a, p) in &[(2u64, 17u64), (3, 101), (5, 1009)] {
            group.bench_with_input(BenchmarkId::new(kind.name(), p), &(a, p), |b, &(a, p)| {
                b.iter(|| kind.build(black_box(4), black_box(a), black_box(p)).unwrap());
            });
        }
    }

    group.finish();
}

/// Benchmark a single controlled multiplication
fn bench_multiplier(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiplier");

    for kind in ArithmeticKind::ALL {
        group.bench_function(kind.name(), |b| {
            b.iter(|| kind.build_multiplier(1, black_box(7), black_box(1009)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the adder primitives
fn bench_adders(c: &mut Criterion) {
    let mut group = c.benchmark_group("adders");

    for n in &[4u32, 16, 32] {
        group.bench_with_input(BenchmarkId::new("ripple_carry", n), n, |b, &n| {
            b.iter(|| ripple_carry_adder(black_box(n)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("constant_borrowed", n), n, |b, &n| {
            b.iter(|| controlled_constant_adder(black_box(n), black_box(-12345)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mod_exp, bench_multiplier, bench_adders);
criterion_main!(benches);
