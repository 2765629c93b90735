//! Simulation benchmarks for abler_core.
//!
//! Run with: `cargo bench -p abler_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use abler_core::driver::CombatDriver;
use abler_core::math::FRAME_TIME;
use abler_test_utils::fixtures::skirmish;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

/// Full 4v4 battle from placement to outcome, plus a single frame.
pub fn simulation_benchmark(c: &mut Criterion) {
    c.bench_function("skirmish_to_outcome", |b| {
        b.iter_batched(
            || skirmish(42),
            |mut board| {
                let report = CombatDriver::new(&board).run(&mut board);
                black_box(report)
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("skirmish_single_frame", |b| {
        b.iter_batched(
            || skirmish(42),
            |mut board| black_box(board.advance(FRAME_TIME)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
