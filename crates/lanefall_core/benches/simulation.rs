//! Simulation benchmarks for lanefall_core.
//!
//! Run with: `cargo bench -p lanefall_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lanefall_core::data::MatchConfig;
use lanefall_core::math::Fixed;
use lanefall_core::simulation::Simulation;
use lanefall_test_utils::determinism::{scripted_step, start_match};

/// Plays scripted matches and measures raw tick throughput.
pub fn simulation_benchmark(c: &mut Criterion) {
    let delta = Fixed::ONE >> 4;
    let config = MatchConfig::default();

    c.bench_function("scripted_match_1000_ticks", |b| {
        b.iter(|| {
            let mut sim = start_match(&config);
            for _ in 0..1000 {
                scripted_step(&mut sim, delta);
            }
            black_box(sim.state_hash())
        });
    });

    let mut warmed = start_match(&config);
    for _ in 0..400 {
        scripted_step(&mut warmed, delta);
    }
    c.bench_function("state_hash", |b| b.iter(|| black_box(warmed.state_hash())));
    c.bench_function("serialize_roundtrip", |b| {
        b.iter(|| {
            let bytes = warmed.serialize().unwrap_or_default();
            black_box(Simulation::deserialize(&bytes).is_ok())
        });
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
