//! Criterion benchmarks for ticks under heavy particle churn.

use beaker_sim::BeakerSim;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

fn busy_beaker(reactions: usize) -> BeakerSim {
    let mut sim = BeakerSim::new();
    sim.set_beaker_bounds([-1.0, 0.0, -1.0], [1.0, 3.0, 1.0]);
    sim.add_chemical("h2o").ok();
    for _ in 0..reactions {
        sim.add_chemical("k").ok();
        sim.add_chemical("cuso4").ok();
        sim.add_chemical("naoh").ok();
    }
    sim.toggle_stir();
    sim.select_chemical("h2o").ok();
    sim.begin_pour(0.5, 0.5).ok();
    sim.advance_ticks(10);
    sim
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for reactions in [1usize, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(reactions),
            &reactions,
            |b, &reactions| {
                let mut sim = busy_beaker(reactions);
                b.iter(|| sim.advance_ticks(1));
            },
        );
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut sim = busy_beaker(4);
    c.bench_function("snapshot_json", |b| {
        b.iter(|| {
            sim.advance_ticks(1);
            sim.snapshot_json()
        })
    });
}

criterion_group!(benches, bench_tick, bench_snapshot);
criterion_main!(benches);
