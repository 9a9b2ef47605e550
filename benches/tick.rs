//! Tick benchmarks at several population sizes
//!
//! Run with: cargo bench --bench tick

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use rps_royale::config::SimConfig;
use rps_royale::game::clock::ManualClock;
use rps_royale::game::game_loop::Simulation;
use rps_royale::game::population::PopulationCounts;
use rps_royale::game::systems::{collision, movement, targeting};

fn config_with(per_group: usize) -> SimConfig {
    SimConfig {
        initial_per_group: per_group,
        ..SimConfig::default()
    }
}

fn bench_full_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_tick");

    for per_group in [30usize, 90, 200, 400] {
        group.throughput(Throughput::Elements((per_group * 3) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(per_group * 3), &per_group, |b, &n| {
            let clock = ManualClock::new(0);
            let mut sim = Simulation::new(config_with(n), &clock, SmallRng::seed_from_u64(1)).unwrap();
            b.iter(|| {
                clock.advance(16);
                black_box(sim.tick());
            });
        });
    }

    group.finish();
}

fn bench_systems(c: &mut Criterion) {
    let mut group = c.benchmark_group("systems");
    let config = config_with(90);
    let clock = ManualClock::new(0);
    let sim = Simulation::new(config.clone(), &clock, SmallRng::seed_from_u64(2)).unwrap();
    let base = sim.state().clone();
    let counts = PopulationCounts::from_agents(&base.agents);

    group.bench_function("targeting", |b| {
        let mut state = base.clone();
        let mut rng = SmallRng::seed_from_u64(3);
        b.iter(|| targeting::update(black_box(&mut state), &config, &mut rng));
    });

    group.bench_function("movement", |b| {
        let mut state = base.clone();
        let mut rng = SmallRng::seed_from_u64(4);
        b.iter(|| movement::update(black_box(&mut state), &counts, &config, &mut rng));
    });

    group.bench_function("collision", |b| {
        b.iter_batched(
            || base.agents.clone(),
            |mut agents| collision::resolve(black_box(&mut agents), config.eating_distance),
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_full_tick, bench_systems);
criterion_main!(benches);
