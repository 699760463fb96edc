use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use neorisk::runner::TrialRunner;
use neorisk::{ImpactEngine, ObjectObservation, SimulationConfig, UncertaintyProfile};

/// Full 100k-trial loop on an object whose spread straddles the capture radius.
fn bench_trial_loop(c: &mut Criterion) {
    let profile = UncertaintyProfile::default();
    let config = SimulationConfig::builder()
        .max_trials(100_000)
        .early_stop(false)
        .build()
        .unwrap();
    let obs = ObjectObservation::new("grazer", 12_000.0, 15.0, 9, false);

    c.bench_function("trial_runner/100k_no_early_stop", |b| {
        b.iter_batched(
            || StdRng::seed_from_u64(0xDEADBEEF),
            |mut rng| {
                let run = TrialRunner::run(black_box(&obs), &profile, &config, &mut rng).unwrap();
                black_box(run.impact_count);
            },
            BatchSize::SmallInput,
        )
    });
}

/// Early-stopping run on a far object (one convergence window).
fn bench_early_stop(c: &mut Criterion) {
    let engine = ImpactEngine::new(UncertaintyProfile::default(), SimulationConfig::default())
        .unwrap();
    let obs = ObjectObservation::new("far", 50_000.0, 12.0, 0, false);

    c.bench_function("engine/far_object_early_stop", |b| {
        b.iter(|| black_box(engine.simulate_seeded(black_box(&obs), 42).unwrap()))
    });
}

/// Parallel batch of 64 objects spread over every uncertainty class.
fn bench_batch(c: &mut Criterion) {
    let config = SimulationConfig::builder()
        .max_trials(20_000)
        .build()
        .unwrap();
    let engine = ImpactEngine::new(UncertaintyProfile::default(), config).unwrap();
    let observations: Vec<ObjectObservation> = (0..64)
        .map(|i| {
            ObjectObservation::new(
                format!("obj-{i}"),
                5_000.0 + 1_000.0 * i as f64,
                5.0 + (i % 20) as f64,
                i % 10,
                false,
            )
        })
        .collect();

    let mut group = c.benchmark_group("engine");
    group.sample_size(10);
    group.bench_function("batch_64_objects", |b| {
        b.iter(|| black_box(engine.simulate_batch(black_box(&observations), 7)))
    });
    group.finish();
}

criterion_group!(benches, bench_trial_loop, bench_early_stop, bench_batch);
criterion_main!(benches);
