//! Evaluation hot path benchmarks: coverage over the practice map catalog and
//! a full assembly pass for growing attempt windows.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use zero_coach::domain::models::{EngineConfig, PracticeState, SeedMode};
use zero_coach::services::{assemble, AssemblyInput, CoverageCalculator};
use zero_coach::{Attempt, AttemptOutcome, TargetCatalog, WindowFilter};

fn generate_attempts(catalog: &TargetCatalog, count: usize) -> Vec<Attempt> {
    let keys: Vec<String> = catalog.iter().map(|t| t.key.to_string()).collect();
    (0..count)
        .map(|i| Attempt {
            id: i as i64 + 1,
            target_key: keys[(i * 7) % keys.len()].clone(),
            outcome: if i % 3 == 0 { AttemptOutcome::Fail } else { AttemptOutcome::Success },
            seed_mode: SeedMode::SetSeed,
            standing_height: None,
            seed: None,
            recorded_at: Utc::now(),
        })
        .collect()
}

fn bench_coverage(c: &mut Criterion) {
    let catalog = TargetCatalog::practice_map();
    let calculator = CoverageCalculator::new(2, 80.0);
    let mut group = c.benchmark_group("coverage");

    for size in [50usize, 500, 5000] {
        let attempts = generate_attempts(&catalog, size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &attempts, |b, attempts| {
            b.iter(|| calculator.calculate(black_box(&catalog), black_box(attempts), Some(0.5)));
        });
    }
    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let catalog = TargetCatalog::practice_map();
    let config = EngineConfig::default();
    let filter = WindowFilter::default();
    let state = PracticeState::new("bench", config.min_streak_to_swap);
    let mut group = c.benchmark_group("assemble");

    for size in [50usize, 500] {
        let attempts = generate_attempts(&catalog, size);
        let input = AssemblyInput {
            catalog: &catalog,
            attempts: &attempts,
            filter: &filter,
            leniency_threshold: None,
            legal_mode: false,
            config: &config,
            now: Utc::now(),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| assemble(black_box(&input), black_box(&state), &mut rng));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_coverage, bench_assemble);
criterion_main!(benches);
