//! Field update benchmarks at various population sizes
//!
//! Run with: cargo bench --bench field_update

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use agario_sim::config::FieldConfig;
use agario_sim::game::constants::timing::DT;
use agario_sim::game::field::GameField;
use agario_sim::game::systems::{eating, movement};
use agario_sim::util::geometry::intersection_area;
use agario_sim::util::vec2::Vec2;
use hashbrown::HashMap;

/// A running field with `computers` computer players on a proportionally
/// larger map
fn create_field(computers: usize) -> GameField {
    let scale = (computers as f32 / 6.0).sqrt().max(1.0);
    let config = FieldConfig {
        width: 50.0 * scale,
        height: 30.0 * scale,
        start_food: (450.0 * scale * scale) as usize,
        start_delay: 0.0,
        seed: Some(2024),
        ..FieldConfig::default()
    };
    let mut field = GameField::with_defaults(config, "Bench", computers);
    // Let the strategies spread players out and split a few
    for _ in 0..120 {
        field.update(DT);
    }
    field.drain_events();
    field
}

/// Benchmark a full tick (splits, movement, food, eating, respawn, strategies)
fn bench_full_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_tick");
    group.sample_size(30);

    for count in [6, 25, 100, 250] {
        let mut field = create_field(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("update", count), &count, |b, _| {
            b.iter(|| {
                field.update(black_box(DT));
                black_box(field.drain_events());
            })
        });
    }

    group.finish();
}

/// Benchmark position integration alone
fn bench_integrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate");
    group.sample_size(50);

    for count in [25, 100, 250] {
        let field = create_field(count);
        let mut players = field.players().to_vec();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("players", count), &count, |b, _| {
            b.iter(|| movement::integrate(&mut players, black_box(DT)))
        });
    }

    group.finish();
}

/// Benchmark eating resolution on a frozen snapshot
fn bench_eating(c: &mut Criterion) {
    let mut group = c.benchmark_group("eating");
    group.sample_size(50);

    for count in [25, 100, 250] {
        let field = create_field(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("resolve", count), &count, |b, _| {
            b.iter_batched(
                || (field.players().to_vec(), field.food().to_vec()),
                |(mut players, mut food)| {
                    let mut dead = HashMap::new();
                    let mut events = Vec::new();
                    eating::resolve(&mut players, &mut food, &mut dead, &mut events);
                    black_box(events)
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Benchmark the circle intersection area formula
fn bench_intersection_area(c: &mut Criterion) {
    c.bench_function("intersection_area", |b| {
        b.iter(|| {
            intersection_area(
                black_box(Vec2::new(0.0, 0.0)),
                black_box(2.0),
                black_box(Vec2::new(1.5, 0.5)),
                black_box(1.2),
            )
        })
    });
}

criterion_group!(
    benches,
    bench_full_tick,
    bench_integrate,
    bench_eating,
    bench_intersection_area,
);
criterion_main!(benches);
