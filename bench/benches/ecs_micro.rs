//! ECS microbenchmarks using Criterion.
//!
//! These benchmarks measure individual ECS operations in isolation:
//! - Entity creation
//! - Component append
//! - View iteration
//! - Query cache recomputation

use std::any::Any;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rusty_ecs::ecs::{ComponentSystem, Entity, world::World};
use rusty_ecs_bench::{components::*, populate, sized_context};

const COUNTS: [usize; 3] = [100, 1_000, 10_000];

// =============================================================================
// Creation Benchmarks
// =============================================================================

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");

    for count in COUNTS {
        group.throughput(Throughput::Elements(count as u64));

        // Growing from the baseline capacity
        group.bench_with_input(BenchmarkId::new("growing", count), &count, |b, &n| {
            b.iter(|| {
                let mut context = sized_context(0);
                for _ in 0..n {
                    black_box(context.create());
                }
            });
        });

        // Slots and storages sized up front
        group.bench_with_input(BenchmarkId::new("presized", count), &count, |b, &n| {
            b.iter(|| {
                let mut context = sized_context(n);
                for _ in 0..n {
                    black_box(context.create());
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// Append Benchmarks
// =============================================================================

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    for count in COUNTS {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("ascending", count), &count, |b, &n| {
            b.iter(|| {
                let mut context = sized_context(n);
                let entities: Vec<Entity> = (0..n).map(|_| context.create()).collect();
                for entity in entities {
                    black_box(context.append(entity, Position::default()));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("descending", count), &count, |b, &n| {
            b.iter(|| {
                let mut context = sized_context(n);
                let entities: Vec<Entity> = (0..n).map(|_| context.create()).collect();
                for entity in entities.into_iter().rev() {
                    black_box(context.append(entity, Position::default()));
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// View Benchmarks
// =============================================================================

struct Integrate;

impl ComponentSystem for Integrate {
    type Components = (Position, Velocity);

    fn on_process(
        &mut self,
        _: Entity,
        (position, velocity): (&mut Position, &mut Velocity),
        _: &mut dyn Any,
    ) {
        position.x += velocity.x;
        position.y += velocity.y;
        position.z += velocity.z;
    }
}

fn bench_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("view");

    for count in COUNTS {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("shared", count), &count, |b, &n| {
            let mut context = sized_context(n);
            populate(&mut context, n, 0.5, 0.5);
            b.iter(|| {
                let view = context.view::<(Position, Velocity)>();
                for (entity, (position, velocity)) in view.iter() {
                    black_box((entity, position.x + velocity.x));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("system", count), &count, |b, &n| {
            let mut world = World::new();
            world.resize(n as u32);
            populate(&mut world, n, 0.5, 0.5);
            world.register(true, Integrate);
            b.iter(|| world.process(&mut ()));
        });
    }

    group.finish();
}

// =============================================================================
// Cache Benchmarks
// =============================================================================

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache");

    for count in COUNTS {
        group.throughput(Throughput::Elements(count as u64));

        // Every lookup follows a change, forcing an intersection
        group.bench_with_input(BenchmarkId::new("recompute", count), &count, |b, &n| {
            let mut context = sized_context(n);
            let entities = populate(&mut context, n, 0.5, 0.5);
            let target = entities[n / 2];
            b.iter(|| {
                context.remove::<Health>(target);
                context.append(target, Health(1));
                black_box(context.entities::<(Position, Velocity, Health)>().len());
            });
        });

        // Lookups with no intervening change
        group.bench_with_input(BenchmarkId::new("cached", count), &count, |b, &n| {
            let mut context = sized_context(n);
            populate(&mut context, n, 0.5, 0.5);
            b.iter(|| black_box(context.entities::<(Position, Velocity, Health)>().len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create, bench_append, bench_view, bench_cache);
criterion_main!(benches);
