//! Benchmark utilities for the ECS.
//!
//! Provides representative component types and helpers that populate a context with a seeded,
//! randomised component layout.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p rusty_ecs_bench
//!
//! # Run specific benchmark group
//! cargo bench -p rusty_ecs_bench -- view
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod components;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusty_ecs::ecs::{Entity, capacity::Capacity, context::Context};

use components::{Health, Position, Velocity};

/// Seed shared by every benchmark so runs are comparable.
pub const SEED: u64 = 0xEC5;

/// Create `count` entities. Every entity gets a [`Position`]; a [`Velocity`] and a [`Health`] are
/// attached with the given probabilities.
pub fn populate(context: &mut Context, count: usize, velocity: f64, health: f64) -> Vec<Entity> {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    (0..count)
        .map(|_| {
            let entity = context.create();
            context.append(entity, Position::default());
            if rng.gen_bool(velocity) {
                context.append(
                    entity,
                    Velocity {
                        x: rng.gen_range(-1.0..1.0),
                        y: rng.gen_range(-1.0..1.0),
                        z: 0.0,
                    },
                );
            }
            if rng.gen_bool(health) {
                context.append(entity, Health(rng.gen_range(1..100)));
            }
            entity
        })
        .collect()
}

/// A context sized up front for `count` entities.
pub fn sized_context(count: usize) -> Context {
    let mut context = Context::with_capacity(Capacity::DEFAULT);
    context.resize(count as u32);
    context
}
