//! An in-memory entity/component store with a query cache and a sequential system scheduler.
//!
//! The crate is organised in two parts:
//!
//! - [`ecs`]: entities, sorted per-type component storage, the multi-type query cache, views and
//!   the system registry.
//! - [`core`]: ambient engine plumbing shared by hosts (log capture).
//!
//! ```rust
//! use rusty_ecs::ecs::{Component, World};
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut world = World::new();
//! let entity = world.create();
//! world.append(entity, Position { x: 0.0, y: 0.0 });
//! ```

// Allow the derive macros to refer to `::rusty_ecs` from inside this crate.
extern crate self as rusty_ecs;

pub mod core;
pub mod ecs;
