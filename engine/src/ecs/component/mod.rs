//! Component management for the ECS.
//!
//! Components are the data fragments attached to entities. Every component type gets its own
//! sorted [`Storage`](crate::ecs::storage::Storage), created lazily by the [`Registry`] the first
//! time the type is used.
//!
//! ## Architecture
//!
//! - [`Component`]: The marker trait every component type implements, usually through
//!   `#[derive(Component)]`.
//! - [`Set`]: A type-level list of component types (a single type or a tuple), used to address
//!   several storages at once.
//! - [`Registry`]: The type-erased directory of storages, keyed by
//!   [`Fingerprint`](crate::ecs::fingerprint::Fingerprint).
//! - [`Tag`], [`Hierarchy`], [`Destructor`]: Built-in components managed by the
//!   [`Context`](crate::ecs::context::Context).
//!
//! ## Usage
//!
//! ```rust
//! use rusty_ecs::ecs::{Entity, component::{Component, Registry}};
//!
//! #[derive(Component, Debug, PartialEq)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut registry = Registry::default();
//! let entity = Entity::from_raw(0);
//! registry.append(entity, Position { x: 1.0, y: 2.0 });
//! assert_eq!(registry.get_component::<Position>(entity), Some(&Position { x: 1.0, y: 2.0 }));
//! ```

mod builtin;
mod registry;
mod set;

pub use builtin::{Destructor, DestructorFn, Hierarchy, Tag};
pub use registry::Registry;
pub use set::Set;

/// Derive the [`Component`] marker for a struct or enum.
pub use rusty_ecs_macros::Component;

/// A trait representing a component in the ECS.
///
/// At present this only sets the required trait bounds for a type to be used as a component.
pub trait Component: 'static {}
