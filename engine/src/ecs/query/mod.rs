//! Cached multi-type queries.
//!
//! A query asks for every entity owning one component of each type in a
//! [`Set`](crate::ecs::component::Set). The [`Cache`] memoises the answer per set fingerprint and
//! a [`View`] exposes it for iteration.
//!
//! # Architecture
//!
//! - **[`Cache`]**: One entry per type set, holding the last computed entity list. An entry is
//!   recomputed when it is missing, when any contributing storage is dirty, or when a storage
//!   changed since the entry was computed (tracked through storage revisions, so entries sharing
//!   a type stay coherent).
//!
//! - **Intersection**: Each storage keeps its entities sorted, so the answer is the sorted-merge
//!   intersection of the contributing entity lists, folded smallest list first.
//!
//! - **[`View`]**: Borrows the cached list and the component registry, and yields entities
//!   together with their components.
//!
//! # Usage
//!
//! ```rust
//! use rusty_ecs::ecs::{Component, context::Context};
//!
//! #[derive(Component)]
//! struct Position(f32);
//!
//! #[derive(Component)]
//! struct Velocity(f32);
//!
//! let mut context = Context::new();
//! let entity = context.create();
//! context.append(entity, Position(0.0));
//! context.append(entity, Velocity(2.0));
//!
//! for (_, (position, velocity)) in context.view::<(Position, Velocity)>().iter_mut() {
//!     position.0 += velocity.0;
//! }
//! assert_eq!(context.get_component::<Position>(entity).map(|p| p.0), Some(2.0));
//! ```

mod intersect;
mod view;

use std::collections::HashMap;

pub use intersect::{intersect_all, sorted_intersection};
pub use view::{Iter, IterMut, View};

use crate::ecs::{
    Entity,
    component::{Registry, Set},
    fingerprint::Fingerprint,
};

/// The last computed answer for one type set.
#[derive(Debug, Default)]
struct Entry {
    /// Contributing fingerprints, sorted and deduplicated.
    types: Vec<Fingerprint>,

    /// Revision of each contributing storage when the entry was computed.
    revisions: Vec<Option<u64>>,

    /// Entities owning every contributing type, ascending.
    entities: Vec<Entity>,

    /// How many times the list was computed.
    computations: u64,
}

/// Memoised query answers keyed by type-set fingerprint.
#[derive(Debug, Default)]
pub struct Cache {
    entries: HashMap<Fingerprint, Entry>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The ascending list of entities owning every type in `S`, recomputed if stale.
    ///
    /// Recomputation clears the dirty flag of every contributing storage.
    pub fn get<S: Set>(&mut self, registry: &mut Registry) -> &[Entity] {
        let fingerprint = S::fingerprint();
        let mut types = view::sorted_fingerprints::<S>();
        types.dedup();

        let revisions: Vec<_> = types.iter().map(|t| registry.revision_of(*t)).collect();
        let missing = !self.entries.contains_key(&fingerprint);
        let entry = self.entries.entry(fingerprint).or_default();
        let stale = missing
            || entry.types != types
            || entry.revisions != revisions
            || types.iter().any(|t| registry.is_dirty_of(*t));

        if stale {
            let mut lists = types
                .iter()
                .map(|t| registry.entities_of(*t).unwrap_or_default())
                .collect::<Vec<_>>();
            entry.entities = intersect_all(&mut lists);
            entry.computations += 1;
            for t in &types {
                registry.unmark_dirty_of(*t);
            }
            log::trace!(
                "recomputed query {} ({fingerprint}): {} entities",
                std::any::type_name::<S>(),
                entry.entities.len()
            );
            entry.types = types;
            entry.revisions = revisions;
        }
        &entry.entities
    }

    /// Whether an answer for `S` is cached, stale or not.
    pub fn contains<S: Set>(&self) -> bool {
        self.entries.contains_key(&S::fingerprint())
    }

    /// How many times the answer for `S` has been computed since it was first cached. Zero if it
    /// is not cached.
    pub fn computations<S: Set>(&self) -> u64 {
        self.entries
            .get(&S::fingerprint())
            .map_or(0, |entry| entry.computations)
    }

    /// Forget the answer for `S`.
    pub fn invalidate<S: Set>(&mut self) {
        self.entries.remove(&S::fingerprint());
    }

    /// Forget every answer.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The number of cached type sets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
