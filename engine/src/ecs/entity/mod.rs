//! Entity management for the ECS.
//!
//! Entities are lightweight handles that tie components together. A handle carries no data of its
//! own beyond the slot it occupies and the generation of that slot at the time it was handed out.
//!
//! # Architecture
//!
//! - **[`Entity`]**: A packed 64-bit handle. The low 32 bits hold the slot [`Index`], the high 32
//!   bits the [`Generation`]. `u64::MAX` is reserved for [`Entity::INVALID`].
//!
//! - **[`Allocator`]**: Hands out entities, recycles freed slots and tracks entities whose
//!   destruction was deferred until the next sweep.
//!
//! # Generation Tracking
//!
//! Destroying an entity bumps the generation recorded for its slot. Handles created before the
//! bump still carry the old generation and are reported as no longer alive:
//!
//! ```rust
//! use rusty_ecs::ecs::entity::Allocator;
//!
//! let mut allocator = Allocator::default();
//! let entity = allocator.create();
//! allocator.destroy(entity, false);
//! assert!(!allocator.is_alive(entity));
//! ```
//!
//! # Slot Reuse
//!
//! Free slots are consumed first in, first out. When the free list is exhausted the allocator
//! grows by the configured growth offset rather than doubling.

use std::{collections::VecDeque, fmt};

use crate::ecs::{Component, capacity::Capacity};

/// The slot index of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Index(u32);

impl Index {
    /// Get the index as a `usize` for indexing into slot storage.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Get the raw index value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Index {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// The generation of a slot, bumped each time an entity occupying the slot is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    /// The generation of a slot that was never recycled.
    pub const FIRST: Self = Self(0);

    /// Get the next generation from the current.
    #[inline]
    pub const fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Get the raw generation value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

/// A handle to an entity in a [`Context`](crate::ecs::context::Context).
///
/// Handles are ordered by their raw value, which sorts by generation first and index second.
/// Component storages rely on this total order to keep their entity sequences sorted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(u64);

impl Entity {
    /// The handle that never refers to a live entity.
    pub const INVALID: Self = Self(u64::MAX);

    /// Construct a handle from an index and a generation.
    #[inline]
    pub const fn new(index: Index, generation: Generation) -> Self {
        Self(((generation.0 as u64) << 32) | index.0 as u64)
    }

    /// Construct a handle from its packed value.
    #[inline]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// The packed value of this handle.
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The slot index of this handle.
    #[inline]
    pub const fn index(&self) -> Index {
        Index(self.0 as u32)
    }

    /// The generation of this handle.
    #[inline]
    pub const fn generation(&self) -> Generation {
        Generation((self.0 >> 32) as u32)
    }

    /// Whether this is not the [`Entity::INVALID`] handle. Says nothing about liveness.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Entity({}v{})", self.index().0, self.generation().0)
        } else {
            f.write_str("Entity(INVALID)")
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Every entity carries its own handle as a component.
impl Component for Entity {}

/// An allocator for entities.
///
/// Keeps one generation per slot, a FIFO queue of free slots and the list of entities destroyed
/// with deferral since the last [`sweep`](Allocator::sweep).
#[derive(Debug)]
pub struct Allocator {
    /// Current generation of every slot.
    generations: Vec<Generation>,

    /// Slots available for reuse, consumed from the front.
    free: VecDeque<Index>,

    /// Entities destroyed with deferral, awaiting the next sweep.
    sweep: Vec<Entity>,

    /// Number of live entities.
    count: usize,

    /// Sizing policy.
    capacity: Capacity,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new(crate::ecs::capacity::current())
    }
}

impl Allocator {
    /// Construct an allocator with `capacity.size()` free slots.
    pub fn new(capacity: Capacity) -> Self {
        let mut allocator = Self {
            generations: Vec::new(),
            free: VecDeque::new(),
            sweep: Vec::new(),
            count: 0,
            capacity,
        };
        allocator.reset(capacity.size());
        allocator
    }

    /// Allocate a new entity, reusing the oldest free slot. Grows the slot arena when no slot is
    /// free.
    pub fn create(&mut self) -> Entity {
        if self.free.is_empty() {
            self.expand();
        }
        let Some(index) = self.free.pop_front() else {
            unreachable!("allocator expansion produced no free slots");
        };
        self.count += 1;
        Entity::new(index, self.generations[index.index()])
    }

    /// Destroy an entity. With `deferred` the entity is also queued for the next sweep.
    ///
    /// Returns `false` without side effects when the entity is not alive.
    pub fn destroy(&mut self, entity: Entity, deferred: bool) -> bool {
        if !self.is_alive(entity) {
            log::trace!("ignoring destroy of dead entity {entity}");
            return false;
        }
        let index = entity.index();
        let slot = &mut self.generations[index.index()];
        *slot = slot.next();
        self.free.push_back(index);
        self.count -= 1;
        if deferred {
            self.sweep.push(entity);
        }
        true
    }

    /// Whether the entity's generation matches the one currently recorded for its slot.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        entity.is_valid()
            && self
                .generations
                .get(entity.index().index())
                .is_some_and(|generation| *generation == entity.generation())
    }

    /// The number of live entities.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// The number of slots, live or free.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.generations.len()
    }

    /// Entities destroyed with deferral since the last sweep, in destruction order.
    #[inline]
    pub fn sweep_entities(&self) -> &[Entity] {
        &self.sweep
    }

    /// Forget the deferred entities. Called once their destruction has been fully processed.
    #[inline]
    pub fn sweep(&mut self) {
        self.sweep.clear();
    }

    /// Take the deferred entities, leaving the list empty.
    #[inline]
    pub fn take_sweep(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.sweep)
    }

    /// Discard every entity and rebuild the slot arena with `max(size, capacity.size())` slots.
    pub fn resize(&mut self, size: u32) {
        self.reset(self.capacity.storage_capacity(size));
    }

    /// Discard every entity. With `reset_capacity` the arena shrinks back to the baseline size,
    /// otherwise it keeps its current number of slots.
    pub fn clear(&mut self, reset_capacity: bool) {
        let size = if reset_capacity {
            self.capacity.size()
        } else {
            self.generations.len() as u32
        };
        self.reset(size);
    }

    fn reset(&mut self, size: u32) {
        self.generations.clear();
        self.generations.resize(size as usize, Generation::FIRST);
        self.free.clear();
        self.free.extend((0..size).map(Index));
        self.sweep.clear();
        self.count = 0;
    }

    fn expand(&mut self) {
        let start = self.generations.len() as u32;
        let end = self.capacity.grow(start);
        log::debug!("expanding entity slots from {start} to {end}");
        self.generations.resize(end as usize, Generation::FIRST);
        self.free.extend((start..end).map(Index));
    }
}
