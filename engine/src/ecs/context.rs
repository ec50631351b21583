//! The execution context: entities, their components and the query cache.
//!
//! A [`Context`] exclusively owns one entity [`Allocator`], one component [`Registry`] and one
//! query [`Cache`]. Systems receive the context mutably while they run; views borrow from it and
//! cannot outlive it.
//!
//! # Entity lifecycle
//!
//! Every created entity receives three built-in components: its own [`Entity`] handle, a
//! [`Hierarchy`] and a [`Tag`]. Destruction comes in two flavours:
//!
//! - **Immediate**: the entity dies and its components are erased on the spot.
//! - **Deferred**: the entity dies immediately but keeps its components until the next
//!   [`sweep`](Context::sweep), giving other systems one more pass over its data. Destructor
//!   callbacks attached with [`destroy_with`](Context::destroy_with) run during that sweep,
//!   before the components are erased.

use crate::ecs::{
    Component, Entity,
    capacity::{self, Capacity},
    component::{Destructor, Hierarchy, Registry, Set, Tag},
    entity::Allocator,
    query::{Cache, View},
    storage::Storage,
};

/// Entities, components and cached queries for one simulation.
#[derive(Debug)]
pub struct Context {
    entities: Allocator,
    components: Registry,
    cache: Cache,
    capacity: Capacity,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Construct a context sized by the process-wide capacity.
    pub fn new() -> Self {
        Self::with_capacity(capacity::current())
    }

    /// Construct a context sized by an explicit capacity.
    pub fn with_capacity(capacity: Capacity) -> Self {
        Self {
            entities: Allocator::new(capacity),
            components: Registry::new(capacity),
            cache: Cache::new(),
            capacity,
        }
    }

    /// The sizing policy of this context.
    #[inline]
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Discard every entity and component, and size every storage for `size` entries.
    pub fn resize(&mut self, size: u32) {
        log::debug!("resizing context to {size}");
        self.entities.resize(size);
        self.components.resize(size);
        self.cache.clear();
    }

    /// Discard every entity and component.
    pub fn clear(&mut self, reset_capacity: bool) {
        log::debug!("clearing context (reset capacity: {reset_capacity})");
        self.entities.clear(reset_capacity);
        self.components.clear(reset_capacity);
        self.cache.clear();
    }

    /// Create an entity with no tag flags.
    #[inline]
    pub fn create(&mut self) -> Entity {
        self.create_with(Tag::default())
    }

    /// Create an entity whose tag carries `flags`.
    #[inline]
    pub fn create_tagged(&mut self, flags: u64) -> Entity {
        self.create_with(Tag::new(flags))
    }

    /// Create an entity with the given tag.
    pub fn create_with(&mut self, tag: Tag) -> Entity {
        let entity = self.entities.create();
        self.components.append(entity, entity);
        self.components.append(entity, Hierarchy::default());
        self.components.append(entity, tag);
        entity
    }

    /// Destroy an entity. Returns `false` if it was not alive.
    ///
    /// Without `deferred` its components are erased immediately, otherwise on the next sweep.
    pub fn destroy(&mut self, entity: Entity, deferred: bool) -> bool {
        if !self.entities.destroy(entity, deferred) {
            return false;
        }
        if !deferred {
            self.components.sweep(&[entity]);
        }
        true
    }

    /// Destroy an entity and run `callback` once before its components are erased. Returns
    /// `false`, without running the callback, if the entity was not alive.
    ///
    /// With `deferred` the callback runs during the next sweep, otherwise right away.
    pub fn destroy_with(
        &mut self,
        entity: Entity,
        deferred: bool,
        callback: impl FnOnce(&mut Context, Entity) + 'static,
    ) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }
        if !deferred {
            self.entities.destroy(entity, false);
            callback(self, entity);
            self.components.sweep(&[entity]);
            return true;
        }
        if let Some(previous) = self.components.remove::<Destructor>(entity) {
            log::warn!("replacing destructor {previous:?} of {entity}");
        }
        self.components.append(entity, Destructor::new(callback));
        self.entities.destroy(entity, true)
    }

    /// Finish every deferred destruction: run pending destructors, then erase the components of
    /// the destroyed entities.
    ///
    /// Entities destroyed with deferral by a destructor are finished within the same sweep.
    pub fn sweep(&mut self) {
        loop {
            let swept = self.entities.take_sweep();
            if swept.is_empty() {
                break;
            }
            for &entity in &swept {
                let callback = self
                    .components
                    .get_component_mut::<Destructor>(entity)
                    .and_then(Destructor::take);
                if let Some(callback) = callback {
                    callback(self, entity);
                }
            }
            self.components.sweep(&swept);
        }
        self.entities.sweep();
    }

    /// Whether `entity` is alive.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// The number of live entities.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.count()
    }

    /// The number of entity slots, live or free.
    #[inline]
    pub fn entity_capacity(&self) -> usize {
        self.entities.capacity()
    }

    /// Entities destroyed with deferral and awaiting the next sweep.
    #[inline]
    pub fn pending_sweep(&self) -> &[Entity] {
        self.entities.sweep_entities()
    }

    /// Attach `component` to a live entity. Returns `false` if the entity is dead or already
    /// has a `C`.
    pub fn append<C: Component>(&mut self, entity: Entity, component: C) -> bool {
        self.entities.is_alive(entity) && self.components.append(entity, component)
    }

    /// Detach and return the entity's `C`, if any.
    #[inline]
    pub fn remove<C: Component>(&mut self, entity: Entity) -> Option<C> {
        self.components.remove(entity)
    }

    #[inline]
    pub fn get_component<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.components.get_component(entity)
    }

    #[inline]
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        self.components.get_component_mut(entity)
    }

    /// Every stored `C`, in entity order.
    #[inline]
    pub fn components<C: Component>(&self) -> &[C] {
        self.components.components()
    }

    /// The storage for `C`, if it was ever created.
    #[inline]
    pub fn storage<C: Component>(&self) -> Option<&Storage<C>> {
        self.components.storage()
    }

    /// Clear the storage of every type in `S`.
    pub fn clear_types<S: Set>(&mut self, reset_capacity: bool) {
        self.components.clear_types::<S>(reset_capacity);
    }

    /// The component registry.
    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.components
    }

    /// The component registry, mutably.
    #[inline]
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.components
    }

    /// Entities owning every type in `S`, ascending.
    pub fn entities<S: Set>(&mut self) -> &[Entity] {
        self.cache.get::<S>(&mut self.components)
    }

    /// A view over the entities owning every type in `S`.
    pub fn view<S: Set>(&mut self) -> View<'_, S> {
        let entities = self.cache.get::<S>(&mut self.components);
        View::new(&mut self.components, entities)
    }
}
