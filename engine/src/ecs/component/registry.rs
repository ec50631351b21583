use std::{any::Any, collections::HashMap};

use crate::ecs::{
    Component, Entity,
    capacity::{self, Capacity},
    component::Set,
    fingerprint::Fingerprint,
    storage::Storage,
};

/// Type-erased operations on one storage, monomorphised for its component type.
///
/// Each function receives the boxed storage it was registered with.
#[derive(Clone, Copy)]
struct Hooks {
    resize: fn(&mut dyn Any, u32),
    clear: fn(&mut dyn Any, bool),
    sweep: fn(&mut dyn Any, &[Entity]) -> usize,
    entities: fn(&dyn Any) -> &[Entity],
    is_dirty: fn(&dyn Any) -> bool,
    unmark_dirty: fn(&mut dyn Any),
    revision: fn(&dyn Any) -> u64,
    len: fn(&dyn Any) -> usize,
}

impl Hooks {
    fn new<C: Component>() -> Self {
        Self {
            resize: |storage, size| {
                if let Some(storage) = storage.downcast_mut::<Storage<C>>() {
                    storage.resize(size);
                }
            },
            clear: |storage, reset_capacity| {
                if let Some(storage) = storage.downcast_mut::<Storage<C>>() {
                    storage.clear(reset_capacity);
                }
            },
            sweep: |storage, entities| {
                storage
                    .downcast_mut::<Storage<C>>()
                    .map_or(0, |storage| storage.sweep(entities))
            },
            entities: |storage| {
                storage
                    .downcast_ref::<Storage<C>>()
                    .map(Storage::entities)
                    .unwrap_or_default()
            },
            is_dirty: |storage| {
                storage
                    .downcast_ref::<Storage<C>>()
                    .is_some_and(Storage::is_dirty)
            },
            unmark_dirty: |storage| {
                if let Some(storage) = storage.downcast_mut::<Storage<C>>() {
                    storage.unmark_dirty();
                }
            },
            revision: |storage| {
                storage
                    .downcast_ref::<Storage<C>>()
                    .map_or(0, Storage::revision)
            },
            len: |storage| {
                storage
                    .downcast_ref::<Storage<C>>()
                    .map_or(0, Storage::len)
            },
        }
    }
}

/// A registered storage and the hooks that reach it without knowing its type.
struct Entry {
    name: &'static str,
    storage: Box<dyn Any>,
    hooks: Hooks,
}

/// The type-erased directory of component storages.
///
/// Storages are created lazily, the first time a component type is used mutably, and registered
/// exactly once. Bulk operations ([`resize`](Registry::resize), [`clear`](Registry::clear),
/// [`sweep`](Registry::sweep)) reach every registered storage through its hooks.
///
/// Read accessors never create storages: a type that was never used reads as empty.
pub struct Registry {
    entries: HashMap<Fingerprint, Entry>,

    /// Capacity requested for every storage, raised to the policy baseline.
    requested: u32,

    policy: Capacity,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(capacity::current())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.names().collect::<Vec<_>>())
            .field("requested", &self.requested)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Registry {
    /// Construct an empty registry.
    pub fn new(policy: Capacity) -> Self {
        Self {
            entries: HashMap::new(),
            requested: 0,
            policy,
        }
    }

    /// The storage for `C`, created and registered on first use.
    ///
    /// # Panics
    ///
    /// If another type already registered a storage under the same fingerprint.
    pub fn storage_mut<C: Component>(&mut self) -> &mut Storage<C> {
        let fingerprint = Fingerprint::of::<C>();
        let (policy, requested) = (self.policy, self.requested);
        let entry = self.entries.entry(fingerprint).or_insert_with(|| {
            log::debug!(
                "registering storage for {} ({fingerprint})",
                std::any::type_name::<C>()
            );
            Entry {
                name: std::any::type_name::<C>(),
                storage: Box::new(Storage::<C>::new(policy, requested)),
                hooks: Hooks::new::<C>(),
            }
        });
        let name = entry.name;
        entry
            .storage
            .downcast_mut::<Storage<C>>()
            .unwrap_or_else(|| {
                panic!(
                    "fingerprint collision between '{name}' and '{}'",
                    std::any::type_name::<C>()
                )
            })
    }

    /// The storage for `C`, if it was ever created.
    pub fn storage<C: Component>(&self) -> Option<&Storage<C>> {
        self.entries
            .get(&Fingerprint::of::<C>())?
            .storage
            .downcast_ref::<Storage<C>>()
    }

    /// The storage for `C`, mutably, if it was ever created.
    pub fn storage_mut_if_present<C: Component>(&mut self) -> Option<&mut Storage<C>> {
        self.entries
            .get_mut(&Fingerprint::of::<C>())?
            .storage
            .downcast_mut::<Storage<C>>()
    }

    /// Attach `component` to `entity`. Returns `false` if the entity already has a `C`.
    #[inline]
    pub fn append<C: Component>(&mut self, entity: Entity, component: C) -> bool {
        self.storage_mut::<C>().append(entity, component)
    }

    /// Detach and return the entity's `C`, if any.
    #[inline]
    pub fn remove<C: Component>(&mut self, entity: Entity) -> Option<C> {
        self.storage_mut::<C>().remove(entity)
    }

    #[inline]
    pub fn get_component<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.storage::<C>()?.get(entity)
    }

    #[inline]
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        self.storage_mut_if_present::<C>()?.get_mut(entity)
    }

    /// Whether the entity has a `C`.
    #[inline]
    pub fn contains<C: Component>(&self, entity: Entity) -> bool {
        self.storage::<C>().is_some_and(|storage| storage.contains(entity))
    }

    /// Every stored `C`, in entity order.
    pub fn components<C: Component>(&self) -> &[C] {
        self.storage::<C>()
            .map(Storage::components)
            .unwrap_or_default()
    }

    /// Every entity owning a `C`, ascending.
    pub fn entities<C: Component>(&self) -> &[Entity] {
        self.storage::<C>()
            .map(Storage::entities)
            .unwrap_or_default()
    }

    /// The number of stored `C` components.
    pub fn count<C: Component>(&self) -> usize {
        self.storage::<C>().map_or(0, Storage::len)
    }

    /// The logical capacity of the `C` storage, or 0 if it does not exist yet.
    pub fn capacity<C: Component>(&self) -> usize {
        self.storage::<C>().map_or(0, Storage::capacity)
    }

    pub fn is_dirty<C: Component>(&self) -> bool {
        self.storage::<C>().is_some_and(Storage::is_dirty)
    }

    /// Remove the entity's component of every type in `S`.
    pub fn remove_set<S: Set>(&mut self, entity: Entity) {
        S::remove(self, entity);
    }

    /// Clear the storage of every type in `S`.
    pub fn clear_types<S: Set>(&mut self, reset_capacity: bool) {
        S::clear(self, reset_capacity);
    }

    /// Clear the dirty flag of every type in `S`.
    pub fn unmark_dirty<S: Set>(&mut self) {
        S::unmark_dirty(self);
    }

    /// Whether any storage of `S` is dirty.
    pub fn are_dirty<S: Set>(&self) -> bool {
        S::any_dirty(self)
    }

    /// Discard every component and resize every storage, present and future, to
    /// `max(size, policy.size())`.
    pub fn resize(&mut self, size: u32) {
        self.requested = size;
        for entry in self.entries.values_mut() {
            (entry.hooks.resize)(entry.storage.as_mut(), size);
        }
    }

    /// Discard every component of every type.
    pub fn clear(&mut self, reset_capacity: bool) {
        if reset_capacity {
            self.requested = 0;
        }
        for entry in self.entries.values_mut() {
            (entry.hooks.clear)(entry.storage.as_mut(), reset_capacity);
        }
    }

    /// Remove the components of the listed entities from every storage. Returns how many
    /// components were removed in total.
    ///
    /// The list may be in any order and hold duplicates; it is sorted once for all storages.
    pub fn sweep(&mut self, entities: &[Entity]) -> usize {
        if entities.is_empty() {
            return 0;
        }
        let mut sorted = entities.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let removed = self
            .entries
            .values_mut()
            .map(|entry| (entry.hooks.sweep)(entry.storage.as_mut(), &sorted))
            .sum();
        log::trace!("swept {removed} components of {} entities", sorted.len());
        removed
    }

    /// The number of registered storages.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of every registered component type, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.values().map(|entry| entry.name)
    }

    /// Whether a storage is registered under `fingerprint`.
    #[inline]
    pub fn contains_type(&self, fingerprint: Fingerprint) -> bool {
        self.entries.contains_key(&fingerprint)
    }

    /// Entities of the storage registered under `fingerprint`.
    pub fn entities_of(&self, fingerprint: Fingerprint) -> Option<&[Entity]> {
        let entry = self.entries.get(&fingerprint)?;
        Some((entry.hooks.entities)(entry.storage.as_ref()))
    }

    /// The number of components in the storage registered under `fingerprint`.
    pub fn len_of(&self, fingerprint: Fingerprint) -> usize {
        self.entries
            .get(&fingerprint)
            .map_or(0, |entry| (entry.hooks.len)(entry.storage.as_ref()))
    }

    pub fn is_dirty_of(&self, fingerprint: Fingerprint) -> bool {
        self.entries
            .get(&fingerprint)
            .is_some_and(|entry| (entry.hooks.is_dirty)(entry.storage.as_ref()))
    }

    pub fn unmark_dirty_of(&mut self, fingerprint: Fingerprint) {
        if let Some(entry) = self.entries.get_mut(&fingerprint) {
            (entry.hooks.unmark_dirty)(entry.storage.as_mut());
        }
    }

    /// The revision of the storage registered under `fingerprint`, if any.
    pub fn revision_of(&self, fingerprint: Fingerprint) -> Option<u64> {
        let entry = self.entries.get(&fingerprint)?;
        Some((entry.hooks.revision)(entry.storage.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Component, Debug, PartialEq)]
    struct Position(i32, i32);

    #[derive(Component, Debug, PartialEq)]
    struct Velocity(i32, i32);

    #[derive(Component)]
    struct Marker;

    fn entity(value: u64) -> Entity {
        Entity::from_raw(value)
    }

    fn registry() -> Registry {
        Registry::new(Capacity::new(4, 2).unwrap())
    }

    #[test]
    fn storages_are_created_lazily_once() {
        // Given
        let mut registry = registry();
        assert!(registry.is_empty());
        assert_eq!(registry.capacity::<Position>(), 0);
        assert_eq!(registry.get_component::<Position>(entity(0)), None);
        assert!(registry.is_empty());

        // When
        registry.append(entity(0), Position(1, 2));
        registry.append(entity(1), Position(3, 4));

        // Then
        assert_eq!(registry.len(), 1);
        assert!(registry.contains_type(Fingerprint::of::<Position>()));
        assert_eq!(registry.capacity::<Position>(), 4);
        assert_eq!(registry.count::<Position>(), 2);
        assert!(registry.names().next().unwrap().ends_with("Position"));
    }

    #[test]
    fn typed_accessors() {
        // Given
        let mut registry = registry();
        registry.append(entity(2), Position(2, 2));
        registry.append(entity(1), Position(1, 1));

        // When
        registry.get_component_mut::<Position>(entity(2)).unwrap().0 = 20;

        // Then
        assert_eq!(
            registry.components::<Position>(),
            &[Position(1, 1), Position(20, 2)]
        );
        assert_eq!(registry.entities::<Position>(), &[entity(1), entity(2)]);
        assert!(registry.contains::<Position>(entity(1)));
        assert!(!registry.contains::<Velocity>(entity(1)));
        assert_eq!(registry.remove::<Position>(entity(1)), Some(Position(1, 1)));
        assert_eq!(registry.remove::<Position>(entity(1)), None);
    }

    #[test]
    fn duplicate_append_keeps_original() {
        // Given
        let mut registry = registry();
        assert!(registry.append(entity(0), Velocity(1, 1)));

        // When
        let appended = registry.append(entity(0), Velocity(2, 2));

        // Then
        assert!(!appended);
        assert_eq!(registry.get_component::<Velocity>(entity(0)), Some(&Velocity(1, 1)));
    }

    #[test]
    fn sweep_accepts_unsorted_duplicates() {
        // Given
        let mut registry = registry();
        for i in 0..5 {
            registry.append(entity(i), Position(0, 0));
        }
        registry.append(entity(3), Velocity(0, 0));

        // When
        let removed = registry.sweep(&[entity(3), entity(1), entity(3), entity(1)]);

        // Then
        assert_eq!(removed, 3);
        assert_eq!(registry.entities::<Position>(), &[entity(0), entity(2), entity(4)]);
        assert!(registry.entities::<Velocity>().is_empty());
    }

    #[test]
    fn bulk_operations_reach_every_storage() {
        // Given
        let mut registry = registry();
        for i in 0..3 {
            registry.append(entity(i), Position(0, 0));
            registry.append(entity(i), Velocity(0, 0));
        }

        // When
        let removed = registry.sweep(&[entity(0), entity(2)]);

        // Then
        assert_eq!(removed, 4);
        assert_eq!(registry.entities::<Position>(), &[entity(1)]);
        assert_eq!(registry.entities::<Velocity>(), &[entity(1)]);

        // When
        registry.resize(10);

        // Then - Existing and future storages use the requested size
        assert_eq!(registry.count::<Position>(), 0);
        assert_eq!(registry.capacity::<Velocity>(), 10);
        registry.append(entity(0), Marker);
        assert_eq!(registry.capacity::<Marker>(), 10);

        // When
        registry.clear(true);

        // Then
        assert_eq!(registry.count::<Marker>(), 0);
        assert_eq!(registry.capacity::<Marker>(), 4);
    }

    #[test]
    fn erased_accessors_match_typed() {
        // Given
        let mut registry = registry();
        registry.append(entity(3), Position(0, 0));
        registry.append(entity(1), Position(0, 0));
        let fingerprint = Fingerprint::of::<Position>();

        // Then
        assert_eq!(registry.entities_of(fingerprint), Some(&[entity(1), entity(3)][..]));
        assert_eq!(registry.len_of(fingerprint), 2);
        assert!(registry.is_dirty_of(fingerprint));
        assert_eq!(registry.revision_of(fingerprint), Some(2));
        assert_eq!(registry.entities_of(Fingerprint::of::<Velocity>()), None);
        assert_eq!(registry.revision_of(Fingerprint::of::<Velocity>()), None);

        // When
        registry.unmark_dirty_of(fingerprint);

        // Then
        assert!(!registry.is_dirty::<Position>());
    }

    #[test]
    fn set_helpers() {
        // Given
        let mut registry = registry();
        registry.append(entity(0), Position(0, 0));
        registry.append(entity(0), Velocity(0, 0));

        // When
        registry.unmark_dirty::<(Position, Velocity)>();

        // Then
        assert!(!registry.are_dirty::<(Position, Velocity)>());

        // When
        registry.remove_set::<(Position, Velocity)>(entity(0));

        // Then
        assert!(registry.are_dirty::<(Velocity, Position)>());
        assert_eq!(registry.count::<Position>(), 0);
        assert_eq!(registry.count::<Velocity>(), 0);

        // When
        registry.append(entity(1), Position(0, 0));
        registry.clear_types::<Position>(false);

        // Then
        assert_eq!(registry.count::<Position>(), 0);
        assert!(registry.is_dirty::<Position>());
    }
}
