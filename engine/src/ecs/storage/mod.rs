//! Per-type component storage.
//!
//! Each component type gets one [`Storage`], a pair of parallel dense arrays:
//!
//! ```text
//! entities:   [E3, E7, E9, E12]   ← strictly ascending, unique
//! components: [C3, C7, C9, C12]   ← components[i] belongs to entities[i]
//! ```
//!
//! Keeping the entity array sorted gives `O(log n)` lookup through binary search, and lets the
//! query cache intersect the entity arrays of several storages with a linear sorted merge.
//!
//! # Change tracking
//!
//! A storage tracks changes in two ways:
//!
//! - A **dirty flag**, set by every structural change and cleared by whoever consumed the change
//!   (usually the query cache).
//! - A **revision** counter that only ever increases. Unlike the flag it cannot be cleared by one
//!   observer on behalf of another, so several cache entries sharing a storage can each tell
//!   whether they are stale.
//!
//! # Capacity
//!
//! The storage follows the same policy as the entity allocator: it starts at
//! `max(requested, size)` slots and grows by the configured offset whenever it is full.

use crate::ecs::{Component, Entity, capacity::Capacity};

/// Sorted dense storage for one component type.
#[derive(Debug)]
pub struct Storage<C: Component> {
    /// Owning entities, strictly ascending.
    entities: Vec<Entity>,

    /// Component values, parallel to `entities`.
    components: Vec<C>,

    /// Logical capacity under the growth policy.
    capacity: usize,

    /// Set by structural changes, cleared by consumers.
    dirty: bool,

    /// Bumped by every structural change.
    revision: u64,

    /// Sizing policy.
    policy: Capacity,
}

impl<C: Component> Default for Storage<C> {
    fn default() -> Self {
        Self::new(crate::ecs::capacity::current(), 0)
    }
}

impl<C: Component> Storage<C> {
    /// Construct an empty storage with room for `max(requested, policy.size())` components.
    pub fn new(policy: Capacity, requested: u32) -> Self {
        let capacity = policy.storage_capacity(requested) as usize;
        Self {
            entities: Vec::with_capacity(capacity),
            components: Vec::with_capacity(capacity),
            capacity,
            dirty: false,
            revision: 0,
            policy,
        }
    }

    /// The position of `entity`, or the position it would be inserted at.
    #[inline]
    fn find(&self, entity: Entity) -> Result<usize, usize> {
        self.entities.binary_search(&entity)
    }

    /// Attach `component` to `entity`, keeping entities sorted.
    ///
    /// Returns `false` and drops `component` when the entity already owns one of this type. The
    /// existing value is kept and the storage is not dirtied.
    pub fn append(&mut self, entity: Entity, component: C) -> bool {
        let Err(position) = self.find(entity) else {
            return false;
        };
        if self.entities.len() == self.capacity {
            self.expand();
        }
        self.entities.insert(position, entity);
        self.components.insert(position, component);
        self.changed();
        true
    }

    /// Detach and return the component owned by `entity`, if any.
    pub fn remove(&mut self, entity: Entity) -> Option<C> {
        let position = self.find(entity).ok()?;
        self.entities.remove(position);
        let component = self.components.remove(position);
        self.changed();
        Some(component)
    }

    /// The component owned by `entity`, if any.
    #[inline]
    pub fn get(&self, entity: Entity) -> Option<&C> {
        let position = self.find(entity).ok()?;
        Some(&self.components[position])
    }

    /// The component owned by `entity`, if any, mutably. Does not dirty the storage.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut C> {
        let position = self.find(entity).ok()?;
        Some(&mut self.components[position])
    }

    /// Whether `entity` owns a component of this type.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.find(entity).is_ok()
    }

    /// Remove the components of every listed entity. Returns how many were removed.
    ///
    /// The list may be in any order and hold duplicates. Ascending lists, such as the ones the
    /// registry passes, are merged against the storage in one linear pass.
    pub fn sweep(&mut self, entities: &[Entity]) -> usize {
        let before = self.entities.len();
        if before == 0 || entities.is_empty() {
            return 0;
        }

        let sorted;
        let entities = if entities.is_sorted() {
            entities
        } else {
            sorted = {
                let mut sorted = entities.to_vec();
                sorted.sort_unstable();
                sorted
            };
            &sorted[..]
        };

        let old_entities = std::mem::take(&mut self.entities);
        let old_components = std::mem::take(&mut self.components);
        self.entities = Vec::with_capacity(old_entities.capacity());
        self.components = Vec::with_capacity(old_components.capacity());
        let mut swept = entities.iter().copied().peekable();
        for (entity, component) in old_entities.into_iter().zip(old_components) {
            while swept.next_if(|&next| next < entity).is_some() {}
            if swept.peek() != Some(&entity) {
                self.entities.push(entity);
                self.components.push(component);
            }
        }

        let removed = before - self.entities.len();
        if removed > 0 {
            self.changed();
        }
        removed
    }

    /// Discard every component and set the capacity to `max(size, policy.size())`.
    ///
    /// The storage ends up clean: nothing remains for a cache to observe.
    pub fn resize(&mut self, size: u32) {
        let capacity = self.policy.storage_capacity(size) as usize;
        self.entities = Vec::with_capacity(capacity);
        self.components = Vec::with_capacity(capacity);
        self.capacity = capacity;
        self.dirty = false;
        self.revision += 1;
    }

    /// Discard every component.
    ///
    /// With `reset_capacity` the capacity returns to the baseline and the storage ends up clean.
    /// Otherwise the capacity is kept and the storage is marked dirty.
    pub fn clear(&mut self, reset_capacity: bool) {
        self.entities.clear();
        self.components.clear();
        if reset_capacity {
            self.capacity = self.policy.size() as usize;
            self.entities.shrink_to(self.capacity);
            self.components.shrink_to(self.capacity);
            self.dirty = false;
        } else {
            self.dirty = true;
        }
        self.revision += 1;
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn unmark_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// A counter bumped by every structural change.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The number of stored components.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The logical capacity under the growth policy.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Owning entities in ascending order.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Component values, parallel to [`entities`](Storage::entities).
    #[inline]
    pub fn components(&self) -> &[C] {
        &self.components
    }

    /// Component values, mutably. The entity order cannot be changed through this slice.
    #[inline]
    pub fn components_mut(&mut self) -> &mut [C] {
        &mut self.components
    }

    /// Raw views of the entity and component arrays, for handing out several components mutably
    /// at once. See [`RawParts`].
    pub fn raw_parts(&mut self) -> RawParts<C> {
        RawParts {
            entities: self.entities.as_ptr(),
            components: self.components.as_mut_ptr(),
            len: self.entities.len(),
        }
    }

    /// Iterate `(entity, component)` pairs in entity order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &C)> {
        self.entities.iter().copied().zip(self.components.iter())
    }

    fn changed(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    fn expand(&mut self) {
        let capacity = self.policy.grow(self.capacity as u32) as usize;
        log::debug!(
            "expanding storage of {} from {} to {capacity}",
            std::any::type_name::<C>(),
            self.capacity
        );
        self.entities.reserve_exact(capacity - self.entities.len());
        self.components.reserve_exact(capacity - self.components.len());
        self.capacity = capacity;
    }
}

/// Raw pointers to the arrays of a [`Storage`], taken once from an exclusive borrow.
///
/// Components are reached through the pointers one element at a time, so references handed out
/// for distinct entities never overlap, and no borrow of the whole storage is created while they
/// are alive.
pub struct RawParts<C> {
    entities: *const Entity,
    components: *mut C,
    len: usize,
}

impl<C> Clone for RawParts<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for RawParts<C> {}

impl<C> RawParts<C> {
    /// The number of stored components when the parts were taken.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The component owned by `entity`, if any, mutably.
    ///
    /// # Safety
    ///
    /// The storage the parts were taken from must be alive, unmoved and not accessed through any
    /// other path for `'a`. No other reference to the returned component may exist for `'a`.
    pub unsafe fn get_mut<'a>(self, entity: Entity) -> Option<&'a mut C> {
        // SAFETY: The caller guarantees the arrays are alive and unchanged, so the first `len`
        // entities are initialised. Only shared access is made to them.
        let entities = unsafe { std::slice::from_raw_parts(self.entities, self.len) };
        let position = entities.binary_search(&entity).ok()?;
        // SAFETY: `position < len`, and only this element of the component array is borrowed.
        Some(unsafe { &mut *self.components.add(position) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::entity::{Generation, Index};

    #[derive(Debug, PartialEq)]
    struct Health(u32);
    impl Component for Health {}

    fn entity(index: u32) -> Entity {
        Entity::new(Index::from(index), Generation::FIRST)
    }

    fn storage() -> Storage<Health> {
        Storage::new(Capacity::new(4, 2).unwrap(), 0)
    }

    #[test]
    fn append_keeps_entities_sorted() {
        // Given
        let mut storage = storage();

        // When
        for i in [5, 1, 9, 3, 7] {
            assert!(storage.append(entity(i), Health(i * 10)));
        }

        // Then
        let indices: Vec<_> = storage.entities().iter().map(|e| e.index().value()).collect();
        assert_eq!(indices, vec![1, 3, 5, 7, 9]);
        let values: Vec<_> = storage.components().iter().map(|h| h.0).collect();
        assert_eq!(values, vec![10, 30, 50, 70, 90]);
        assert!(storage.is_dirty());
    }

    #[test]
    fn duplicate_append_is_rejected() {
        // Given
        let mut storage = storage();
        storage.append(entity(1), Health(1));
        storage.unmark_dirty();
        let revision = storage.revision();

        // When
        let appended = storage.append(entity(1), Health(2));

        // Then - Original value kept, nothing changed
        assert!(!appended);
        assert_eq!(storage.get(entity(1)), Some(&Health(1)));
        assert_eq!(storage.len(), 1);
        assert!(!storage.is_dirty());
        assert_eq!(storage.revision(), revision);
    }

    #[test]
    fn remove_and_get_missing() {
        // Given
        let mut storage = storage();
        storage.append(entity(2), Health(2));
        storage.unmark_dirty();

        // Then
        assert_eq!(storage.get(entity(3)), None);
        assert_eq!(storage.get_mut(entity(3)), None);
        assert_eq!(storage.remove(entity(3)), None);
        assert!(!storage.is_dirty());

        // When
        let removed = storage.remove(entity(2));

        // Then
        assert_eq!(removed, Some(Health(2)));
        assert!(storage.is_empty());
        assert!(storage.is_dirty());
    }

    #[test]
    fn get_mut_changes_value() {
        // Given
        let mut storage = storage();
        storage.append(entity(0), Health(1));

        // When
        storage.get_mut(entity(0)).unwrap().0 = 42;

        // Then
        assert_eq!(storage.get(entity(0)), Some(&Health(42)));
        assert!(storage.contains(entity(0)));
        assert!(!storage.contains(entity(1)));
    }

    #[test]
    fn grows_by_offset() {
        // Given
        let mut storage = storage();
        assert_eq!(storage.capacity(), 4);

        // When
        for i in 0..5 {
            storage.append(entity(i), Health(i));
        }

        // Then
        assert_eq!(storage.capacity(), 6);

        // When
        for i in 5..7 {
            storage.append(entity(i), Health(i));
        }

        // Then
        assert_eq!(storage.capacity(), 8);
    }

    #[test]
    fn requested_capacity_above_baseline() {
        let storage: Storage<Health> = Storage::new(Capacity::new(4, 2).unwrap(), 10);
        assert_eq!(storage.capacity(), 10);
    }

    #[test]
    fn sweep_removes_listed_entities() {
        // Given
        let mut storage = storage();
        for i in 0..6 {
            storage.append(entity(i), Health(i));
        }
        storage.unmark_dirty();

        // When
        let removed = storage.sweep(&[entity(1), entity(4), entity(100)]);

        // Then
        assert_eq!(removed, 2);
        let pairs: Vec<_> = storage.iter().map(|(e, h)| (e.index().value(), h.0)).collect();
        assert_eq!(pairs, vec![(0, 0), (2, 2), (3, 3), (5, 5)]);
        assert!(storage.is_dirty());

        // When - Nothing listed is present
        storage.unmark_dirty();
        assert_eq!(storage.sweep(&[entity(1)]), 0);

        // Then
        assert!(!storage.is_dirty());
    }

    #[test]
    fn sweep_accepts_unsorted_duplicates() {
        // Given
        let mut storage = storage();
        for i in 0..8 {
            storage.append(entity(i), Health(i));
        }

        // When
        let removed = storage.sweep(&[entity(6), entity(2), entity(6), entity(9), entity(0)]);

        // Then
        assert_eq!(removed, 3);
        let indices: Vec<_> = storage.entities().iter().map(|e| e.index().value()).collect();
        assert_eq!(indices, vec![1, 3, 4, 5, 7]);
        let values: Vec<_> = storage.components().iter().map(|h| h.0).collect();
        assert_eq!(values, vec![1, 3, 4, 5, 7]);
    }

    #[test]
    fn raw_parts_hand_out_disjoint_components() {
        // Given
        let mut storage = storage();
        for i in [4, 2, 8] {
            storage.append(entity(i), Health(i));
        }
        let parts = storage.raw_parts();

        // When - Every component is held at once, then written
        // SAFETY: The storage is not touched while the references live, and entities are distinct.
        let held: Vec<&mut Health> = [2, 4, 8, 5]
            .into_iter()
            .filter_map(|i| unsafe { parts.get_mut(entity(i)) })
            .collect();
        for health in held {
            health.0 += 100;
        }

        // Then
        assert_eq!(parts.len(), 3);
        let values: Vec<_> = storage.components().iter().map(|h| h.0).collect();
        assert_eq!(values, vec![102, 104, 108]);
    }

    #[test]
    fn resize_and_clear() {
        // Given
        let mut storage = storage();
        for i in 0..5 {
            storage.append(entity(i), Health(i));
        }

        // When
        storage.resize(12);

        // Then
        assert!(storage.is_empty());
        assert_eq!(storage.capacity(), 12);
        assert!(!storage.is_dirty());

        // When
        storage.append(entity(1), Health(1));
        storage.clear(false);

        // Then - Capacity kept, dirty for observers
        assert!(storage.is_empty());
        assert_eq!(storage.capacity(), 12);
        assert!(storage.is_dirty());

        // When
        storage.clear(true);

        // Then
        assert_eq!(storage.capacity(), 4);
        assert!(!storage.is_dirty());
    }

    #[test]
    fn revision_increases_on_every_change() {
        // Given
        let mut storage = storage();
        let mut last = storage.revision();
        let mut check = |storage: &Storage<Health>| {
            assert!(storage.revision() > last);
            last = storage.revision();
        };

        // Then
        storage.append(entity(0), Health(0));
        check(&storage);
        storage.remove(entity(0));
        check(&storage);
        storage.resize(0);
        check(&storage);
        storage.clear(true);
        check(&storage);
    }

    #[test]
    fn sorted_invariant_under_random_operations() {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        // Given
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut storage = storage();

        // When
        for _ in 0..2_000 {
            let target = entity(rng.gen_range(0..64));
            if rng.gen_bool(0.6) {
                storage.append(target, Health(target.index().value()));
            } else {
                storage.remove(target);
            }
        }

        // Then
        assert!(storage.entities().windows(2).all(|w| w[0] < w[1]));
        for (entity, health) in storage.iter() {
            assert_eq!(entity.index().value(), health.0);
        }
    }
}
