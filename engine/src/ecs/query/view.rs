use std::marker::PhantomData;

use crate::ecs::{
    Entity,
    component::{Registry, Set},
    fingerprint::Fingerprint,
};

/// Entities owning every type in `S`, together with access to their components.
///
/// The entity list is resolved once, when the view is built. Components are looked up again on
/// every step of an iterator, so the view always reflects the registry it borrows.
pub struct View<'a, S: Set> {
    registry: &'a mut Registry,
    entities: &'a [Entity],
    _marker: PhantomData<fn() -> S>,
}

impl<'a, S: Set> View<'a, S> {
    /// Build a view over an entity list computed for `S`, typically by the query cache.
    pub fn new(registry: &'a mut Registry, entities: &'a [Entity]) -> Self {
        Self {
            registry,
            entities,
            _marker: PhantomData,
        }
    }

    /// The number of matching entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Matching entities, ascending.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        self.entities
    }

    /// The entity at `position` and its components.
    pub fn get(&self, position: usize) -> Option<(Entity, S::Ref<'_>)> {
        let entity = *self.entities.get(position)?;
        Some((entity, S::fetch(self.registry, entity)?))
    }

    /// Iterate entities with shared access to their components.
    pub fn iter(&self) -> Iter<'_, S> {
        Iter {
            registry: self.registry,
            entities: self.entities,
            position: 0,
            _marker: PhantomData,
        }
    }

    /// Iterate entities with exclusive access to their components.
    ///
    /// # Panics
    ///
    /// If `S` names the same component type more than once.
    pub fn iter_mut(&mut self) -> IterMut<'_, S> {
        let types = sorted_fingerprints::<S>();
        assert!(
            types.windows(2).all(|pair| pair[0] != pair[1]),
            "mutable view over {} names a component type twice",
            std::any::type_name::<S>()
        );
        let pointers = S::pointers(self.registry);
        IterMut {
            pointers,
            entities: self.entities,
            position: 0,
            _marker: PhantomData,
        }
    }
}

impl<'v, S: Set> IntoIterator for &'v View<'_, S> {
    type Item = (Entity, S::Ref<'v>);
    type IntoIter = Iter<'v, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'v, S: Set> IntoIterator for &'v mut View<'_, S> {
    type Item = (Entity, S::Mut<'v>);
    type IntoIter = IterMut<'v, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Shared iterator over a [`View`].
pub struct Iter<'a, S: Set> {
    registry: &'a Registry,
    entities: &'a [Entity],
    position: usize,
    _marker: PhantomData<fn() -> S>,
}

impl<S: Set> Iter<'_, S> {
    /// The position of the next entity to visit.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<'a, S: Set> Iterator for Iter<'a, S> {
    type Item = (Entity, S::Ref<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&entity) = self.entities.get(self.position) {
            self.position += 1;
            if let Some(components) = S::fetch(self.registry, entity) {
                return Some((entity, components));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.entities.len() - self.position))
    }
}

impl<S: Set> PartialEq for Iter<'_, S> {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl<S: Set> Clone for Iter<'_, S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry,
            entities: self.entities,
            position: self.position,
            _marker: PhantomData,
        }
    }
}

/// Exclusive iterator over a [`View`].
pub struct IterMut<'a, S: Set> {
    pointers: S::Ptr,
    entities: &'a [Entity],
    position: usize,
    _marker: PhantomData<&'a mut Registry>,
}

impl<S: Set> IterMut<'_, S> {
    /// The position of the next entity to visit.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<'a, S: Set> Iterator for IterMut<'a, S> {
    type Item = (Entity, S::Mut<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&entity) = self.entities.get(self.position) {
            self.position += 1;
            // SAFETY: The pointers come from the registry exclusively borrowed for 'a, the view
            // checked that S names no type twice, and the entity list is strictly ascending so no
            // component is handed out twice.
            if let Some(components) = unsafe { S::fetch_mut(self.pointers, entity) } {
                return Some((entity, components));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.entities.len() - self.position))
    }
}

impl<S: Set> PartialEq for IterMut<'_, S> {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

/// Fingerprints named by `S`, sorted. Used by views and systems to report their type sets.
pub(crate) fn sorted_fingerprints<S: Set>() -> Vec<Fingerprint> {
    let mut types = Vec::new();
    S::fingerprints(&mut types);
    types.sort_unstable();
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Component, capacity::Capacity, query::Cache};

    #[derive(Component, Debug, PartialEq)]
    struct Position(i32);

    #[derive(Component, Debug, PartialEq)]
    struct Velocity(i32);

    fn setup() -> (Registry, Cache) {
        let mut registry = Registry::new(Capacity::new(8, 8).unwrap());
        for i in 0..6 {
            let entity = Entity::from_raw(i);
            registry.append(entity, Position(i as i32));
            if i % 2 == 0 {
                registry.append(entity, Velocity(1));
            }
        }
        (registry, Cache::new())
    }

    #[test]
    fn iterates_matching_entities_in_order() {
        // Given
        let (mut registry, mut cache) = setup();
        let entities = cache.get::<(Position, Velocity)>(&mut registry);
        let view = View::<(Position, Velocity)>::new(&mut registry, entities);

        // When
        let visited: Vec<_> = view.iter().map(|(e, (p, _))| (e.value(), p.0)).collect();

        // Then
        assert_eq!(view.len(), 3);
        assert_eq!(visited, vec![(0, 0), (2, 2), (4, 4)]);
        assert_eq!(view.get(1).map(|(e, _)| e), Some(Entity::from_raw(2)));
        assert!(view.get(3).is_none());
    }

    #[test]
    fn mutates_components() {
        // Given
        let (mut registry, mut cache) = setup();
        let entities = cache.get::<(Position, Velocity)>(&mut registry);
        let mut view = View::<(Position, Velocity)>::new(&mut registry, entities);

        // When
        for (_, (position, velocity)) in &mut view {
            position.0 += velocity.0 * 10;
        }

        // Then
        let positions: Vec<_> = registry.components::<Position>().iter().map(|p| p.0).collect();
        assert_eq!(positions, vec![10, 1, 12, 3, 14, 5]);
    }

    #[test]
    fn mutable_items_outlive_later_steps() {
        // Given
        let (mut registry, mut cache) = setup();
        let entities = cache.get::<(Position, Velocity)>(&mut registry);
        let mut view = View::<(Position, Velocity)>::new(&mut registry, entities);

        // When - Every item is held before any is written
        let held: Vec<(&mut Position, &mut Velocity)> =
            view.iter_mut().map(|(_, components)| components).collect();
        for (position, velocity) in held {
            position.0 += 100;
            velocity.0 = -1;
        }

        // Then
        let positions: Vec<_> = registry.components::<Position>().iter().map(|p| p.0).collect();
        assert_eq!(positions, vec![100, 1, 102, 3, 104, 5]);
        let velocities: Vec<_> = registry.components::<Velocity>().iter().map(|v| v.0).collect();
        assert_eq!(velocities, vec![-1, -1, -1]);
    }

    #[test]
    fn iterators_compare_by_position() {
        // Given
        let (mut registry, mut cache) = setup();
        let entities = cache.get::<Position>(&mut registry);
        let view = View::<Position>::new(&mut registry, entities);

        // When
        let mut a = view.iter();
        let b = view.iter();

        // Then
        assert!(a == b);
        a.next();
        assert!(a != b);
        assert_eq!(a.position(), 1);

        // When - Restarting yields the same sequence
        let first: Vec<_> = view.iter().map(|(e, _)| e).collect();
        let second: Vec<_> = (&view).into_iter().map(|(e, _)| e).collect();

        // Then
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "names a component type twice")]
    fn mutable_view_rejects_repeated_types() {
        // Given
        let (mut registry, mut cache) = setup();
        let entities = cache.get::<(Position, Position)>(&mut registry);
        let mut view = View::<(Position, Position)>::new(&mut registry, entities);

        // When
        view.iter_mut();
    }

    #[test]
    fn sorted_fingerprints_of_set() {
        let types = sorted_fingerprints::<(Velocity, Position)>();
        assert_eq!(types, sorted_fingerprints::<(Position, Velocity)>());
        assert_eq!(types.len(), 2);
    }
}
