use crate::{
    all_tuples,
    ecs::{
        Component, Entity, component::Registry, fingerprint::Fingerprint, storage::RawParts,
    },
};

/// A type-level list of component types.
///
/// Implemented for every [`Component`], for `()` and for tuples of sets up to 26 elements. A set
/// addresses the storages of all its types at once: its [`fingerprint`](Set::fingerprint) keys
/// the query cache, and [`fetch`](Set::fetch) resolves one component of each type for an entity.
pub trait Set: 'static {
    /// Shared references to one component of each type.
    type Ref<'a>;

    /// Exclusive references to one component of each type.
    type Mut<'a>;

    /// Raw parts of the storage of each type.
    type Ptr: Copy;

    /// Push the fingerprint of each type in the set, in declaration order.
    fn fingerprints(out: &mut Vec<Fingerprint>);

    /// The combined fingerprint of the set. Independent of declaration order.
    fn fingerprint() -> Fingerprint {
        let mut fingerprints = Vec::new();
        Self::fingerprints(&mut fingerprints);
        fingerprints.into_iter().collect()
    }

    /// Create any missing storage.
    fn ensure(registry: &mut Registry);

    /// Remove the entity's component of each type.
    fn remove(registry: &mut Registry, entity: Entity);

    /// Clear the storage of each type.
    fn clear(registry: &mut Registry, reset_capacity: bool);

    /// Clear the dirty flag of each storage.
    fn unmark_dirty(registry: &mut Registry);

    /// Whether any storage in the set is dirty.
    fn any_dirty(registry: &Registry) -> bool;

    /// One component of each type for `entity`, or `None` if any is missing.
    fn fetch(registry: &Registry, entity: Entity) -> Option<Self::Ref<'_>>;

    /// Resolve the storage pointers, creating missing storages.
    fn pointers(registry: &mut Registry) -> Self::Ptr;

    /// One exclusive component of each type for `entity`, or `None` if any is missing.
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`pointers`](Set::pointers) on a registry that is still alive and not
    /// otherwise borrowed for `'a`. The set must not name the same type twice, and no other
    /// reference to the returned components may exist for `'a`.
    unsafe fn fetch_mut<'a>(ptr: Self::Ptr, entity: Entity) -> Option<Self::Mut<'a>>;
}

impl<C: Component> Set for C {
    type Ref<'a> = &'a C;
    type Mut<'a> = &'a mut C;
    type Ptr = RawParts<C>;

    #[inline]
    fn fingerprints(out: &mut Vec<Fingerprint>) {
        out.push(Fingerprint::of::<C>());
    }

    #[inline]
    fn fingerprint() -> Fingerprint {
        Fingerprint::of::<C>()
    }

    fn ensure(registry: &mut Registry) {
        registry.storage_mut::<C>();
    }

    fn remove(registry: &mut Registry, entity: Entity) {
        registry.remove::<C>(entity);
    }

    fn clear(registry: &mut Registry, reset_capacity: bool) {
        registry.storage_mut::<C>().clear(reset_capacity);
    }

    fn unmark_dirty(registry: &mut Registry) {
        if let Some(storage) = registry.storage_mut_if_present::<C>() {
            storage.unmark_dirty();
        }
    }

    fn any_dirty(registry: &Registry) -> bool {
        registry.is_dirty::<C>()
    }

    #[inline]
    fn fetch(registry: &Registry, entity: Entity) -> Option<Self::Ref<'_>> {
        registry.get_component::<C>(entity)
    }

    fn pointers(registry: &mut Registry) -> Self::Ptr {
        registry.storage_mut::<C>().raw_parts()
    }

    #[inline]
    unsafe fn fetch_mut<'a>(ptr: Self::Ptr, entity: Entity) -> Option<Self::Mut<'a>> {
        // SAFETY: The caller guarantees the storage outlives 'a, is not accessed elsewhere, and that
        // no other reference to this entity's component exists.
        unsafe { ptr.get_mut(entity) }
    }
}

impl Set for () {
    type Ref<'a> = ();
    type Mut<'a> = ();
    type Ptr = ();

    fn fingerprints(_out: &mut Vec<Fingerprint>) {}

    fn ensure(_registry: &mut Registry) {}

    fn remove(_registry: &mut Registry, _entity: Entity) {}

    fn clear(_registry: &mut Registry, _reset_capacity: bool) {}

    fn unmark_dirty(_registry: &mut Registry) {}

    fn any_dirty(_registry: &Registry) -> bool {
        false
    }

    fn fetch(_registry: &Registry, _entity: Entity) -> Option<Self::Ref<'_>> {
        Some(())
    }

    fn pointers(_registry: &mut Registry) -> Self::Ptr {}

    unsafe fn fetch_mut<'a>(_ptr: Self::Ptr, _entity: Entity) -> Option<Self::Mut<'a>> {
        Some(())
    }
}

/// Implement Set for tuples of sets.
macro_rules! tuple_set {
    ($($name: ident),*) => {
        #[allow(non_snake_case)]
        impl<$($name: Set),*> Set for ($($name,)*) {
            type Ref<'a> = ($($name::Ref<'a>,)*);
            type Mut<'a> = ($($name::Mut<'a>,)*);
            type Ptr = ($($name::Ptr,)*);

            fn fingerprints(out: &mut Vec<Fingerprint>) {
                $($name::fingerprints(out);)*
            }

            fn ensure(registry: &mut Registry) {
                $($name::ensure(registry);)*
            }

            fn remove(registry: &mut Registry, entity: Entity) {
                $($name::remove(registry, entity);)*
            }

            fn clear(registry: &mut Registry, reset_capacity: bool) {
                $($name::clear(registry, reset_capacity);)*
            }

            fn unmark_dirty(registry: &mut Registry) {
                $($name::unmark_dirty(registry);)*
            }

            fn any_dirty(registry: &Registry) -> bool {
                false $(|| $name::any_dirty(registry))*
            }

            fn fetch(registry: &Registry, entity: Entity) -> Option<Self::Ref<'_>> {
                Some(($($name::fetch(registry, entity)?,)*))
            }

            fn pointers(registry: &mut Registry) -> Self::Ptr {
                ($($name::pointers(registry),)*)
            }

            unsafe fn fetch_mut<'a>(ptr: Self::Ptr, entity: Entity) -> Option<Self::Mut<'a>> {
                let ($($name,)*) = ptr;
                // SAFETY: Forwarded from the caller; distinct types give disjoint storages.
                Some(($(unsafe { $name::fetch_mut($name, entity)? },)*))
            }
        }
    }
}

// Implement the tuple Set for all tuples up to 26 elements.
all_tuples!(tuple_set);
