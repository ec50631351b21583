//! Components every entity carries, plus the one-shot destruction callback.

use std::fmt;

use crate::ecs::{Component, Entity, context::Context};

/// A bag of flags attached to every entity.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    flags: u64,
}

impl Tag {
    /// No flags set.
    pub const NONE: u64 = 0;

    /// Marks an entity that processing should leave alone.
    pub const IGNORE: u64 = 1 << 0;

    #[inline]
    pub const fn new(flags: u64) -> Self {
        Self { flags }
    }

    #[inline]
    pub const fn flags(&self) -> u64 {
        self.flags
    }

    /// Whether every bit of `flags` is set.
    #[inline]
    pub const fn contains(&self, flags: u64) -> bool {
        self.flags & flags == flags
    }

    #[inline]
    pub fn insert(&mut self, flags: u64) {
        self.flags |= flags;
    }

    #[inline]
    pub fn remove(&mut self, flags: u64) {
        self.flags &= !flags;
    }
}

/// Parent link attached to every entity. Unparented entities point at [`Entity::INVALID`].
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hierarchy {
    pub parent: Entity,
}

impl Hierarchy {
    #[inline]
    pub const fn new(parent: Entity) -> Self {
        Self { parent }
    }

    #[inline]
    pub const fn has_parent(&self) -> bool {
        self.parent.is_valid()
    }
}

/// Callback signature of a [`Destructor`].
pub type DestructorFn = Box<dyn FnOnce(&mut Context, Entity)>;

/// A callback run once when its entity is swept, before its components are erased.
#[derive(Component)]
pub struct Destructor {
    callback: Option<DestructorFn>,
}

impl Destructor {
    pub fn new(callback: impl FnOnce(&mut Context, Entity) + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Take the callback out, leaving the destructor spent.
    #[inline]
    pub fn take(&mut self) -> Option<DestructorFn> {
        self.callback.take()
    }

    /// Whether the callback already ran.
    #[inline]
    pub fn is_spent(&self) -> bool {
        self.callback.is_none()
    }
}

impl fmt::Debug for Destructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destructor")
            .field("spent", &self.is_spent())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    #[test]
    fn tag_flags() {
        // Given
        let mut tag = Tag::default();
        assert_eq!(tag.flags(), Tag::NONE);

        // When
        tag.insert(Tag::IGNORE | 1 << 4);

        // Then
        assert!(tag.contains(Tag::IGNORE));
        assert!(tag.contains(1 << 4));

        // When
        tag.remove(Tag::IGNORE);

        // Then
        assert!(!tag.contains(Tag::IGNORE));
        assert_eq!(tag, Tag::new(1 << 4));
    }

    #[test]
    fn hierarchy_defaults_to_no_parent() {
        assert!(!Hierarchy::default().has_parent());
        assert!(Hierarchy::new(Entity::from_raw(3)).has_parent());
    }

    #[test]
    fn destructor_is_one_shot() {
        // Given
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let mut destructor = Destructor::new(move |_, _| seen.set(seen.get() + 1));
        let mut context = Context::new();

        // When
        if let Some(callback) = destructor.take() {
            callback(&mut context, Entity::from_raw(1));
        }

        // Then
        assert!(destructor.is_spent());
        assert!(destructor.take().is_none());
        assert_eq!(calls.get(), 1);
    }
}
