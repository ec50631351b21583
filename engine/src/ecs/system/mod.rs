//! Systems: units of processing run over the context once per tick.
//!
//! # Overview
//!
//! A [`System`] processes the whole [`Context`] given opaque user data. Most systems only need
//! to visit the entities owning a fixed combination of components; those implement
//! [`ComponentSystem`] instead and get [`System`] for free:
//!
//! ```rust
//! use std::any::Any;
//! use rusty_ecs::ecs::{Component, Entity, system::ComponentSystem, world::World};
//!
//! #[derive(Component)]
//! struct Position(f32);
//!
//! #[derive(Component)]
//! struct Velocity(f32);
//!
//! struct Movement;
//!
//! impl ComponentSystem for Movement {
//!     type Components = (Position, Velocity);
//!
//!     fn on_process(&mut self, _: Entity, (p, v): (&mut Position, &mut Velocity), _: &mut dyn Any) {
//!         p.0 += v.0;
//!     }
//! }
//!
//! let mut world = World::new();
//! world.register(true, Movement);
//! let entity = world.create();
//! world.append(entity, Position(0.0));
//! world.append(entity, Velocity(1.5));
//! world.process(&mut ());
//! assert_eq!(world.get_component::<Position>(entity).map(|p| p.0), Some(1.5));
//! ```
//!
//! # Scheduling
//!
//! The [`Registry`] keeps one instance per system type, ordered by type fingerprint. Every
//! processing pass visits systems in that order, which is stable for a given build no matter in
//! which order the systems were registered. Each run is wrapped by the instance's pre-process and
//! post-process [`Hooks`].
//!
//! Systems also carry an active flag, toggled by `enable`/`disable` (which fire the matching
//! hooks). [`Registry::process`] runs every system regardless of the flag, while
//! [`Registry::process_active`] skips inactive ones.

mod hook;
mod registry;

use std::any::Any;

pub use hook::{Hook, HookKind, Hooks};
pub use registry::Registry;

use crate::{
    all_tuples,
    ecs::{Entity, component, context::Context, fingerprint::Fingerprint},
};

/// A unit of processing over the context.
pub trait System: 'static {
    /// Process the context once. `data` is whatever the caller passed to the processing pass.
    fn process(&mut self, context: &mut Context, data: &mut dyn Any);

    /// A readable name, used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A system visiting every entity that owns one component of each type in
/// [`Components`](ComponentSystem::Components), in ascending entity order.
pub trait ComponentSystem: 'static {
    /// The component types this system requires.
    type Components: component::Set;

    /// Process one entity and its components.
    fn on_process(
        &mut self,
        entity: Entity,
        components: <Self::Components as component::Set>::Mut<'_>,
        data: &mut dyn Any,
    );
}

impl<T: ComponentSystem> System for T {
    fn process(&mut self, context: &mut Context, data: &mut dyn Any) {
        let mut view = context.view::<T::Components>();
        for (entity, components) in view.iter_mut() {
            self.on_process(entity, components, data);
        }
    }
}

/// A type-level list of systems: a single system or a tuple of lists.
pub trait Set: 'static {
    /// Push the fingerprint of each system in the list, in declaration order.
    fn fingerprints(out: &mut Vec<Fingerprint>);

    /// Fingerprints of every system in the list, in declaration order.
    fn collect() -> Vec<Fingerprint> {
        let mut out = Vec::new();
        Self::fingerprints(&mut out);
        out
    }
}

impl<S: System> Set for S {
    fn fingerprints(out: &mut Vec<Fingerprint>) {
        out.push(Fingerprint::of::<S>());
    }
}

/// Implement Set for tuples of system lists.
macro_rules! tuple_set {
    ($($name: ident),*) => {
        impl<$($name: Set),*> Set for ($($name,)*) {
            fn fingerprints(out: &mut Vec<Fingerprint>) {
                $($name::fingerprints(out);)*
            }
        }
    }
}

all_tuples!(tuple_set);
