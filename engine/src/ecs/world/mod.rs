//! The World bundles an execution [`Context`] with the systems that run over it.
//!
//! A `World` dereferences to its context, so entity and component operations are available
//! directly on it. System operations pass the context to the system [`Registry`] internally.
//!
//! # Example
//!
//! ```rust
//! use std::any::Any;
//! use rusty_ecs::ecs::{context::Context, system::{HookKind, System}, world::World};
//!
//! struct Tick(u64);
//!
//! impl System for Tick {
//!     fn process(&mut self, _: &mut Context, _: &mut dyn Any) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let mut world = World::new();
//! world.register(false, Tick(0));
//! world.attach::<Tick>(HookKind::Enable, |_, _| println!("tick enabled"));
//! world.enable::<Tick>(&mut ());
//! world.process(&mut ());
//! assert!(world.is_active::<Tick>());
//! assert_eq!(world.system::<Tick>().map(|t| t.0), Some(1));
//! ```

use std::{
    any::Any,
    ops::{Deref, DerefMut},
};

use crate::ecs::{
    capacity::Capacity,
    context::Context,
    error::RegistrationError,
    system::{HookKind, Registry, Set, System},
};

/// A context plus its registered systems.
#[derive(Debug, Default)]
pub struct World {
    context: Context,
    systems: Registry,
}

impl World {
    /// Construct a world sized by the process-wide capacity.
    pub fn new() -> Self {
        Self::with_capacity(crate::ecs::capacity::current())
    }

    /// Construct a world sized by an explicit capacity.
    pub fn with_capacity(capacity: Capacity) -> Self {
        Self {
            context: Context::with_capacity(capacity),
            systems: Registry::new(),
        }
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    #[inline]
    pub fn systems(&self) -> &Registry {
        &self.systems
    }

    /// Reserve room for `additional` more systems.
    ///
    /// # Panics
    ///
    /// If `additional` is zero.
    pub fn reserve_systems(&mut self, additional: usize) {
        self.systems.reserve(additional);
    }

    /// Register a system. See [`Registry::register`].
    ///
    /// # Panics
    ///
    /// If a system of the same type is already registered.
    pub fn register<S: System>(&mut self, immediate_start: bool, system: S) -> &mut S {
        self.systems.register(immediate_start, system)
    }

    /// Register a system, or fail if one of the same type exists.
    pub fn try_register<S: System>(
        &mut self,
        immediate_start: bool,
        system: S,
    ) -> Result<&mut S, RegistrationError> {
        self.systems.try_register(immediate_start, system)
    }

    /// Run every registered system, regardless of its active flag.
    pub fn process(&mut self, data: &mut dyn Any) {
        self.systems.process(&mut self.context, data);
    }

    /// Run every active system.
    pub fn process_active(&mut self, data: &mut dyn Any) {
        self.systems.process_active(&mut self.context, data);
    }

    /// Run the listed systems once each.
    pub fn manual_process<S: Set>(&mut self, data: &mut dyn Any) {
        self.systems.manual_process::<S>(&mut self.context, data);
    }

    pub fn enable<S: Set>(&mut self, data: &mut dyn Any) {
        self.systems.enable::<S>(&mut self.context, data);
    }

    pub fn disable<S: Set>(&mut self, data: &mut dyn Any) {
        self.systems.disable::<S>(&mut self.context, data);
    }

    #[inline]
    pub fn is_active<S: System>(&self) -> bool {
        self.systems.is_active::<S>()
    }

    #[inline]
    pub fn are_active<S: Set>(&self) -> bool {
        self.systems.are_active::<S>()
    }

    /// The registered instance of `S`.
    #[inline]
    pub fn system<S: System>(&self) -> Option<&S> {
        self.systems.get::<S>()
    }

    #[inline]
    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems.get_mut::<S>()
    }

    /// Attach a hook to `S`. Returns `false` if `S` is not registered.
    pub fn attach<S: System>(
        &mut self,
        kind: HookKind,
        hook: impl FnMut(&mut Context, &mut dyn Any) + 'static,
    ) -> bool {
        self.systems.attach::<S>(kind, hook)
    }
}

impl Deref for World {
    type Target = Context;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl DerefMut for World {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.context
    }
}
