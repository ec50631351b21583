//! System registry and scheduler.
//!
//! The [`Registry`] owns one instance per system type. Instances are kept in two parallel
//! sequences, fingerprints and instances, both ordered by fingerprint so lookups are a binary
//! search and every processing pass visits systems in the same order.

use std::any::Any;

use crate::ecs::{
    context::Context,
    error::RegistrationError,
    fingerprint::Fingerprint,
    system::{HookKind, Hooks, Set, System},
};

/// Object-safe access to a boxed system and its concrete type.
trait Erased: System {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: System> Erased for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A registered system with its scheduling state.
struct Instance {
    system: Box<dyn Erased>,
    name: &'static str,
    active: bool,
    hooks: Hooks,
}

impl Instance {
    /// Run the system once, wrapped by its pre and post process hooks.
    fn run(&mut self, context: &mut Context, data: &mut dyn Any) {
        log::trace!("processing system {}", self.name);
        self.hooks.fire(HookKind::PreProcess, context, data);
        self.system.process(context, data);
        self.hooks.fire(HookKind::PostProcess, context, data);
    }

    /// Set the active flag, firing the enable or disable hooks if it changed.
    fn set_active(&mut self, active: bool, context: &mut Context, data: &mut dyn Any) {
        if self.active == active {
            return;
        }
        self.active = active;
        let kind = if active {
            HookKind::Enable
        } else {
            HookKind::Disable
        };
        let fired = self.hooks.fire(kind, context, data);
        let state = if active { "enabled" } else { "disabled" };
        log::debug!("system {} {state} ({fired} hooks)", self.name);
    }
}

/// The set of registered systems, ordered by type fingerprint.
#[derive(Default)]
pub struct Registry {
    fingerprints: Vec<Fingerprint>,
    instances: Vec<Instance>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.instances
                    .iter()
                    .map(|instance| (instance.name, instance.active)),
            )
            .finish()
    }
}

impl Registry {
    /// Create a new, empty system registry.
    #[inline]
    pub const fn new() -> Self {
        Self {
            fingerprints: Vec::new(),
            instances: Vec::new(),
        }
    }

    /// Reserve room for `additional` more systems.
    ///
    /// # Panics
    ///
    /// If `additional` is zero.
    pub fn reserve(&mut self, additional: usize) {
        assert!(additional > 0, "system pool size must be non zero");
        self.fingerprints.reserve(additional);
        self.instances.reserve(additional);
    }

    /// Register `system`, returning it back for further setup.
    ///
    /// With `immediate_start` the system starts active, without firing enable hooks (none can be
    /// attached yet). Otherwise it starts inactive.
    ///
    /// # Panics
    ///
    /// If a system of the same type is already registered.
    pub fn register<S: System>(&mut self, immediate_start: bool, system: S) -> &mut S {
        match self.try_register(immediate_start, system) {
            Ok(system) => system,
            Err(err) => panic!("{err}"),
        }
    }

    /// Register `system`, or fail if a system of the same type is already registered.
    pub fn try_register<S: System>(
        &mut self,
        immediate_start: bool,
        system: S,
    ) -> Result<&mut S, RegistrationError> {
        let fingerprint = Fingerprint::of::<S>();
        let name = system.name();
        let position = match self.fingerprints.binary_search(&fingerprint) {
            Ok(_) => return Err(RegistrationError::Duplicate { name, fingerprint }),
            Err(position) => position,
        };

        self.fingerprints.insert(position, fingerprint);
        self.instances.insert(
            position,
            Instance {
                system: Box::new(system),
                name,
                active: immediate_start,
                hooks: Hooks::new(),
            },
        );
        log::info!("registered system {name} ({fingerprint}), active: {immediate_start}");

        match self.instances[position].system.as_any_mut().downcast_mut::<S>() {
            Some(system) => Ok(system),
            None => unreachable!("system registered under {fingerprint} is not {name}"),
        }
    }

    /// Run every system in fingerprint order, regardless of its active flag.
    pub fn process(&mut self, context: &mut Context, data: &mut dyn Any) {
        for instance in &mut self.instances {
            instance.run(context, data);
        }
    }

    /// Run every active system in fingerprint order.
    pub fn process_active(&mut self, context: &mut Context, data: &mut dyn Any) {
        for instance in self.instances.iter_mut().filter(|instance| instance.active) {
            instance.run(context, data);
        }
    }

    /// Run the listed systems once each, in list order, regardless of their active flag.
    /// Unregistered systems are skipped.
    pub fn manual_process<S: Set>(&mut self, context: &mut Context, data: &mut dyn Any) {
        for fingerprint in S::collect() {
            if let Some(instance) = self.instance_mut(fingerprint) {
                instance.run(context, data);
            }
        }
    }

    /// Activate the listed systems, firing enable hooks of those that were inactive.
    pub fn enable<S: Set>(&mut self, context: &mut Context, data: &mut dyn Any) {
        self.set_active::<S>(true, context, data);
    }

    /// Deactivate the listed systems, firing disable hooks of those that were active.
    pub fn disable<S: Set>(&mut self, context: &mut Context, data: &mut dyn Any) {
        self.set_active::<S>(false, context, data);
    }

    fn set_active<S: Set>(&mut self, active: bool, context: &mut Context, data: &mut dyn Any) {
        for fingerprint in S::collect() {
            if let Some(instance) = self.instance_mut(fingerprint) {
                instance.set_active(active, context, data);
            }
        }
    }

    /// Whether `S` is registered and active.
    pub fn is_active<S: System>(&self) -> bool {
        self.instance(Fingerprint::of::<S>())
            .is_some_and(|instance| instance.active)
    }

    /// Whether every listed system is registered and active.
    pub fn are_active<S: Set>(&self) -> bool {
        S::collect().into_iter().all(|fingerprint| {
            self.instance(fingerprint)
                .is_some_and(|instance| instance.active)
        })
    }

    /// Whether `S` is registered.
    pub fn contains<S: System>(&self) -> bool {
        self.fingerprints
            .binary_search(&Fingerprint::of::<S>())
            .is_ok()
    }

    pub fn get<S: System>(&self) -> Option<&S> {
        self.instance(Fingerprint::of::<S>())?
            .system
            .as_any()
            .downcast_ref::<S>()
    }

    pub fn get_mut<S: System>(&mut self) -> Option<&mut S> {
        self.instance_mut(Fingerprint::of::<S>())?
            .system
            .as_any_mut()
            .downcast_mut::<S>()
    }

    /// Attach a hook to `S`. Returns `false` if `S` is not registered.
    pub fn attach<S: System>(
        &mut self,
        kind: HookKind,
        hook: impl FnMut(&mut Context, &mut dyn Any) + 'static,
    ) -> bool {
        match self.instance_mut(Fingerprint::of::<S>()) {
            Some(instance) => {
                instance.hooks.attach(kind, hook);
                true
            }
            None => false,
        }
    }

    /// The number of registered systems.
    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// System names in processing order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.instances.iter().map(|instance| instance.name)
    }

    /// System fingerprints in processing order.
    #[inline]
    pub fn fingerprints(&self) -> &[Fingerprint] {
        &self.fingerprints
    }

    fn instance(&self, fingerprint: Fingerprint) -> Option<&Instance> {
        let position = self.fingerprints.binary_search(&fingerprint).ok()?;
        self.instances.get(position)
    }

    fn instance_mut(&mut self, fingerprint: Fingerprint) -> Option<&mut Instance> {
        let position = self.fingerprints.binary_search(&fingerprint).ok()?;
        self.instances.get_mut(position)
    }
}
