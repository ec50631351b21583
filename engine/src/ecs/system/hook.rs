use std::{any::Any, fmt};

use crate::ecs::context::Context;

/// The moments at which a system's hooks fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// The system went from inactive to active.
    Enable,
    /// The system went from active to inactive.
    Disable,
    /// Right before the system processes.
    PreProcess,
    /// Right after the system processed.
    PostProcess,
}

impl HookKind {
    pub const ALL: [HookKind; 4] = [
        HookKind::Enable,
        HookKind::Disable,
        HookKind::PreProcess,
        HookKind::PostProcess,
    ];

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

/// A hook callback. Receives the context and the user data passed to the triggering call.
pub type Hook = Box<dyn FnMut(&mut Context, &mut dyn Any)>;

/// Ordered callback lists, one per [`HookKind`].
#[derive(Default)]
pub struct Hooks {
    lists: [Vec<Hook>; 4],
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback to the list for `kind`.
    pub fn attach(
        &mut self,
        kind: HookKind,
        hook: impl FnMut(&mut Context, &mut dyn Any) + 'static,
    ) {
        self.lists[kind.index()].push(Box::new(hook));
    }

    /// Run every callback of `kind` in attachment order. Returns how many ran.
    pub fn fire(&mut self, kind: HookKind, context: &mut Context, data: &mut dyn Any) -> usize {
        let hooks = &mut self.lists[kind.index()];
        for hook in hooks.iter_mut() {
            hook(context, data);
        }
        hooks.len()
    }

    /// The number of callbacks attached for `kind`.
    #[inline]
    pub fn len(&self, kind: HookKind) -> usize {
        self.lists[kind.index()].len()
    }

    /// Whether no callback is attached at all.
    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }

    /// Remove every callback of `kind`.
    pub fn clear(&mut self, kind: HookKind) {
        self.lists[kind.index()].clear();
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for kind in HookKind::ALL {
            map.entry(&kind, &self.len(kind));
        }
        map.finish()
    }
}
