//! Instance store: persistent component contexts keyed by identity path.
//!
//! The store owns one [`ComponentContext`] per live component instance. The
//! arena hands out versioned [`InstanceId`]s, so a setter that outlives its
//! instance can never address a newer instance that reused the slot. The path
//! index is ordered, which keeps every subtree a contiguous range.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use crate::element::{ComponentElement, Element};
use crate::hooks::context::ProviderChain;
use crate::hooks::slot::HookState;
use crate::hooks::Cleanup;
use crate::identity::IdentityPath;

new_key_type! {
    /// Handle to one component instance.
    pub struct InstanceId;
}

// ---------------------------------------------------------------------------
// ComponentContext
// ---------------------------------------------------------------------------

/// Host position an instance's output occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Location<N> {
    pub parent: N,
    pub index: usize,
}

/// Persistent storage behind one component instance.
pub(crate) struct ComponentContext<N> {
    pub path: IdentityPath,
    /// Most recent invocation (component reference and props).
    pub element: ComponentElement,
    pub hooks: Rc<RefCell<HookState>>,
    /// Output of the last completed render.
    pub rendered: Option<Element>,
    pub location: Option<Location<N>>,
    /// Provider frames enclosing this instance.
    pub providers: ProviderChain,
}

/// An instance removed from the store, with the cleanups still owed.
#[derive(Debug)]
pub(crate) struct Disposed {
    pub path: IdentityPath,
    pub cleanups: Vec<Cleanup>,
}

impl Disposed {
    /// Run the owed cleanups in slot order.
    pub fn run(self) {
        if !self.cleanups.is_empty() {
            tracing::trace!(path = %self.path, count = self.cleanups.len(), "running cleanups");
        }
        for cleanup in self.cleanups {
            cleanup.run();
        }
    }
}

// ---------------------------------------------------------------------------
// InstanceStore
// ---------------------------------------------------------------------------

pub(crate) struct InstanceStore<N> {
    instances: SlotMap<InstanceId, ComponentContext<N>>,
    by_path: BTreeMap<IdentityPath, InstanceId>,
}

impl<N: Clone> InstanceStore<N> {
    pub fn new() -> Self {
        Self {
            instances: SlotMap::with_key(),
            by_path: BTreeMap::new(),
        }
    }

    /// Get or create the instance for `path`.
    ///
    /// An existing instance backed by a different component is disposed with
    /// its whole subtree and replaced; the owed cleanups are returned.
    pub fn resolve(
        &mut self,
        path: &IdentityPath,
        element: &ComponentElement,
        providers: &ProviderChain,
    ) -> (InstanceId, Vec<Disposed>) {
        let mut disposed = Vec::new();
        if let Some(&id) = self.by_path.get(path) {
            let ctx = &mut self.instances[id];
            if ctx.element.component.id() == element.component.id() {
                ctx.element = element.clone();
                ctx.providers = providers.clone();
                return (id, disposed);
            }
            tracing::debug!(%path, "component changed at path, replacing instance");
            disposed = self.dispose_subtree(path, &HashSet::new());
        }

        let id = self.instances.insert(ComponentContext {
            path: path.clone(),
            element: element.clone(),
            hooks: Rc::new(RefCell::new(HookState::default())),
            rendered: None,
            location: None,
            providers: providers.clone(),
        });
        self.by_path.insert(path.clone(), id);
        tracing::debug!(%path, instance = ?id, "created instance");
        (id, disposed)
    }

    pub fn get(&self, id: InstanceId) -> Option<&ComponentContext<N>> {
        self.instances.get(id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut ComponentContext<N>> {
        self.instances.get_mut(id)
    }

    pub fn id_of(&self, path: &IdentityPath) -> Option<InstanceId> {
        self.by_path.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Live paths in path order.
    pub fn paths(&self) -> impl Iterator<Item = &IdentityPath> {
        self.by_path.keys()
    }

    /// Remove every instance at or under `prefix` except those in `keep`.
    ///
    /// Returned in path order (ancestors before descendants). Cleanups are
    /// not run here; callers run them once the store is no longer borrowed.
    pub fn dispose_subtree(
        &mut self,
        prefix: &IdentityPath,
        keep: &HashSet<InstanceId>,
    ) -> Vec<Disposed> {
        let doomed: Vec<(IdentityPath, InstanceId)> = self
            .by_path
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .filter(|(_, id)| !keep.contains(id))
            .map(|(path, id)| (path.clone(), *id))
            .collect();

        let mut disposed = Vec::with_capacity(doomed.len());
        for (path, id) in doomed {
            self.by_path.remove(&path);
            if let Some(ctx) = self.instances.remove(id) {
                let cleanups = ctx.hooks.borrow_mut().take_cleanups();
                tracing::debug!(%path, cleanups = cleanups.len(), "disposed instance");
                disposed.push(Disposed { path, cleanups });
            }
        }
        disposed
    }
}

impl<N: Clone> Default for InstanceStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{component, Props};
    use crate::hooks::slot::{EffectSlot, HookSlot};
    use crate::identity::Key;
    use pretty_assertions::assert_eq;

    fn counter(_: &Props) -> Element {
        Element::text("counter")
    }

    fn label(_: &Props) -> Element {
        Element::text("label")
    }

    fn root() -> IdentityPath {
        IdentityPath::root("Mount0")
    }

    fn with_cleanup(store: &mut InstanceStore<u32>, id: InstanceId, log: &Rc<RefCell<Vec<String>>>) {
        let log = log.clone();
        let name = store.get(id).unwrap().path.to_string();
        store
            .get_mut(id)
            .unwrap()
            .hooks
            .borrow_mut()
            .slots
            .push(HookSlot::Effect(EffectSlot {
                deps: None,
                cleanup: Some(Cleanup::new(move || log.borrow_mut().push(name))),
            }));
    }

    #[test]
    fn resolve_reuses_instance_for_same_path() {
        let mut store = InstanceStore::<u32>::new();
        let path = root().child("counter", Key::Index(0));
        let (a, _) = store.resolve(&path, &component(counter), &ProviderChain::default());
        let (b, _) = store.resolve(
            &path,
            &component(counter).prop("step", 2),
            &ProviderChain::default(),
        );
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(a).unwrap().element.props.get_int("step"), Some(2));
    }

    #[test]
    fn resolve_replaces_instance_of_other_component() {
        let mut store = InstanceStore::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let path = root().child("x", Key::Index(0));
        let (old, _) = store.resolve(&path, &component(counter), &ProviderChain::default());
        with_cleanup(&mut store, old, &log);
        let child = path.child("y", Key::Index(0));
        let (nested, _) = store.resolve(&child, &component(counter), &ProviderChain::default());

        let (new, disposed) = store.resolve(&path, &component(label), &ProviderChain::default());
        assert_ne!(old, new);
        assert!(store.get(old).is_none());
        assert!(store.get(nested).is_none());
        assert_eq!(disposed.len(), 2);
        disposed.into_iter().for_each(Disposed::run);
        assert_eq!(*log.borrow(), vec!["/Mount0/x:0"]);
    }

    #[test]
    fn dispose_subtree_is_segment_wise_and_ordered() {
        let mut store = InstanceStore::<u32>::new();
        let item1 = root().child("Item", Key::Index(1));
        let item10 = root().child("Item", Key::Index(10));
        let nested = item1.child("Label", Key::Index(0));
        for path in [&nested, &item10, &item1] {
            store.resolve(path, &component(counter), &ProviderChain::default());
        }

        let disposed = store.dispose_subtree(&item1, &HashSet::new());
        let paths: Vec<String> = disposed.iter().map(|d| d.path.to_string()).collect();
        assert_eq!(paths, vec!["/Mount0/Item:1", "/Mount0/Item:1/Label:0"]);
        assert!(store.id_of(&item10).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn dispose_subtree_honours_keep_set() {
        let mut store = InstanceStore::<u32>::new();
        let a = root().child("A", Key::explicit("a"));
        let b = root().child("B", Key::explicit("b"));
        let (ida, _) = store.resolve(&a, &component(counter), &ProviderChain::default());
        store.resolve(&b, &component(counter), &ProviderChain::default());

        let keep: HashSet<_> = [ida].into_iter().collect();
        let disposed = store.dispose_subtree(&root(), &keep);
        assert_eq!(disposed.len(), 1);
        assert_eq!(disposed[0].path, b);
        assert!(store.get(ida).is_some());
    }

    #[test]
    fn disposal_runs_cleanups_once() {
        let mut store = InstanceStore::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let path = root().child("counter", Key::Index(0));
        let (id, _) = store.resolve(&path, &component(counter), &ProviderChain::default());
        with_cleanup(&mut store, id, &log);

        store
            .dispose_subtree(&path, &HashSet::new())
            .into_iter()
            .for_each(Disposed::run);
        assert!(store.dispose_subtree(&path, &HashSet::new()).is_empty());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn paths_iterate_in_order() {
        let mut store = InstanceStore::<u32>::new();
        let b = root().child("B", Key::Index(1));
        let a = root().child("A", Key::Index(0));
        store.resolve(&b, &component(counter), &ProviderChain::default());
        store.resolve(&a, &component(counter), &ProviderChain::default());
        let paths: Vec<String> = store.paths().map(ToString::to_string).collect();
        assert_eq!(paths, vec!["/Mount0/A:0", "/Mount0/B:1"]);
    }
}
