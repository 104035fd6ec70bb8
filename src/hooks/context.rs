//! Shared values: context tokens, providers, and `use_context`.
//!
//! Providers publish a value for the subtree rendered beneath them. Two lookup
//! disciplines exist, selected by [`ContextScoping`]:
//!
//! - `Scoped` walks the chain of provider frames the current instance was
//!   rendered under, so the nearest enclosing provider wins.
//! - `Global` reads a flat map that every provider writes as it renders; the
//!   provider that executed most recently wins, wherever it sits in the tree.
//!   Sibling or nested providers for the same token clobber each other.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::scope;
use crate::element::{ComponentElement, ComponentRef};

/// Opaque identifier of one context token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextKey(u64);

impl ContextKey {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        ContextKey(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// How `use_context` finds the provided value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextScoping {
    /// Nearest enclosing provider in the element tree.
    #[default]
    Scoped,
    /// Most recently rendered provider anywhere (last writer wins).
    Global,
}

// ---------------------------------------------------------------------------
// Provider chain
// ---------------------------------------------------------------------------

struct ProviderFrame {
    key: ContextKey,
    value: Rc<dyn Any>,
    parent: ProviderChain,
}

/// Persistent linked list of provider frames, innermost first.
#[derive(Clone, Default)]
pub(crate) struct ProviderChain(Option<Rc<ProviderFrame>>);

impl ProviderChain {
    /// A chain with one more frame on top; `self` is unchanged.
    pub fn push(&self, key: ContextKey, value: Rc<dyn Any>) -> ProviderChain {
        ProviderChain(Some(Rc::new(ProviderFrame {
            key,
            value,
            parent: self.clone(),
        })))
    }

    pub fn lookup(&self, key: ContextKey) -> Option<Rc<dyn Any>> {
        let mut current = self.0.as_ref();
        while let Some(frame) = current {
            if frame.key == key {
                return Some(Rc::clone(&frame.value));
            }
            current = frame.parent.0.as_ref();
        }
        None
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.0.as_ref();
        while let Some(frame) = current {
            depth += 1;
            current = frame.parent.0.as_ref();
        }
        depth
    }
}

impl fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderChain")
            .field("depth", &self.depth())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Global store
// ---------------------------------------------------------------------------

/// Flat key → last published value map, shared by every instance of a runtime.
#[derive(Clone, Default)]
pub(crate) struct SharedStore(Rc<RefCell<HashMap<ContextKey, Rc<dyn Any>>>>);

impl SharedStore {
    pub fn publish(&self, key: ContextKey, value: Rc<dyn Any>) {
        self.0.borrow_mut().insert(key, value);
    }

    pub fn get(&self, key: ContextKey) -> Option<Rc<dyn Any>> {
        self.0.borrow().get(&key).cloned()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Handle for one shared value: its key, default, and provider factory.
pub struct ContextToken<T> {
    key: ContextKey,
    default: Rc<T>,
    _marker: PhantomData<T>,
}

impl<T> Clone for ContextToken<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            default: Rc::clone(&self.default),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ContextToken<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextToken").field("key", &self.key).finish()
    }
}

/// Create a new context token with a default value.
pub fn create_context<T: Clone + 'static>(default: T) -> ContextToken<T> {
    ContextToken {
        key: ContextKey::next(),
        default: Rc::new(default),
        _marker: PhantomData,
    }
}

impl<T: Clone + 'static> ContextToken<T> {
    pub fn key(&self) -> ContextKey {
        self.key
    }

    pub fn default_value(&self) -> T {
        (*self.default).clone()
    }

    /// A provider invocation publishing `value`; add children with
    /// [`ComponentElement::child`].
    pub fn provider(&self, value: T) -> ComponentElement {
        ComponentElement::new(ComponentRef::provider(self.key, "Provider", Rc::new(value)))
    }
}

/// Read the value provided for `token`, or its default.
pub fn use_context<T: Clone + 'static>(token: &ContextToken<T>) -> T {
    let scope = scope::current();
    let provided = match scope.scoping {
        ContextScoping::Scoped => scope.providers.lookup(token.key),
        ContextScoping::Global => scope.shared.get(token.key),
    };
    match provided.as_deref().and_then(|v| v.downcast_ref::<T>()) {
        Some(value) => value.clone(),
        None => {
            tracing::trace!(key = ?token.key, "no provider in scope, using context default");
            token.default_value()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        let a = create_context(0);
        let b = create_context(0);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn chain_lookup_finds_innermost() {
        let theme = create_context("light");
        let outer = ProviderChain::default().push(theme.key(), Rc::new("dark"));
        let inner = outer.push(theme.key(), Rc::new("contrast"));
        let value = inner.lookup(theme.key()).unwrap();
        assert_eq!(value.downcast_ref::<&str>(), Some(&"contrast"));
        let value = outer.lookup(theme.key()).unwrap();
        assert_eq!(value.downcast_ref::<&str>(), Some(&"dark"));
        assert_eq!(inner.depth(), 2);
    }

    #[test]
    fn chain_lookup_skips_other_keys() {
        let a = create_context(1);
        let b = create_context(2);
        let chain = ProviderChain::default().push(a.key(), Rc::new(10));
        assert!(chain.lookup(b.key()).is_none());
        assert!(ProviderChain::default().lookup(a.key()).is_none());
    }

    #[test]
    fn shared_store_last_writer_wins() {
        let token = create_context(0);
        let store = SharedStore::default();
        store.publish(token.key(), Rc::new(1));
        store.publish(token.key(), Rc::new(2));
        let value = store.get(token.key()).unwrap();
        assert_eq!(value.downcast_ref::<i32>(), Some(&2));
        store.clear();
        assert!(store.get(token.key()).is_none());
    }

    #[test]
    fn provider_element_identity_is_per_token() {
        let a = create_context(0);
        let b = create_context(0);
        let pa = a.provider(1);
        let pa2 = a.provider(2);
        let pb = b.provider(1);
        assert_eq!(pa.component.id(), pa2.component.id());
        assert_ne!(pa.component.id(), pb.component.id());
        assert_eq!(pa.component.name(), "Provider");
    }
}
