//! Component references: a render function plus the identity it is compared by.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use super::node::{Element, IntoElement};
use super::props::Props;
use crate::hooks::context::ContextKey;

/// What makes two component references "the same function".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    /// A Rust function or closure, identified by its type.
    Function(TypeId),
    /// A function pointer, identified by its address. Distinct functions
    /// coerced to one `fn` type share a `TypeId` but not an address.
    Pointer(usize),
    /// The provider of one context token.
    Provider(ContextKey),
}

/// Value a provider component publishes for its subtree.
#[derive(Clone)]
pub(crate) struct Provision {
    pub key: ContextKey,
    pub value: Rc<dyn Any>,
}

type RenderFn = Rc<dyn Fn(&Props) -> Element>;

/// Path name of components passed as function pointers.
pub const POINTER_NAME: &str = "fn";

/// A callable component with a stable identity and a declared name.
#[derive(Clone)]
pub struct ComponentRef {
    id: ComponentId,
    name: Rc<str>,
    render: RenderFn,
    provision: Option<Provision>,
}

impl ComponentRef {
    /// Wrap a function. Its name is the last segment of its type name, so
    /// closures are all called `{{closure}}`; use [`ComponentRef::named`] to
    /// tell them apart in identity paths.
    ///
    /// Function pointers (`component(if c { a } else { b })`) are compared by
    /// address and named [`POINTER_NAME`].
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Props) -> R + 'static,
        R: IntoElement + 'static,
    {
        let (id, name) = match (&f as &dyn Any).downcast_ref::<fn(&Props) -> R>() {
            Some(&pointer) => (ComponentId::Pointer(pointer as usize), POINTER_NAME),
            None => (
                ComponentId::Function(TypeId::of::<F>()),
                short_type_name::<F>(),
            ),
        };
        Self {
            id,
            name: Rc::from(name),
            render: Rc::new(move |props| f(props).into_element()),
            provision: None,
        }
    }

    /// Wrap a function under an explicit name.
    pub fn named<F, R>(name: impl AsRef<str>, f: F) -> Self
    where
        F: Fn(&Props) -> R + 'static,
        R: IntoElement + 'static,
    {
        let mut this = Self::new(f);
        this.name = Rc::from(name.as_ref());
        this
    }

    pub(crate) fn provider(key: ContextKey, name: &str, value: Rc<dyn Any>) -> Self {
        Self {
            id: ComponentId::Provider(key),
            name: Rc::from(name),
            render: Rc::new(|props: &Props| props.children().to_vec().into_element()),
            provision: Some(Provision { key, value }),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn provision(&self) -> Option<&Provision> {
        self.provision.as_ref()
    }

    pub(crate) fn call(&self, props: &Props) -> Element {
        (self.render)(props)
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRef")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// `my_app::widgets::Counter` → `Counter`, `foo::bar::<T>` → `bar`.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = match full.find('<') {
        Some(pos) => &full[..pos],
        None => full,
    };
    let base = base.trim_end_matches("::");
    base.rsplit("::").next().unwrap_or(base)
}
