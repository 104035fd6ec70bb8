//! Property values carried by elements.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::node::Element;
use crate::host::EventHandler;

/// Prefix that marks a host prop as an event handler (`onClick` → `click`).
pub const EVENT_PREFIX: &str = "on";

/// Map a handler prop name to its host event name, if it is one.
pub fn event_name(prop: &str) -> Option<String> {
    let rest = prop.strip_prefix(EVENT_PREFIX)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_ascii_lowercase())
}

/// A single prop value.
#[derive(Clone)]
pub enum PropValue {
    Str(Rc<str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Handler(EventHandler),
    /// Opaque shared value, compared by pointer identity.
    Any(Rc<dyn Any>),
}

impl PropValue {
    /// Wrap an arbitrary value.
    pub fn any<T: 'static>(value: T) -> Self {
        PropValue::Any(Rc::new(value))
    }

    /// Host attribute text for scalar values; `None` for handlers and opaque values.
    pub fn as_attribute(&self) -> Option<String> {
        match self {
            PropValue::Str(s) => Some(s.to_string()),
            PropValue::Int(i) => Some(i.to_string()),
            PropValue::Float(f) => Some(f.to_string()),
            PropValue::Bool(b) => Some(b.to_string()),
            PropValue::Handler(_) | PropValue::Any(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropValue::Float(f) => Some(*f),
            PropValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Downcast an opaque value.
    pub fn downcast<T: 'static>(&self) -> Option<Rc<T>> {
        match self {
            PropValue::Any(v) => Rc::clone(v).downcast::<T>().ok(),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            PropValue::Str(_) => "Str",
            PropValue::Int(_) => "Int",
            PropValue::Float(_) => "Float",
            PropValue::Bool(_) => "Bool",
            PropValue::Handler(_) => "Handler",
            PropValue::Any(_) => "Any",
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a == b,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => a == b,
            (PropValue::Any(a), PropValue::Any(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => write!(f, "Str({s:?})"),
            PropValue::Int(i) => write!(f, "Int({i})"),
            PropValue::Float(x) => write!(f, "Float({x})"),
            PropValue::Bool(b) => write!(f, "Bool({b})"),
            other => write!(f, "{}(..)", other.type_name()),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

macro_rules! prop_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for PropValue {
            fn from(value: $t) -> Self {
                PropValue::Int(value as i64)
            }
        })*
    };
}

prop_from_int!(i32, i64, u32, u64, usize);

/// Props mapping plus the children passed to a component.
#[derive(Clone, Default)]
pub struct Props {
    values: BTreeMap<String, PropValue>,
    children: Vec<Element>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value (builder).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PropValue::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(PropValue::as_int)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(PropValue::as_bool)
    }

    pub fn get_handler(&self, key: &str) -> Option<&EventHandler> {
        self.get(key).and_then(PropValue::as_handler)
    }

    pub fn get_any<T: 'static>(&self, key: &str) -> Option<Rc<T>> {
        self.get(key).and_then(PropValue::downcast::<T>)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterate `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("values", &self.values)
            .field("children", &self.children.len())
            .finish()
    }
}
