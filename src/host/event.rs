//! Host events and the handler type stored on host nodes.

use std::fmt;
use std::rc::Rc;

/// An event delivered by the host to a node's handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Lower-case event name, e.g. `"click"`.
    pub name: String,
    /// Payload for value-carrying events such as `input`.
    pub value: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Attach a value payload (builder).
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Shared event callback.
///
/// Equality is pointer identity: a closure rebuilt on every render is a new
/// handler, the same `EventHandler` clone is not.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventHandler")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}
