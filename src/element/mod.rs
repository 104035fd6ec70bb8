//! Element model: immutable descriptions of what to render.
//!
//! - [`Element`]: closed union of host tags, component invocations, text, and empty.
//! - [`Props`] / [`PropValue`]: prop mapping; `on*` keys carry event handlers.
//! - [`ComponentRef`]: a render function compared by its Rust type.

pub mod component;
pub mod node;
pub mod props;

pub use component::{ComponentId, ComponentRef};
pub use node::{
    component, fragment, h, ComponentElement, Element, HostElement, IntoChildren, IntoElement,
    FRAGMENT_TAG,
};
pub use props::{event_name, PropValue, Props};
