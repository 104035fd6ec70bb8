//! # synact
//!
//! A minimal reactive UI runtime: components, hooks, keyed reconciliation, and
//! effect scheduling over a pluggable host tree.
//!
//! Components are plain Rust functions from [`Props`](element::Props) to an
//! [`Element`](element::Element) description. The runtime renders them, diffs
//! each new description against the previous one, and applies the minimal set
//! of mutations to a retained host tree through the [`Host`](host::Host)
//! trait. Hooks give each component instance persistent state keyed by its
//! identity path, so state survives re-renders and keyed moves.
//!
//! ## Core Systems
//!
//! - **[`element`]**: Element model: host tags, components, text, props
//! - **[`identity`]**: Keys and identity paths that name component instances
//! - **[`hooks`]**: `use_state`, `use_effect`, `use_memo`, `use_callback`, `use_context`
//! - **[`runtime`]**: Instance store, reconciler, scheduler, and mount API
//! - **[`host`]**: The host surface the reconciler patches
//! - **[`dom`]**: Slotmap-backed in-memory host with queries and event dispatch
//! - **[`testing`]**: Headless pilot and snapshot helpers
//! - **[`error`]**: Render errors and non-fatal diagnostics
//!
//! ## Logging
//!
//! The runtime emits [`tracing`] events (mounts, flush passes, disposals,
//! identity collisions). No subscriber is installed; applications and tests
//! choose their own.
//!
//! ## Example
//!
//! ```
//! use synact::prelude::*;
//!
//! fn counter(_: &Props) -> HostElement {
//!     let (count, set_count) = use_state(0);
//!     h("button")
//!         .on("click", move |_| set_count.update(|n| *n += 1))
//!         .child(count)
//! }
//!
//! let mut dom = Dom::new();
//! let container = dom.create_node("main");
//! let mut runtime = Runtime::new(dom);
//! runtime.mount(counter, &container).unwrap();
//!
//! let button = runtime.host().query_by_tag(container, "button")[0];
//! runtime.host().click(button);
//! runtime.flush().unwrap();
//! assert_eq!(runtime.host().inner_html(container), "<button>1</button>");
//! ```

// Element model
pub mod element;
pub mod identity;

// Hooks and runtime
pub mod hooks;
pub mod runtime;

// Host surface
pub mod dom;
pub mod host;

// Support
pub mod error;
pub mod testing;

pub use error::{Diagnostic, RenderError, Result};

/// Everything a component body usually needs.
pub mod prelude {
    pub use crate::deps;
    pub use crate::dom::{Dom, NodeId};
    pub use crate::element::{
        component, fragment, h, ComponentElement, ComponentRef, Element, HostElement,
        IntoElement, PropValue, Props,
    };
    pub use crate::hooks::{
        create_context, use_callback, use_context, use_effect, use_memo, use_state, Cleanup,
        ContextToken, Setter,
    };
    pub use crate::host::{Event, Host};
    pub use crate::identity::Key;
    pub use crate::runtime::{MountHandle, Runtime, RuntimeConfig};
}
