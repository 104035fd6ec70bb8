//! Hooks: per-instance state, effects, memos, and shared values.
//!
//! Hooks are plain functions called from inside a component body. They find
//! their owning instance through the render scope the reconciler installs
//! around each component call, and address storage by call order.
//!
//! - [`use_state`]: persistent value plus a setter that schedules a re-render.
//! - [`use_effect`]: side effect run after the patch, with dependency gating and cleanup.
//! - [`use_memo`] / [`use_callback`]: cached values gated by dependencies.
//! - [`use_context`]: read a value published by a provider.
//!
//! Hooks must be called unconditionally and in the same order on every render.

pub mod context;
pub mod deps;
pub mod effect;
pub mod memo;
pub(crate) mod scope;
pub(crate) mod slot;
pub mod state;

pub use context::{create_context, use_context, ContextKey, ContextScoping, ContextToken};
pub use deps::{Dep, Deps};
pub use effect::use_effect;
pub use memo::{use_callback, use_memo};
pub use slot::{Cleanup, IntoCleanup};
pub use state::{use_state, use_state_with, Setter};
