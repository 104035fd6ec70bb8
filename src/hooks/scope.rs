//! Render scope: which instance the hook calls on this thread belong to.
//!
//! The reconciler pushes a scope before invoking a component function and the
//! returned guard pops it again, also on unwind, so nested renders never see
//! each other's cursor.

use std::cell::RefCell;
use std::rc::Rc;

use super::context::{ContextScoping, ProviderChain, SharedStore};
use super::slot::HookState;
use crate::runtime::scheduler::SchedulerHandle;
use crate::runtime::store::InstanceId;

pub(crate) struct RenderScope {
    pub instance: InstanceId,
    pub hooks: Rc<RefCell<HookState>>,
    pub scheduler: SchedulerHandle,
    pub providers: ProviderChain,
    pub shared: SharedStore,
    pub scoping: ContextScoping,
}

thread_local! {
    static SCOPES: RefCell<Vec<Rc<RenderScope>>> = const { RefCell::new(Vec::new()) };
}

/// Pops the scope it was created for when dropped.
pub(crate) struct ScopeGuard {
    depth: usize,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPES.with(|scopes| {
            let mut scopes = scopes.borrow_mut();
            debug_assert_eq!(scopes.len(), self.depth, "render scopes popped out of order");
            scopes.pop();
        });
    }
}

/// Make `scope` current until the guard is dropped.
pub(crate) fn enter(scope: RenderScope) -> ScopeGuard {
    scope.hooks.borrow_mut().begin_render();
    SCOPES.with(|scopes| {
        let mut scopes = scopes.borrow_mut();
        scopes.push(Rc::new(scope));
        ScopeGuard {
            depth: scopes.len(),
        }
    })
}

/// The innermost scope.
///
/// # Panics
///
/// Panics when called outside a component render.
pub(crate) fn current() -> Rc<RenderScope> {
    try_current().expect("hooks can only be called while a component is rendering")
}

pub(crate) fn try_current() -> Option<Rc<RenderScope>> {
    SCOPES.with(|scopes| scopes.borrow().last().cloned())
}
