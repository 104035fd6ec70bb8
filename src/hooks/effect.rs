//! `use_effect`: side effects that run after the patch completes.

use super::deps::{deps_changed, Deps};
use super::scope;
use super::slot::{hook_order_violation, EffectSlot, HookSlot, IntoCleanup, PendingEffect};

/// Queue `effect` to run after the current render pass is patched.
///
/// With `None` deps the effect runs after every render. With `Some(deps)` it
/// runs on the first render and whenever any entry differs from the previous
/// run; otherwise the slot is carried forward untouched, cleanup included.
/// When it re-runs, the cleanup returned by its previous run goes first.
///
/// Deps are compared against the last run, not the last render: they are
/// stored only when the queued effect actually runs, so a pass that fails
/// before effects flush leaves the effect due on the next render.
pub fn use_effect<F, R>(effect: F, deps: Option<Deps>)
where
    F: FnOnce() -> R + 'static,
    R: IntoCleanup,
{
    let scope = scope::current();
    let mut guard = scope.hooks.borrow_mut();
    let hooks = &mut *guard;
    let index = hooks.advance();

    let changed = match hooks.slots.get(index) {
        Some(HookSlot::Effect(slot)) => deps_changed(slot.deps.as_ref(), deps.as_ref()),
        Some(other) => hook_order_violation(other, index, "use_effect"),
        None => true,
    };
    if !changed {
        return;
    }

    if index == hooks.slots.len() {
        hooks.slots.push(HookSlot::Effect(EffectSlot {
            deps: None,
            cleanup: None,
        }));
    }
    hooks.queue_effect(PendingEffect {
        slot: index,
        deps,
        body: Box::new(move || effect().into_cleanup()),
    });
}
