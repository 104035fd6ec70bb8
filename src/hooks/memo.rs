//! `use_memo` and `use_callback`.

use std::any::Any;
use std::rc::Rc;

use super::deps::{deps_changed, Deps};
use super::scope;
use super::slot::{hook_order_violation, HookSlot, MemoSlot};

/// Return the cached value, recomputing with `factory` only when `deps`
/// changed (or are absent).
pub fn use_memo<T: Clone + 'static>(factory: impl FnOnce() -> T, deps: Option<Deps>) -> T {
    let scope = scope::current();

    let index = {
        let mut hooks = scope.hooks.borrow_mut();
        let index = hooks.advance();
        match hooks.slots.get(index) {
            Some(HookSlot::Memo(slot)) => {
                if !deps_changed(slot.deps.as_ref(), deps.as_ref()) {
                    if let Some(value) = slot.value.downcast_ref::<T>() {
                        return value.clone();
                    }
                }
            }
            Some(other) => hook_order_violation(other, index, "use_memo"),
            None => {}
        }
        index
    };

    let value = factory();
    let slot = HookSlot::Memo(MemoSlot {
        value: Rc::new(value.clone()) as Rc<dyn Any>,
        deps,
    });
    let mut hooks = scope.hooks.borrow_mut();
    if index < hooks.slots.len() {
        hooks.slots[index] = slot;
    } else {
        hooks.slots.push(slot);
    }
    value
}

/// Memoize a callback: the same `Rc` comes back while `deps` are unchanged.
pub fn use_callback<F: 'static>(callback: F, deps: Option<Deps>) -> Rc<F> {
    use_memo(move || Rc::new(callback), deps)
}
