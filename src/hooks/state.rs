//! `use_state`: persistent per-instance values with a re-render setter.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::scope;
use super::slot::{hook_order_violation, HookSlot, StateCell};
use crate::runtime::scheduler::SchedulerHandle;
use crate::runtime::store::InstanceId;

/// Declare a state slot initialised with `initial` on the first render.
///
/// Returns the current value and a [`Setter`]. Later renders ignore `initial`.
pub fn use_state<T: Clone + 'static>(initial: T) -> (T, Setter<T>) {
    use_state_with(move || initial)
}

/// Like [`use_state`], computing the initial value only on the first render.
pub fn use_state_with<T: Clone + 'static>(init: impl FnOnce() -> T) -> (T, Setter<T>) {
    let scope = scope::current();

    let (index, existing) = {
        let mut hooks = scope.hooks.borrow_mut();
        let index = hooks.advance();
        let existing = match hooks.slots.get(index) {
            Some(HookSlot::State(cell)) => Some(Rc::clone(cell)),
            Some(other) => hook_order_violation(other, index, "use_state"),
            None => None,
        };
        (index, existing)
    };

    let cell = match existing {
        Some(cell) => cell,
        None => {
            let cell: StateCell = Rc::new(RefCell::new(Box::new(init()) as Box<dyn Any>));
            scope
                .hooks
                .borrow_mut()
                .slots
                .push(HookSlot::State(Rc::clone(&cell)));
            tracing::trace!(slot = index, "allocated state slot");
            cell
        }
    };

    let value = cell
        .borrow()
        .downcast_ref::<T>()
        .expect("state slot type changed between renders")
        .clone();

    let setter = Setter {
        cell,
        instance: scope.instance,
        scheduler: scope.scheduler.clone(),
        _marker: PhantomData,
    };
    (value, setter)
}

/// Writes a state slot and schedules its instance for re-render.
///
/// The write is immediate; the re-render happens at the next scheduler flush,
/// and any number of writes before then collapse into one re-render.
pub struct Setter<T> {
    cell: StateCell,
    instance: InstanceId,
    scheduler: SchedulerHandle,
    _marker: PhantomData<fn(T)>,
}

impl<T: 'static> Setter<T> {
    /// Overwrite the value.
    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = Box::new(value) as Box<dyn Any>;
        self.scheduler.request(self.instance);
    }

    /// Modify the value in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut slot = self.cell.borrow_mut();
            let value = slot
                .downcast_mut::<T>()
                .expect("state slot type changed between renders");
            f(value);
        }
        self.scheduler.request(self.instance);
    }

    /// The latest written value, which may be newer than the rendered one.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell
            .borrow()
            .downcast_ref::<T>()
            .expect("state slot type changed between renders")
            .clone()
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
            instance: self.instance,
            scheduler: self.scheduler.clone(),
            _marker: PhantomData,
        }
    }
}

/// Setters are equal when they write the same slot.
impl<T> PartialEq for Setter<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("instance", &self.instance)
            .finish()
    }
}
