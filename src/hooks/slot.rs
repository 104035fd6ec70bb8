//! Per-instance hook storage.
//!
//! Slots are positional: the Nth hook call in a component body always reads
//! and writes the Nth slot. The cursor is reset at the start of every render.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::deps::Deps;

/// Callback registered by an effect, run before the effect's next execution
/// or when its instance is disposed.
pub struct Cleanup(Box<dyn FnOnce()>);

impl Cleanup {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn run(self) {
        (self.0)()
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cleanup(..)")
    }
}

/// Values an effect body may return.
pub trait IntoCleanup {
    fn into_cleanup(self) -> Option<Cleanup>;
}

impl IntoCleanup for () {
    fn into_cleanup(self) -> Option<Cleanup> {
        None
    }
}

impl IntoCleanup for Cleanup {
    fn into_cleanup(self) -> Option<Cleanup> {
        Some(self)
    }
}

impl IntoCleanup for Option<Cleanup> {
    fn into_cleanup(self) -> Option<Cleanup> {
        self
    }
}

pub(crate) type StateCell = Rc<RefCell<Box<dyn Any>>>;

pub(crate) struct EffectSlot {
    pub deps: Option<Deps>,
    pub cleanup: Option<Cleanup>,
}

pub(crate) struct MemoSlot {
    pub value: Rc<dyn Any>,
    pub deps: Option<Deps>,
}

pub(crate) enum HookSlot {
    State(StateCell),
    Effect(EffectSlot),
    Memo(MemoSlot),
}

impl HookSlot {
    fn kind(&self) -> &'static str {
        match self {
            HookSlot::State(_) => "use_state",
            HookSlot::Effect(_) => "use_effect",
            HookSlot::Memo(_) => "use_memo",
        }
    }
}

pub(crate) struct PendingEffect {
    pub slot: usize,
    /// Committed to the slot when the body runs.
    pub deps: Option<Deps>,
    pub body: Box<dyn FnOnce() -> Option<Cleanup>>,
}

/// Hook slots, cursor, and the effects queued by the current render.
#[derive(Default)]
pub(crate) struct HookState {
    pub slots: Vec<HookSlot>,
    cursor: usize,
    pending: Vec<PendingEffect>,
}

impl HookState {
    /// Reset the cursor and drop effects queued by an aborted render.
    pub fn begin_render(&mut self) {
        self.cursor = 0;
        self.pending.clear();
    }

    /// Claim the next slot index.
    pub fn advance(&mut self) -> usize {
        let index = self.cursor;
        self.cursor += 1;
        index
    }

    pub fn queue_effect(&mut self, effect: PendingEffect) {
        self.pending.push(effect);
    }

    /// Take every effect cleanup, in slot order.
    pub fn take_cleanups(&mut self) -> Vec<Cleanup> {
        self.slots
            .iter_mut()
            .filter_map(|slot| match slot {
                HookSlot::Effect(effect) => effect.cleanup.take(),
                _ => None,
            })
            .collect()
    }
}

/// Panic for a slot that holds a different hook kind than the call expects.
pub(crate) fn hook_order_violation(slot: &HookSlot, index: usize, expected: &str) -> ! {
    panic!(
        "hook #{index} was {} on a previous render but is now {expected}; \
         hooks must be called in the same order on every render",
        slot.kind()
    )
}

/// Run the effects queued by the last render of one instance, in slot order,
/// committing each effect's deps as it runs.
///
/// No borrow of the hook state is held while user code runs.
pub(crate) fn run_pending_effects(hooks: &Rc<RefCell<HookState>>) -> usize {
    let pending = std::mem::take(&mut hooks.borrow_mut().pending);
    let count = pending.len();
    for effect in pending {
        let previous = match hooks.borrow_mut().slots.get_mut(effect.slot) {
            Some(HookSlot::Effect(slot)) => {
                slot.deps = effect.deps;
                slot.cleanup.take()
            }
            _ => None,
        };
        if let Some(cleanup) = previous {
            cleanup.run();
        }
        let cleanup = (effect.body)();
        if let Some(HookSlot::Effect(slot)) = hooks.borrow_mut().slots.get_mut(effect.slot) {
            slot.cleanup = cleanup;
        }
    }
    count
}
