//! Dependency arrays for effects and memos.
//!
//! Each entry compares by equivalence (`PartialEq` on values of the same
//! type) or, for shared handles wrapped with [`Dep::ptr`], by identity.
//! There is no deep structural comparison beyond what `PartialEq` does.
//!
//! Bare `f32` and `f64` entries compare bitwise instead: `NaN` equals `NaN`
//! and `0.0` differs from `-0.0`. Floats nested in other types (tuples,
//! structs) still go through their `PartialEq`, where `NaN` never matches.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

trait DepValue {
    fn same(&self, other: &dyn DepValue) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<T: PartialEq + 'static> DepValue for T {
    fn same(&self, other: &dyn DepValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Address of a shared allocation, for identity comparison.
#[derive(PartialEq)]
struct Address(*const ());

/// Bit pattern of a float, with every `NaN` folded into one.
#[derive(PartialEq)]
struct F64Bits(u64);

#[derive(PartialEq)]
struct F32Bits(u32);

/// One dependency entry.
#[derive(Clone)]
pub struct Dep(Rc<dyn DepValue>);

impl Dep {
    /// Compare by value.
    pub fn new<T: PartialEq + 'static>(value: T) -> Self {
        let any = &value as &dyn Any;
        if let Some(&x) = any.downcast_ref::<f64>() {
            let bits = if x.is_nan() { f64::NAN.to_bits() } else { x.to_bits() };
            return Dep(Rc::new(F64Bits(bits)));
        }
        if let Some(&x) = any.downcast_ref::<f32>() {
            let bits = if x.is_nan() { f32::NAN.to_bits() } else { x.to_bits() };
            return Dep(Rc::new(F32Bits(bits)));
        }
        Dep(Rc::new(value))
    }

    /// Compare by pointer identity of the shared allocation.
    pub fn ptr<T: ?Sized>(value: &Rc<T>) -> Self {
        Dep(Rc::new(Address(Rc::as_ptr(value).cast::<()>())))
    }

    fn same(&self, other: &Dep) -> bool {
        self.0.same(other.0.as_ref())
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dep(..)")
    }
}

/// Ordered dependency list. Build one with [`deps!`](crate::deps).
#[derive(Clone, Debug, Default)]
pub struct Deps(Vec<Dep>);

impl Deps {
    /// An empty list: the hook runs once and never again.
    pub fn none() -> Self {
        Self::default()
    }

    /// Append a value dependency (builder).
    pub fn with<T: PartialEq + 'static>(mut self, value: T) -> Self {
        self.0.push(Dep::new(value));
        self
    }

    pub fn push(&mut self, dep: Dep) {
        self.0.push(dep);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any entry differs from `previous`. A length change is a change.
    pub fn differs_from(&self, previous: &Deps) -> bool {
        self.0.len() != previous.0.len()
            || self
                .0
                .iter()
                .zip(&previous.0)
                .any(|(next, prev)| !next.same(prev))
    }
}

impl From<Vec<Dep>> for Deps {
    fn from(value: Vec<Dep>) -> Self {
        Deps(value)
    }
}

/// Whether a hook with `next` deps must re-run given the `previous` ones.
///
/// Absent deps always re-run; a first run has no previous deps.
pub(crate) fn deps_changed(previous: Option<&Deps>, next: Option<&Deps>) -> bool {
    match (previous, next) {
        (_, None) | (None, Some(_)) => true,
        (Some(prev), Some(next)) => next.differs_from(prev),
    }
}

/// Build a [`Deps`] list from values: `deps![count, name.clone()]`.
#[macro_export]
macro_rules! deps {
    () => {
        $crate::hooks::Deps::none()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::hooks::Deps::from(vec![$($crate::hooks::Dep::new($value)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_values_are_unchanged() {
        let a = Deps::none().with(1).with("x");
        let b = Deps::none().with(1).with("x");
        assert!(!b.differs_from(&a));
    }

    #[test]
    fn one_differing_element_is_a_change() {
        let a = Deps::none().with(1).with(2);
        let b = Deps::none().with(1).with(3);
        assert!(b.differs_from(&a));
    }

    #[test]
    fn type_change_is_a_change() {
        let a = Deps::none().with(1_i32);
        let b = Deps::none().with(1_i64);
        assert!(b.differs_from(&a));
    }

    #[test]
    fn length_change_is_a_change() {
        let a = Deps::none().with(1);
        let b = Deps::none().with(1).with(2);
        assert!(b.differs_from(&a));
        assert!(a.differs_from(&b));
    }

    #[test]
    fn nan_is_stable_and_signed_zeros_differ() {
        let nan = Deps::none().with(f64::NAN);
        assert!(!Deps::none().with((-1.0_f64).sqrt()).differs_from(&nan));
        assert!(!Deps::none().with(f32::NAN).differs_from(&Deps::none().with(f32::NAN)));
        assert!(Deps::none().with(-0.0_f64).differs_from(&Deps::none().with(0.0_f64)));
        assert!(Deps::none().with(1.5_f64).differs_from(&nan));
        assert!(!Deps::none().with(1.5_f64).differs_from(&Deps::none().with(1.5_f64)));
    }

    #[test]
    fn float_widths_do_not_match() {
        let a = Deps::none().with(1.0_f32);
        let b = Deps::none().with(1.0_f64);
        assert!(b.differs_from(&a));
    }

    #[test]
    fn ptr_deps_compare_identity_not_value() {
        let shared = Rc::new(vec![1, 2, 3]);
        let same = Deps::from(vec![Dep::ptr(&shared)]);
        let again = Deps::from(vec![Dep::ptr(&shared.clone())]);
        let equal_value = Deps::from(vec![Dep::ptr(&Rc::new(vec![1, 2, 3]))]);
        assert!(!again.differs_from(&same));
        assert!(equal_value.differs_from(&same));
    }

    #[test]
    fn absent_deps_always_change() {
        let d = Deps::none();
        assert!(deps_changed(Some(&d), None));
        assert!(deps_changed(None, Some(&d)));
        assert!(!deps_changed(Some(&d), Some(&Deps::none())));
    }

    #[test]
    fn macro_builds_list() {
        let count = 3;
        let d = crate::deps![count, String::from("a")];
        assert_eq!(d.len(), 2);
        assert!(crate::deps![].is_empty());
    }
}
