use std::fmt;
use std::rc::Rc;

use dpj_regions::{Effects, Rpl};

/// Handle to a type allocated in a [`crate::TypeStore`].
///
/// Two handles are equal exactly when they name the same allocation, so handle equality is the
/// "same object" test that structural mapping relies on.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Handle to a symbol allocated in a [`crate::TypeStore`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// Shared, immutable list of types. `Rc::ptr_eq` is list identity.
pub type TypeList = Rc<[TypeId]>;
pub type RplList = Rc<[Rpl]>;
pub type EffectsList = Rc<[Effects]>;

pub(crate) fn empty_types() -> TypeList {
    Rc::from(Vec::new())
}

pub(crate) fn empty_rpls() -> RplList {
    Rc::from(Vec::new())
}

pub(crate) fn empty_effects() -> EffectsList {
    Rc::from(Vec::new())
}

/// `outer ++ inner`, reusing `inner` when there is nothing to prepend.
pub(crate) fn prepend_list<T: Clone>(outer: &Rc<[T]>, inner: &Rc<[T]>) -> Rc<[T]> {
    if outer.is_empty() {
        return inner.clone();
    }
    if inner.is_empty() {
        return outer.clone();
    }
    let mut out = Vec::with_capacity(outer.len() + inner.len());
    out.extend(outer.iter().cloned());
    out.extend(inner.iter().cloned());
    Rc::from(out)
}
