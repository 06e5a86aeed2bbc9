//! Structural mapping over types, and substitution built on top of it.
//!
//! [`TypeStore::map`] applies a [`Mapping`] to the immediate children of a type and rebuilds the
//! type only when some child changed. A mapping that wants to reach deeper calls
//! [`TypeStore::map`] again from its own [`Mapping::apply`], the way [`Subst`] does.

use std::rc::Rc;

use crate::ty::{ClassType, ForAll, TypeData, TypeKind, WildcardType};
use crate::{TypeId, TypeList, TypeStore};

/// A named function from types to types.
///
/// Implementations must be pure with respect to the types they are given: returning the
/// argument unchanged is how a mapping says "nothing to do here", and callers compare handles
/// to decide whether anything changed.
pub trait Mapping {
    fn name(&self) -> &str;

    fn apply(&mut self, store: &TypeStore, ty: TypeId) -> TypeId;
}

/// A [`Mapping`] backed by a closure.
pub struct FnMapping<F> {
    name: &'static str,
    f: F,
}

/// Wrap a closure as a named mapping.
pub fn mapping<F>(name: &'static str, f: F) -> FnMapping<F>
where
    F: FnMut(&TypeStore, TypeId) -> TypeId,
{
    FnMapping { name, f }
}

impl<F> Mapping for FnMapping<F>
where
    F: FnMut(&TypeStore, TypeId) -> TypeId,
{
    fn name(&self) -> &str {
        self.name
    }

    fn apply(&mut self, store: &TypeStore, ty: TypeId) -> TypeId {
        (self.f)(store, ty)
    }
}

impl TypeStore {
    /// Apply `f` to every immediate child of `ty`.
    ///
    /// Returns `ty` itself when every child came back unchanged; otherwise a new type of the
    /// same variant with the mapped children and every other field copied. Leaf types and the
    /// error type are always returned unchanged.
    pub fn map<M: Mapping + ?Sized>(&self, ty: TypeId, f: &mut M) -> TypeId {
        let data = self.data(ty);
        match &data.kind {
            TypeKind::Class(class) => self.map_class(ty, &data, class, f),
            TypeKind::Array(array) => {
                let elem = f.apply(self, array.elem);
                if elem == array.elem {
                    return ty;
                }
                self.array_type(elem, None, None)
            }
            TypeKind::Method(method) => {
                let params = self.map_list(&method.params, f);
                let restype = f.apply(self, method.restype);
                let old_thrown = method.thrown.borrow().clone();
                let thrown = self.map_list(&old_thrown, f);
                if Rc::ptr_eq(&params, &method.params)
                    && restype == method.restype
                    && Rc::ptr_eq(&thrown, &old_thrown)
                {
                    return ty;
                }
                self.alloc_method(params, restype, thrown, method.call_site.get().cloned())
            }
            TypeKind::ForAll(forall) => self.map_for_all(ty, forall, f),
            TypeKind::Wildcard(wildcard) => self.map_wildcard(ty, wildcard, f),
            TypeKind::Error(_)
            | TypeKind::Primitive(_)
            | TypeKind::Void
            | TypeKind::None
            | TypeKind::Bottom
            | TypeKind::Package
            | TypeKind::TypeVar(_)
            | TypeKind::Captured(_)
            | TypeKind::UndetVar(_) => ty,
        }
    }

    /// Apply `f` to every element of `list`, returning `list` itself when nothing changed.
    ///
    /// Elements are visited last to first.
    ///
    /// An `Rc<[T]>` cannot share a suffix with another slice, so a changed list is copied whole.
    pub fn map_list<M: Mapping + ?Sized>(&self, list: &TypeList, f: &mut M) -> TypeList {
        let mut mapped: Option<Vec<TypeId>> = None;
        for (idx, ty) in list.iter().enumerate().rev() {
            let new_ty = f.apply(self, *ty);
            if new_ty != *ty {
                mapped.get_or_insert_with(|| list.to_vec())[idx] = new_ty;
            }
        }
        match mapped {
            Some(types) => Rc::from(types),
            None => list.clone(),
        }
    }

    fn map_class<M: Mapping + ?Sized>(
        &self,
        ty: TypeId,
        data: &TypeData,
        class: &ClassType,
        f: &mut M,
    ) -> TypeId {
        let type_args = self.type_arguments(ty);
        let outer = f.apply(self, class.outer);
        let new_args = self.map_list(&type_args, f);
        if outer == class.outer && Rc::ptr_eq(&new_args, &type_args) {
            return ty;
        }
        let rebuilt = ClassType::new(
            outer,
            Some(new_args),
            class.rpl_args.get().cloned(),
            class.effect_args.get().cloned(),
            class.cell_type.get(),
        );
        self.alloc(TypeData {
            symbol: data.symbol,
            erased: data.erased,
            constant: data.constant.clone(),
            kind: TypeKind::Class(rebuilt),
        })
    }

    fn map_for_all<M: Mapping + ?Sized>(&self, ty: TypeId, forall: &ForAll, f: &mut M) -> TypeId {
        let qtype = f.apply(self, forall.qtype);
        if qtype == forall.qtype {
            return ty;
        }
        self.for_all(
            forall.tvars.to_vec(),
            forall.rvars.to_vec(),
            forall.evars.to_vec(),
            qtype,
        )
    }

    fn map_wildcard<M: Mapping + ?Sized>(
        &self,
        ty: TypeId,
        wildcard: &WildcardType,
        f: &mut M,
    ) -> TypeId {
        let bound = f.apply(self, wildcard.ty);
        if bound == wildcard.ty {
            return ty;
        }
        self.wildcard(bound, wildcard.kind, wildcard.formal.get())
    }

    /// Replace every occurrence of the type variables `from` in `ty` by the corresponding
    /// types in `to`.
    pub fn subst(&self, ty: TypeId, from: &[TypeId], to: &[TypeId]) -> TypeId {
        Subst::new(from, to).apply(self, ty)
    }

    pub fn subst_list(&self, types: &TypeList, from: &[TypeId], to: &[TypeId]) -> TypeList {
        self.map_list(types, &mut Subst::new(from, to))
    }
}

/// Substitution of types for type variables.
///
/// A variable matches when it is the same type, or another occurrence of the same declared
/// variable. Variables quantified by a nested `ForAll` shadow the substitution inside it.
#[derive(Clone, Debug)]
pub struct Subst {
    pairs: Vec<(TypeId, TypeId)>,
}

impl Subst {
    /// Pairs `from[i]` with `to[i]`; extra entries on either side are ignored.
    pub fn new(from: &[TypeId], to: &[TypeId]) -> Self {
        Self {
            pairs: from.iter().copied().zip(to.iter().copied()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn lookup(&self, store: &TypeStore, var: TypeId) -> Option<TypeId> {
        let var_symbol = store.as_element(var);
        self.pairs.iter().find_map(|(from, to)| {
            let same = *from == var
                || (var_symbol.is_some() && store.as_element(*from) == var_symbol);
            same.then_some(*to)
        })
    }

    fn without(&self, store: &TypeStore, bound: &[TypeId]) -> Subst {
        let shadowed: Vec<_> = bound.iter().filter_map(|t| store.as_element(*t)).collect();
        Subst {
            pairs: self
                .pairs
                .iter()
                .filter(|(from, _)| {
                    !bound.contains(from)
                        && !store
                            .as_element(*from)
                            .is_some_and(|sym| shadowed.contains(&sym))
                })
                .copied()
                .collect(),
        }
    }
}

impl Mapping for Subst {
    fn name(&self) -> &str {
        "subst"
    }

    fn apply(&mut self, store: &TypeStore, ty: TypeId) -> TypeId {
        if self.pairs.is_empty() {
            return ty;
        }
        match store.data(ty).kind() {
            TypeKind::TypeVar(_) | TypeKind::Captured(_) => self.lookup(store, ty).unwrap_or(ty),
            TypeKind::ForAll(forall) => {
                let mut inner = self.without(store, &forall.tvars);
                if inner.is_empty() {
                    return ty;
                }
                store.map(ty, &mut inner)
            }
            _ => store.map(ty, self),
        }
    }
}
