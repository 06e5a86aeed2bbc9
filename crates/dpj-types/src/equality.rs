use std::hash::{Hash, Hasher};

use crate::ty::{TypeKind, TypeTag};
use crate::{TypeId, TypeStore};

impl TypeStore {
    /// Cheap structural equality that never completes a class.
    ///
    /// Array types compare by element type only, ignoring region and index variable; method
    /// types compare parameter types then return type. Everything else is identity.
    pub fn types_equal(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        let (da, db) = (self.data(a), self.data(b));
        match (da.kind(), db.kind()) {
            (TypeKind::Array(x), TypeKind::Array(y)) => self.types_equal(x.elem, y.elem),
            (TypeKind::Method(x), TypeKind::Method(y)) => {
                x.params.len() == y.params.len()
                    && x
                        .params
                        .iter()
                        .zip(y.params.iter())
                        .all(|(p, q)| self.types_equal(*p, *q))
                    && self.types_equal(x.restype, y.restype)
            }
            _ => false,
        }
    }

    /// Hash consistent with [`TypeStore::types_equal`].
    pub fn type_hash(&self, ty: TypeId) -> u32 {
        match self.data(ty).kind() {
            TypeKind::Array(array) => {
                ((TypeTag::Array as u32) << 5).wrapping_add(self.type_hash(array.elem))
            }
            TypeKind::Method(method) => {
                let h = method.params.iter().fold(TypeTag::Method as u32, |h, p| {
                    (h << 5).wrapping_add(self.type_hash(*p))
                });
                (h << 5).wrapping_add(self.type_hash(method.restype))
            }
            _ => ty.index(),
        }
    }

    /// Wrap `ty` so it can key a hash map under structural equality.
    pub fn key(&self, ty: TypeId) -> TypeKey<'_> {
        TypeKey { store: self, ty }
    }
}

/// A type compared and hashed structurally (see [`TypeStore::types_equal`]).
#[derive(Clone, Copy)]
pub struct TypeKey<'s> {
    store: &'s TypeStore,
    ty: TypeId,
}

impl TypeKey<'_> {
    pub fn ty(&self) -> TypeId {
        self.ty
    }
}

impl PartialEq for TypeKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.store.types_equal(self.ty, other.ty)
    }
}

impl Eq for TypeKey<'_> {}

impl Hash for TypeKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.store.type_hash(self.ty).hash(state);
    }
}

impl std::fmt::Debug for TypeKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypeKey").field(&self.ty).finish()
    }
}
