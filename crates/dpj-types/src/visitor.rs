use crate::ty::TypeKind;
use crate::{TypeId, TypeStore};

/// Per-variant dispatch over types.
///
/// Every `visit_*` method defaults to [`TypeVisitor::visit_type`], so a visitor only overrides
/// the variants it treats specially. [`TypeStore::accept`] matches exhaustively on the variant,
/// so adding a variant without a dispatch case does not compile.
pub trait TypeVisitor<S> {
    type Output;

    fn visit_type(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output;

    fn visit_primitive(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output {
        self.visit_type(store, ty, arg)
    }

    fn visit_class_type(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output {
        self.visit_type(store, ty, arg)
    }

    fn visit_error_type(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output {
        self.visit_type(store, ty, arg)
    }

    fn visit_wildcard_type(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output {
        self.visit_type(store, ty, arg)
    }

    fn visit_array_type(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output {
        self.visit_type(store, ty, arg)
    }

    fn visit_method_type(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output {
        self.visit_type(store, ty, arg)
    }

    fn visit_package_type(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output {
        self.visit_type(store, ty, arg)
    }

    fn visit_type_var(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output {
        self.visit_type(store, ty, arg)
    }

    fn visit_captured_type(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output {
        self.visit_type_var(store, ty, arg)
    }

    fn visit_for_all(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output {
        self.visit_type(store, ty, arg)
    }

    fn visit_undet_var(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output {
        self.visit_type(store, ty, arg)
    }

    /// `void` and the missing type.
    fn visit_no_type(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output {
        self.visit_type(store, ty, arg)
    }

    fn visit_bottom(&mut self, store: &TypeStore, ty: TypeId, arg: S) -> Self::Output {
        self.visit_type(store, ty, arg)
    }
}

impl TypeStore {
    pub fn accept<S, V>(&self, ty: TypeId, visitor: &mut V, arg: S) -> V::Output
    where
        V: TypeVisitor<S> + ?Sized,
    {
        match self.data(ty).kind() {
            TypeKind::Primitive(_) => visitor.visit_primitive(self, ty, arg),
            TypeKind::Void | TypeKind::None => visitor.visit_no_type(self, ty, arg),
            TypeKind::Bottom => visitor.visit_bottom(self, ty, arg),
            TypeKind::Package => visitor.visit_package_type(self, ty, arg),
            TypeKind::Class(_) => visitor.visit_class_type(self, ty, arg),
            TypeKind::Error(_) => visitor.visit_error_type(self, ty, arg),
            TypeKind::Array(_) => visitor.visit_array_type(self, ty, arg),
            TypeKind::Method(_) => visitor.visit_method_type(self, ty, arg),
            TypeKind::ForAll(_) => visitor.visit_for_all(self, ty, arg),
            TypeKind::TypeVar(_) => visitor.visit_type_var(self, ty, arg),
            TypeKind::Captured(_) => visitor.visit_captured_type(self, ty, arg),
            TypeKind::Wildcard(_) => visitor.visit_wildcard_type(self, ty, arg),
            TypeKind::UndetVar(_) => visitor.visit_undet_var(self, ty, arg),
        }
    }

    /// Type variables occurring free in `ty`, in first-occurrence order.
    pub fn free_type_vars(&self, ty: TypeId) -> Vec<TypeId> {
        let mut collector = FreeTypeVars::default();
        let bound: &[TypeId] = &[];
        self.accept(ty, &mut collector, bound);
        collector.found
    }
}

#[derive(Default)]
struct FreeTypeVars {
    found: Vec<TypeId>,
}

impl FreeTypeVars {
    fn visit_all(&mut self, store: &TypeStore, types: &[TypeId], bound: &[TypeId]) {
        for ty in types {
            store.accept(*ty, self, bound);
        }
    }
}

impl<'a> TypeVisitor<&'a [TypeId]> for FreeTypeVars {
    type Output = ();

    fn visit_type(&mut self, _store: &TypeStore, _ty: TypeId, _bound: &'a [TypeId]) {}

    fn visit_class_type(&mut self, store: &TypeStore, ty: TypeId, bound: &'a [TypeId]) {
        if let Some(outer) = store.enclosing_type(ty) {
            store.accept(outer, self, bound);
        }
        self.visit_all(store, &store.type_arguments(ty), bound);
    }

    fn visit_wildcard_type(&mut self, store: &TypeStore, ty: TypeId, bound: &'a [TypeId]) {
        if let TypeKind::Wildcard(w) = store.data(ty).kind() {
            store.accept(w.ty(), self, bound);
        }
    }

    fn visit_array_type(&mut self, store: &TypeStore, ty: TypeId, bound: &'a [TypeId]) {
        if let TypeKind::Array(a) = store.data(ty).kind() {
            store.accept(a.elem(), self, bound);
        }
    }

    fn visit_method_type(&mut self, store: &TypeStore, ty: TypeId, bound: &'a [TypeId]) {
        self.visit_all(store, &store.parameter_types(ty), bound);
        if let Some(restype) = store.return_type(ty) {
            store.accept(restype, self, bound);
        }
        self.visit_all(store, &store.thrown_types(ty), bound);
    }

    fn visit_type_var(&mut self, _store: &TypeStore, ty: TypeId, bound: &'a [TypeId]) {
        if !bound.contains(&ty) && !self.found.contains(&ty) {
            self.found.push(ty);
        }
    }

    fn visit_for_all(&mut self, store: &TypeStore, ty: TypeId, bound: &'a [TypeId]) {
        if let TypeKind::ForAll(forall) = store.data(ty).kind() {
            let mut inner = bound.to_vec();
            inner.extend(forall.tvars().iter().copied());
            store.accept(forall.qtype(), self, inner.as_slice());
        }
    }
}
