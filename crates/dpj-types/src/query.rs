//! Structural queries over types.
//!
//! Every accessor has a conservative default (empty list, `None`, `false`) and the variants
//! that mean something by it override that default here, in one match per query.

use std::cell::OnceCell;
use std::rc::Rc;

use dpj_regions::Rpl;

use crate::error::invariant_violation;
use crate::ids::{empty_effects, empty_rpls, empty_types, prepend_list};
use crate::ty::{ClassType, ConstValue, ModelKind, TypeData, TypeKind, TypeTag, TypeVar};
use crate::{
    CompletionError, EffectsList, RplList, SymbolFlags, SymbolId, TypeError, TypeId, TypeList,
    TypeStore,
};

impl TypeStore {
    pub fn tag(&self, ty: TypeId) -> TypeTag {
        self.data(ty).tag()
    }

    /// The declaration this type stands for.
    pub fn as_element(&self, ty: TypeId) -> Option<SymbolId> {
        self.data(ty).symbol
    }

    pub fn is_erased(&self, ty: TypeId) -> bool {
        self.data(ty).erased
    }

    pub fn const_value(&self, ty: TypeId) -> Option<ConstValue> {
        self.data(ty).constant.clone()
    }

    // ---------------------------------------------------------------------------------------
    // Argument lists
    // ---------------------------------------------------------------------------------------

    pub fn type_arguments(&self, ty: TypeId) -> TypeList {
        let data = self.data(ty);
        match &data.kind {
            TypeKind::Class(class) => self.class_type_args(&data, class),
            TypeKind::ForAll(forall) => forall.tvars.clone(),
            TypeKind::UndetVar(undet) => self.type_arguments(undet.origin),
            _ => empty_types(),
        }
    }

    /// Region arguments.
    ///
    /// A class type written without region arguments (`new C()` for `class C<region R>`) gets
    /// one `Root` per formal region parameter, unless the type is erased. The result is
    /// computed once and cached.
    pub fn rpl_arguments(&self, ty: TypeId) -> RplList {
        let data = self.data(ty);
        match &data.kind {
            TypeKind::Class(class) => self.class_rpl_args(ty, &data, class),
            TypeKind::ForAll(forall) => forall.rvars.clone(),
            TypeKind::TypeVar(var) => type_var_rpl_args(var),
            TypeKind::Captured(captured) => type_var_rpl_args(&captured.var),
            _ => empty_rpls(),
        }
    }

    pub fn effect_arguments(&self, ty: TypeId) -> EffectsList {
        let data = self.data(ty);
        match &data.kind {
            TypeKind::Class(class) => self.declared_list(&class.effect_args, data.symbol),
            TypeKind::ForAll(forall) => forall.evars.clone(),
            TypeKind::UndetVar(undet) => self.effect_arguments(undet.origin),
            _ => empty_effects(),
        }
    }

    fn class_type_args(&self, data: &TypeData, class: &ClassType) -> TypeList {
        self.declared_list(&class.type_args, data.symbol)
    }

    /// A write-once list of a class, completing its symbol first when it is still unset.
    ///
    /// A read made while the symbol's own completer runs answers empty and leaves the list
    /// unset for the completer to fill in.
    fn declared_list<T>(&self, cell: &OnceCell<Rc<[T]>>, symbol: Option<SymbolId>) -> Rc<[T]> {
        if let Some(list) = cell.get() {
            return list.clone();
        }
        self.complete_lazily(symbol);
        if let Some(list) = cell.get() {
            return list.clone();
        }
        if symbol.is_some_and(|sym| self.symbol(sym).is_completing()) {
            return Rc::from(Vec::new());
        }
        cell.get_or_init(|| Rc::from(Vec::new())).clone()
    }

    /// Cache a derived list unless some completion is still running.
    fn remember<T>(&self, cell: &OnceCell<Rc<[T]>>, value: Rc<[T]>) -> Rc<[T]> {
        if !self.caches_settled() {
            return value;
        }
        cell.get_or_init(|| value).clone()
    }

    fn class_rpl_args(&self, ty: TypeId, data: &TypeData, class: &ClassType) -> RplList {
        if let Some(resolved) = class.resolved_rpl_args.get() {
            return resolved.clone();
        }

        let declared = self.declared_list(&class.rpl_args, data.symbol);

        let mut resolved = declared;
        if !data.erased && resolved.is_empty() {
            let canonical = data.symbol.and_then(|sym| self.symbol_type(sym));
            if let Some(canonical) = canonical.filter(|c| *c != ty) {
                let formals = self.rpl_arguments(canonical).len();
                if formals > 0 {
                    resolved = Rc::from(vec![Rpl::root(); formals]);
                }
            }
        }

        self.remember(&class.resolved_rpl_args, resolved)
    }

    pub fn enclosing_type(&self, ty: TypeId) -> Option<TypeId> {
        match &self.data(ty).kind {
            TypeKind::Class(class) => Some(class.outer),
            TypeKind::Error(_) => Some(ty),
            TypeKind::ForAll(forall) => self.enclosing_type(forall.qtype),
            TypeKind::UndetVar(undet) => self.enclosing_type(undet.origin),
            _ => None,
        }
    }

    pub fn parameter_types(&self, ty: TypeId) -> TypeList {
        match &self.data(ty).kind {
            TypeKind::Method(method) => method.params.clone(),
            TypeKind::ForAll(forall) => self.parameter_types(forall.qtype),
            TypeKind::UndetVar(undet) => self.parameter_types(undet.origin),
            _ => empty_types(),
        }
    }

    pub fn return_type(&self, ty: TypeId) -> Option<TypeId> {
        match &self.data(ty).kind {
            TypeKind::Method(method) => Some(method.restype),
            TypeKind::Error(_) => Some(ty),
            TypeKind::ForAll(forall) => self.return_type(forall.qtype),
            TypeKind::UndetVar(undet) => self.return_type(undet.origin),
            _ => None,
        }
    }

    pub fn thrown_types(&self, ty: TypeId) -> TypeList {
        match &self.data(ty).kind {
            TypeKind::Method(method) => method.thrown.borrow().clone(),
            TypeKind::ForAll(forall) => self.thrown_types(forall.qtype),
            TypeKind::UndetVar(undet) => self.thrown_types(undet.origin),
            _ => empty_types(),
        }
    }

    /// Replace the thrown types of a method (or of the method a forall quantifies).
    pub fn set_thrown(&self, ty: TypeId, thrown: Vec<TypeId>) {
        match &self.data(ty).kind {
            TypeKind::Method(method) => *method.thrown.borrow_mut() = Rc::from(thrown),
            TypeKind::ForAll(forall) => self.set_thrown(forall.qtype, thrown),
            _ => invariant_violation(format_args!(
                "set_thrown on non-method type `{}`",
                self.display(ty)
            )),
        }
    }

    /// Declared supertype of a class type, completing its symbol first.
    pub fn supertype(&self, ty: TypeId) -> Option<TypeId> {
        let data = self.data(ty);
        let TypeKind::Class(class) = &data.kind else {
            return None;
        };
        if class.supertype.get().is_none() {
            self.complete_lazily(data.symbol);
        }
        class.supertype.get().copied()
    }

    pub fn interfaces(&self, ty: TypeId) -> TypeList {
        let data = self.data(ty);
        let TypeKind::Class(class) = &data.kind else {
            return empty_types();
        };
        if class.interfaces.get().is_none() {
            self.complete_lazily(data.symbol);
        }
        class.interfaces.get().cloned().unwrap_or_else(empty_types)
    }

    /// First region argument, or `Root`.
    pub fn owner_region(&self, ty: TypeId) -> Rpl {
        self.rpl_arguments(ty).first().cloned().unwrap_or_default()
    }

    // ---------------------------------------------------------------------------------------
    // Accumulated parameters across enclosing types (outer first)
    // ---------------------------------------------------------------------------------------

    pub fn all_type_params(&self, ty: TypeId) -> TypeList {
        let data = self.data(ty);
        match &data.kind {
            TypeKind::Class(class) => {
                if let Some(all) = class.all_type_params.get() {
                    return all.clone();
                }
                let own = self.class_type_args(&data, class);
                let all = prepend_list(&self.all_type_params(class.outer), &own);
                self.remember(&class.all_type_params, all)
            }
            TypeKind::Array(array) => self.all_type_params(array.elem),
            TypeKind::ForAll(forall) => self.all_type_params(forall.qtype),
            TypeKind::UndetVar(undet) => self.all_type_params(undet.origin),
            _ => empty_types(),
        }
    }

    pub fn all_rpl_params(&self, ty: TypeId) -> RplList {
        let data = self.data(ty);
        match &data.kind {
            TypeKind::Class(class) => {
                if let Some(all) = class.all_rpl_params.get() {
                    return all.clone();
                }
                let own = self.class_rpl_args(ty, &data, class);
                let all = prepend_list(&self.all_rpl_params(class.outer), &own);
                self.remember(&class.all_rpl_params, all)
            }
            _ => empty_rpls(),
        }
    }

    pub fn all_effect_params(&self, ty: TypeId) -> EffectsList {
        let data = self.data(ty);
        match &data.kind {
            TypeKind::Class(class) => {
                if let Some(all) = class.all_effect_params.get() {
                    return all.clone();
                }
                let own = self.effect_arguments(ty);
                let all = if class.outer != ty {
                    prepend_list(&self.all_effect_params(class.outer), &own)
                } else {
                    own
                };
                self.remember(&class.all_effect_params, all)
            }
            _ => empty_effects(),
        }
    }

    // ---------------------------------------------------------------------------------------
    // Predicates
    // ---------------------------------------------------------------------------------------

    pub fn is_primitive(&self, ty: TypeId) -> bool {
        self.tag(ty).is_primitive()
    }

    /// Does the type contain error elements anywhere in its structure?
    pub fn is_erroneous(&self, ty: TypeId) -> bool {
        let data = self.data(ty);
        match &data.kind {
            TypeKind::Error(_) => true,
            TypeKind::Class(class) => {
                self.is_erroneous(class.outer)
                    || self.is_erroneous_list(&self.class_type_args(&data, class))
                    || data
                        .symbol
                        .and_then(|sym| self.symbol_type(sym))
                        .is_some_and(|canonical| canonical != ty && self.is_erroneous(canonical))
            }
            TypeKind::Array(array) => self.is_erroneous(array.elem),
            TypeKind::Method(method) => {
                self.is_erroneous_list(&method.params) || self.is_erroneous(method.restype)
            }
            TypeKind::ForAll(forall) => self.is_erroneous(forall.qtype),
            TypeKind::UndetVar(undet) => self.is_erroneous(undet.origin),
            _ => false,
        }
    }

    pub fn is_erroneous_list(&self, types: &[TypeId]) -> bool {
        types.iter().any(|t| self.is_erroneous(*t))
    }

    /// A class type is parameterized if it or an enclosing type has type arguments; an array
    /// type if its element type is.
    pub fn is_parameterized(&self, ty: TypeId) -> bool {
        match &self.data(ty).kind {
            TypeKind::Class(_) => !self.all_type_params(ty).is_empty(),
            TypeKind::Array(array) => self.is_parameterized(array.elem),
            _ => false,
        }
    }

    pub fn has_region_params(&self, ty: TypeId) -> bool {
        match &self.data(ty).kind {
            TypeKind::Class(_) => !self.all_rpl_params(ty).is_empty(),
            _ => false,
        }
    }

    pub fn has_effect_params(&self, ty: TypeId) -> bool {
        match &self.data(ty).kind {
            TypeKind::Class(_) => !self.all_effect_params(ty).is_empty(),
            _ => false,
        }
    }

    /// A class type is raw if it is not its symbol's canonical type, the canonical type has
    /// type parameters somewhere along its enclosing chain, and this type has none at all.
    pub fn is_raw(&self, ty: TypeId) -> bool {
        let data = self.data(ty);
        match &data.kind {
            TypeKind::Class(_) => {
                let Some(canonical) = data.symbol.and_then(|sym| self.symbol_type(sym)) else {
                    return false;
                };
                canonical != ty
                    && !self.all_type_params(canonical).is_empty()
                    && self.all_type_params(ty).is_empty()
            }
            TypeKind::Array(array) => self.is_raw(array.elem),
            _ => false,
        }
    }

    /// Compound (intersection) class. Checked without completing the symbol, so a plain
    /// compound test never loads a class file.
    pub fn is_compound(&self, ty: TypeId) -> bool {
        let data = self.data(ty);
        if matches!(data.kind, TypeKind::Error(_)) {
            return false;
        }
        let Some(symbol) = data.symbol else {
            return false;
        };
        let sym = self.symbol(symbol);
        !sym.has_completer() && sym.raw_flags().contains(SymbolFlags::COMPOUND)
    }

    pub fn is_interface(&self, ty: TypeId) -> bool {
        let data = self.data(ty);
        if matches!(data.kind, TypeKind::Error(_)) {
            return false;
        }
        data.symbol
            .is_some_and(|sym| self.symbol_flags(sym).contains(SymbolFlags::INTERFACE))
    }

    /// Does `ty` contain an occurrence of `elem`? Every type contains itself.
    pub fn contains(&self, ty: TypeId, elem: TypeId) -> bool {
        if ty == elem {
            return true;
        }
        let data = self.data(ty);
        match &data.kind {
            TypeKind::Class(class) => {
                self.is_parameterized(ty)
                    && (self.contains(class.outer, elem)
                        || self.contains_list(&self.class_type_args(&data, class), elem))
            }
            TypeKind::Array(array) => self.contains(array.elem, elem),
            TypeKind::Method(method) => {
                self.contains_list(&method.params, elem) || self.contains(method.restype, elem)
            }
            TypeKind::ForAll(forall) => self.contains(forall.qtype, elem),
            _ => false,
        }
    }

    pub fn contains_list(&self, types: &[TypeId], elem: TypeId) -> bool {
        types.iter().any(|t| self.contains(*t, elem))
    }

    /// Does `ty` contain an occurrence of some type in `elems`?
    pub fn contains_some(&self, ty: TypeId, elems: &[TypeId]) -> bool {
        elems.iter().any(|elem| self.contains(ty, *elem))
    }

    // ---------------------------------------------------------------------------------------
    // Wildcards
    // ---------------------------------------------------------------------------------------

    pub fn is_super_bound(&self, ty: TypeId) -> bool {
        use crate::BoundKind;
        match &self.data(ty).kind {
            TypeKind::Wildcard(w) => matches!(w.kind, BoundKind::Super | BoundKind::Unbound),
            _ => false,
        }
    }

    pub fn is_extends_bound(&self, ty: TypeId) -> bool {
        use crate::BoundKind;
        match &self.data(ty).kind {
            TypeKind::Wildcard(w) => matches!(w.kind, BoundKind::Extends | BoundKind::Unbound),
            _ => false,
        }
    }

    pub fn is_unbound(&self, ty: TypeId) -> bool {
        match &self.data(ty).kind {
            TypeKind::Wildcard(w) => w.kind == crate::BoundKind::Unbound,
            _ => false,
        }
    }

    pub fn extends_bound(&self, ty: TypeId) -> Option<TypeId> {
        match &self.data(ty).kind {
            TypeKind::Wildcard(w) if w.kind == crate::BoundKind::Extends => Some(w.ty),
            _ => None,
        }
    }

    pub fn super_bound(&self, ty: TypeId) -> Option<TypeId> {
        match &self.data(ty).kind {
            TypeKind::Wildcard(w) if w.kind == crate::BoundKind::Super => Some(w.ty),
            _ => None,
        }
    }

    /// Attach the formal type variable a wildcard is an argument for.
    pub fn with_type_var(&self, ty: TypeId, formal: TypeId) -> TypeId {
        if let TypeKind::Wildcard(w) = &self.data(ty).kind {
            w.formal.set(Some(formal));
        }
        ty
    }

    /// A bounded wildcard becomes its bound; everything else is unchanged.
    pub fn remove_bounds(&self, ty: TypeId) -> TypeId {
        match &self.data(ty).kind {
            TypeKind::Wildcard(w) if w.kind != crate::BoundKind::Unbound => w.ty,
            _ => ty,
        }
    }

    pub fn remove_bounds_list(&self, types: &[TypeId]) -> Vec<TypeId> {
        types.iter().map(|t| self.remove_bounds(*t)).collect()
    }

    // ---------------------------------------------------------------------------------------
    // Type variables and inference placeholders
    // ---------------------------------------------------------------------------------------

    /// Upper bound of a type variable, read through its prototype when it has none of its own.
    pub fn upper_bound(&self, ty: TypeId) -> Option<TypeId> {
        match &self.data(ty).kind {
            TypeKind::TypeVar(var) => self.type_var_upper_bound(var),
            TypeKind::Captured(captured) => self.type_var_upper_bound(&captured.var),
            TypeKind::ForAll(forall) => self.upper_bound(forall.qtype),
            TypeKind::UndetVar(undet) => self.upper_bound(undet.origin),
            _ => None,
        }
    }

    fn type_var_upper_bound(&self, var: &TypeVar) -> Option<TypeId> {
        if let Some(bound) = var.bound.get() {
            return Some(*bound);
        }
        let proto = var.prototype?;
        match &self.data(proto).kind {
            TypeKind::TypeVar(p) => p.bound.get().copied(),
            TypeKind::Captured(p) => p.var.bound.get().copied(),
            _ => None,
        }
    }

    /// Bound of a fully declared type variable.
    ///
    /// Panics when the variable has neither a bound nor a prototype with one: that means the
    /// declaration was never completed, which is a compiler bug.
    pub fn type_var_bound(&self, ty: TypeId) -> TypeId {
        match self.upper_bound(ty) {
            Some(bound) => bound,
            None => invariant_violation(format_args!(
                "type variable `{}` has no bound",
                self.display(ty)
            )),
        }
    }

    pub fn lower_bound(&self, ty: TypeId) -> Option<TypeId> {
        match &self.data(ty).kind {
            TypeKind::TypeVar(var) => Some(var.lower),
            TypeKind::Captured(captured) => Some(captured.var.lower),
            _ => None,
        }
    }

    /// Set a type variable's bound. The bound is also written to the declaration the variable
    /// was copied from, so every occurrence observes the same bound.
    pub fn set_upper_bound(&self, ty: TypeId, bound: TypeId) -> Result<(), TypeError> {
        let data = self.data(ty);
        let var = match &data.kind {
            TypeKind::TypeVar(var) => var,
            TypeKind::Captured(captured) => &captured.var,
            _ => {
                return Err(TypeError::UnexpectedVariant {
                    expected: "type variable",
                    found: self.display(ty).to_string(),
                })
            }
        };
        let proto_data = var.prototype.map(|proto| self.data(proto));
        let proto_var = proto_data.as_deref().and_then(|d| match &d.kind {
            TypeKind::TypeVar(p) => Some(p),
            TypeKind::Captured(p) => Some(&p.var),
            _ => None,
        });

        for (target, owner) in [(Some(var), ty), (proto_var, var.prototype.unwrap_or(ty))] {
            let Some(target) = target else { continue };
            if target.bound.get().is_some_and(|existing| *existing != bound) {
                return Err(TypeError::AlreadySet {
                    field: "upper bound",
                    ty: self.display(owner).to_string(),
                });
            }
        }
        let _ = var.bound.set(bound);
        if let Some(proto) = proto_var {
            let _ = proto.bound.set(bound);
        }
        Ok(())
    }

    pub fn add_lower_bound(&self, undet: TypeId, bound: TypeId) -> Result<(), TypeError> {
        self.with_undet(undet, |u| {
            let mut bounds = u.lo_bounds.borrow_mut();
            if !bounds.contains(&bound) {
                bounds.push(bound);
            }
        })
    }

    pub fn add_upper_bound(&self, undet: TypeId, bound: TypeId) -> Result<(), TypeError> {
        self.with_undet(undet, |u| {
            let mut bounds = u.hi_bounds.borrow_mut();
            if !bounds.contains(&bound) {
                bounds.push(bound);
            }
        })
    }

    /// Resolve an inference placeholder. Written once.
    pub fn set_instantiation(&self, undet: TypeId, inst: TypeId) -> Result<(), TypeError> {
        let data = self.data(undet);
        let TypeKind::UndetVar(u) = &data.kind else {
            return Err(TypeError::UnexpectedVariant {
                expected: "inference variable",
                found: self.display(undet).to_string(),
            });
        };
        match u.inst.get() {
            Some(existing) if *existing == inst => Ok(()),
            Some(_) => Err(TypeError::AlreadySet {
                field: "instantiation",
                ty: self.display(undet).to_string(),
            }),
            None => {
                let _ = u.inst.set(inst);
                Ok(())
            }
        }
    }

    fn with_undet(
        &self,
        undet: TypeId,
        f: impl FnOnce(&crate::ty::UndetVar),
    ) -> Result<(), TypeError> {
        let data = self.data(undet);
        let TypeKind::UndetVar(u) = &data.kind else {
            return Err(TypeError::UnexpectedVariant {
                expected: "inference variable",
                found: self.display(undet).to_string(),
            });
        };
        f(u);
        Ok(())
    }

    // ---------------------------------------------------------------------------------------
    // Constants and base types
    // ---------------------------------------------------------------------------------------

    /// Strip a constant value or a resolved placeholder: the canonical type of a constant's
    /// symbol, the base of a resolved placeholder's instance, otherwise the type itself.
    pub fn base_type(&self, ty: TypeId) -> TypeId {
        let data = self.data(ty);
        if data.constant.is_some() {
            return data
                .symbol
                .and_then(|sym| self.symbol_type(sym))
                .unwrap_or(ty);
        }
        match &data.kind {
            TypeKind::UndetVar(undet) => match undet.inst.get() {
                Some(inst) => self.base_type(*inst),
                None => ty,
            },
            _ => ty,
        }
    }

    /// Base types of a list, returning the same list when nothing changed.
    pub fn base_types(&self, types: &TypeList) -> TypeList {
        let mapped: Vec<TypeId> = types.iter().map(|t| self.base_type(*t)).collect();
        if mapped.iter().zip(types.iter()).all(|(a, b)| a == b) {
            return types.clone();
        }
        Rc::from(mapped)
    }

    /// The constant as source text. `boolean` and `char` constants are decoded from their
    /// integer representation.
    pub fn string_value(&self, ty: TypeId) -> String {
        let data = self.data(ty);
        if matches!(data.kind, TypeKind::Bottom) {
            return "null".to_string();
        }
        let Some(value) = &data.constant else {
            invariant_violation(format_args!(
                "string value of non-constant type `{}`",
                self.display(ty)
            ));
        };
        match (data.tag(), value) {
            (TypeTag::Boolean, ConstValue::Int(0)) => "false".to_string(),
            (TypeTag::Boolean, ConstValue::Int(_)) => "true".to_string(),
            (TypeTag::Char, ConstValue::Int(v)) => match u32::try_from(*v)
                .ok()
                .and_then(char::from_u32)
            {
                Some(c) => String::from(c),
                // A lone surrogate has no `char`; keep the code unit as an escape.
                None => format!("\\u{:04X}", *v as u16),
            },
            _ => value.to_string(),
        }
    }

    pub fn is_true(&self, ty: TypeId) -> bool {
        let data = self.data(ty);
        data.tag() == TypeTag::Boolean
            && matches!(data.constant, Some(ConstValue::Int(v)) if v != 0)
    }

    pub fn is_false(&self, ty: TypeId) -> bool {
        let data = self.data(ty);
        data.tag() == TypeTag::Boolean && matches!(data.constant, Some(ConstValue::Int(0)))
    }

    // ---------------------------------------------------------------------------------------
    // Methods and polymorphic declarations
    // ---------------------------------------------------------------------------------------

    /// The method signature underneath `ty`. Panics for types that have none.
    pub fn as_method_type(&self, ty: TypeId) -> TypeId {
        match self.try_as_method_type(ty) {
            Some(method) => method,
            None => invariant_violation(format_args!(
                "`{}` is not a method type",
                self.display(ty)
            )),
        }
    }

    pub fn try_as_method_type(&self, ty: TypeId) -> Option<TypeId> {
        match &self.data(ty).kind {
            TypeKind::Method(_) => Some(ty),
            TypeKind::ForAll(forall) => self.try_as_method_type(forall.qtype),
            _ => None,
        }
    }

    /// Quantified type variables of a polymorphic declaration (none for a plain method).
    pub fn type_variables(&self, ty: TypeId) -> TypeList {
        match &self.data(ty).kind {
            TypeKind::ForAll(forall) => forall.tvars.clone(),
            _ => empty_types(),
        }
    }

    pub fn effect_variables(&self, ty: TypeId) -> EffectsList {
        match &self.data(ty).kind {
            TypeKind::ForAll(forall) => forall.evars.clone(),
            _ => empty_effects(),
        }
    }

    /// Load every class mentioned by this type.
    pub fn complete(&self, ty: TypeId) -> Result<(), CompletionError> {
        let data = self.data(ty);
        match &data.kind {
            TypeKind::Class(_) => match data.symbol {
                Some(sym) => self.complete_symbol(sym),
                None => Ok(()),
            },
            TypeKind::Array(array) => self.complete(array.elem),
            TypeKind::Method(method) => {
                for param in method.params.iter() {
                    self.complete(*param)?;
                }
                self.complete(method.restype)?;
                let thrown = method.thrown.borrow().clone();
                for ty in thrown.iter() {
                    self.complete(*ty)?;
                }
                Ok(())
            }
            TypeKind::ForAll(forall) => {
                for tvar in forall.tvars.iter() {
                    self.complete(self.type_var_bound(*tvar))?;
                }
                self.complete(forall.qtype)
            }
            _ => Ok(()),
        }
    }

    pub fn model_kind(&self, ty: TypeId) -> ModelKind {
        match &self.data(ty).kind {
            TypeKind::Primitive(p) => match p {
                crate::PrimitiveType::Byte => ModelKind::Byte,
                crate::PrimitiveType::Char => ModelKind::Char,
                crate::PrimitiveType::Short => ModelKind::Short,
                crate::PrimitiveType::Int => ModelKind::Int,
                crate::PrimitiveType::Long => ModelKind::Long,
                crate::PrimitiveType::Float => ModelKind::Float,
                crate::PrimitiveType::Double => ModelKind::Double,
                crate::PrimitiveType::Boolean => ModelKind::Boolean,
            },
            TypeKind::Void => ModelKind::Void,
            TypeKind::None => ModelKind::None,
            TypeKind::Bottom => ModelKind::Null,
            TypeKind::Package => ModelKind::Package,
            TypeKind::Class(_) => ModelKind::Declared,
            TypeKind::Error(_) => ModelKind::Error,
            TypeKind::Array(_) => ModelKind::Array,
            TypeKind::Method(_) | TypeKind::ForAll(_) => ModelKind::Executable,
            TypeKind::TypeVar(_) | TypeKind::Captured(_) => ModelKind::TypeVar,
            TypeKind::Wildcard(_) => ModelKind::Wildcard,
            TypeKind::UndetVar(_) => ModelKind::Other,
        }
    }
}

fn type_var_rpl_args(var: &TypeVar) -> RplList {
    if var.rpl_args.is_empty() && !var.rpl_params.is_empty() {
        return var.rpl_params.clone();
    }
    var.rpl_args.clone()
}
