use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use dpj_regions::{Effects, Rpl};
use smol_str::SmolStr;

use crate::error::invariant_violation;
use crate::ty::{
    ArrayType, BoundKind, CallSiteActuals, CapturedType, ClassType, ConstValue, ForAll,
    MethodType, PrimitiveType, TypeData, TypeKind, TypeVar, UndetVar, WildcardType,
};
use crate::{
    empty_types, DisplayOptions, Symbol, SymbolFlags, SymbolId, SymbolKind, TypeError, TypeId,
    TypeList,
};

/// Types every store starts out with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub byte: TypeId,
    pub char: TypeId,
    pub short: TypeId,
    pub int: TypeId,
    pub long: TypeId,
    pub float: TypeId,
    pub double: TypeId,
    pub boolean: TypeId,
    pub void: TypeId,
    /// The type of `null`.
    pub bot: TypeId,
    /// The missing type; enclosing type of every top-level class.
    pub none: TypeId,
    /// The shared error type, bound to the `<any>` symbol.
    pub error: TypeId,
}

impl WellKnownTypes {
    pub fn primitive(&self, prim: PrimitiveType) -> TypeId {
        match prim {
            PrimitiveType::Byte => self.byte,
            PrimitiveType::Char => self.char,
            PrimitiveType::Short => self.short,
            PrimitiveType::Int => self.int,
            PrimitiveType::Long => self.long,
            PrimitiveType::Float => self.float,
            PrimitiveType::Double => self.double,
            PrimitiveType::Boolean => self.boolean,
        }
    }
}

/// Owner of every type and symbol of one compilation.
///
/// The store is append-only and allocates through `&self`, so completers and mappings can
/// create types while other queries are in flight. It is not `Sync`: a type graph stays on the
/// thread that built it.
pub struct TypeStore {
    types: RefCell<Vec<Rc<TypeData>>>,
    symbols: RefCell<Vec<Rc<Symbol>>>,
    well_known: OnceCell<WellKnownTypes>,
    options: Cell<DisplayOptions>,
    pub(crate) completions_in_flight: Cell<u32>,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeStore")
            .field("types", &self.types.borrow().len())
            .field("symbols", &self.symbols.borrow().len())
            .field("options", &self.options.get())
            .finish()
    }
}

/// Class type as written at a use site.
#[derive(Clone, Debug, Default)]
pub struct ClassTypeInit {
    /// Enclosing instance type; `None` means the missing type.
    pub outer: Option<TypeId>,
    pub type_args: Vec<TypeId>,
    pub rpl_args: Vec<Rpl>,
    pub effect_args: Vec<Effects>,
    pub cell_type: Option<TypeId>,
    pub erased: bool,
}

/// What a completer knows about a class declaration.
#[derive(Clone, Debug, Default)]
pub struct ClassSignature {
    pub type_params: Vec<TypeId>,
    pub region_params: Vec<Rpl>,
    pub effect_params: Vec<Effects>,
    pub supertype: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
}

#[derive(Clone, Debug)]
pub struct TypeVarInit {
    pub symbol: SymbolId,
    pub bound: Option<TypeId>,
    pub lower: TypeId,
    pub rpl_params: Vec<Rpl>,
    pub rpl_args: Vec<Rpl>,
    pub prototype: Option<TypeId>,
}

impl TypeStore {
    pub fn new() -> Self {
        Self::with_options(DisplayOptions::default())
    }

    pub fn with_options(options: DisplayOptions) -> Self {
        let store = Self {
            types: RefCell::new(Vec::new()),
            symbols: RefCell::new(Vec::new()),
            well_known: OnceCell::new(),
            options: Cell::new(options),
            completions_in_flight: Cell::new(0),
        };
        let well_known = store.init_well_known();
        let _ = store.well_known.set(well_known);
        store
    }

    fn init_well_known(&self) -> WellKnownTypes {
        let prim = |p: PrimitiveType| {
            let sym = self.new_symbol(SymbolKind::Type, p.name(), None, SymbolFlags::PUBLIC);
            let ty = self.alloc(TypeData::new(Some(sym), TypeKind::Primitive(p)));
            self.symbol(sym).ty.set(Some(ty));
            ty
        };
        let byte = prim(PrimitiveType::Byte);
        let char = prim(PrimitiveType::Char);
        let short = prim(PrimitiveType::Short);
        let int = prim(PrimitiveType::Int);
        let long = prim(PrimitiveType::Long);
        let float = prim(PrimitiveType::Float);
        let double = prim(PrimitiveType::Double);
        let boolean = prim(PrimitiveType::Boolean);

        let void_sym = self.new_symbol(SymbolKind::Type, "void", None, SymbolFlags::PUBLIC);
        let void = self.alloc(TypeData::new(Some(void_sym), TypeKind::Void));
        self.symbol(void_sym).ty.set(Some(void));

        let bot_sym = self.new_symbol(SymbolKind::Type, "<nulltype>", None, SymbolFlags::PUBLIC);
        let bot = self.alloc(TypeData::new(Some(bot_sym), TypeKind::Bottom));
        self.symbol(bot_sym).ty.set(Some(bot));

        let none = self.alloc(TypeData::new(None, TypeKind::None));

        let any = self.new_symbol(
            SymbolKind::Type,
            "<any>",
            None,
            SymbolFlags::PUBLIC | SymbolFlags::STATIC | SymbolFlags::ACYCLIC,
        );
        let error = self.alloc_error(Some(any), none);
        self.attach_error_type(any, error);

        WellKnownTypes {
            byte,
            char,
            short,
            int,
            long,
            float,
            double,
            boolean,
            void,
            bot,
            none,
            error,
        }
    }

    pub fn well_known(&self) -> &WellKnownTypes {
        match self.well_known.get() {
            Some(wk) => wk,
            None => invariant_violation("well-known types used during store construction"),
        }
    }

    pub fn display_options(&self) -> DisplayOptions {
        self.options.get()
    }

    pub fn set_display_options(&self, options: DisplayOptions) {
        self.options.set(options);
    }

    pub fn type_count(&self) -> usize {
        self.types.borrow().len()
    }

    pub(crate) fn alloc(&self, data: TypeData) -> TypeId {
        let mut types = self.types.borrow_mut();
        let idx: u32 = types
            .len()
            .try_into()
            .unwrap_or_else(|_| invariant_violation("type arena exhausted"));
        types.push(Rc::new(data));
        TypeId(idx)
    }

    pub(crate) fn alloc_symbol(&self, symbol: Symbol) -> SymbolId {
        let mut symbols = self.symbols.borrow_mut();
        let idx: u32 = symbols
            .len()
            .try_into()
            .unwrap_or_else(|_| invariant_violation("symbol arena exhausted"));
        symbols.push(Rc::new(symbol));
        SymbolId(idx)
    }

    /// The data behind `ty`. The returned handle keeps no borrow on the store.
    pub fn data(&self, ty: TypeId) -> Rc<TypeData> {
        match self.types.borrow().get(ty.0 as usize) {
            Some(data) => data.clone(),
            None => invariant_violation(format_args!("{ty:?} does not belong to this store")),
        }
    }

    pub fn symbol(&self, symbol: SymbolId) -> Rc<Symbol> {
        match self.symbols.borrow().get(symbol.0 as usize) {
            Some(sym) => sym.clone(),
            None => invariant_violation(format_args!("{symbol:?} does not belong to this store")),
        }
    }

    /// The canonical type of `symbol`, as declared.
    pub fn symbol_type(&self, symbol: SymbolId) -> Option<TypeId> {
        self.symbol(symbol).ty()
    }

    pub fn symbol_name(&self, symbol: SymbolId) -> SmolStr {
        self.symbol(symbol).name.clone()
    }

    // ---------------------------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------------------------

    /// Declare a class symbol together with its canonical type.
    ///
    /// The canonical type's parameter lists, supertype and interfaces stay unset until a
    /// completer (or [`TypeStore::define_class_signature`]) provides them.
    pub fn declare_class(
        &self,
        name: impl Into<SmolStr>,
        owner: Option<SymbolId>,
        flags: SymbolFlags,
        outer: Option<TypeId>,
    ) -> SymbolId {
        let sym = self.new_symbol(SymbolKind::Type, name, owner, flags);
        let outer = outer.unwrap_or(self.well_known().none);
        let ty = self.alloc(TypeData::new(
            Some(sym),
            TypeKind::Class(ClassType::new(outer, None, None, None, None)),
        ));
        self.symbol(sym).ty.set(Some(ty));
        sym
    }

    /// Fill in the declared signature of a canonical class type.
    pub fn define_class_signature(
        &self,
        ty: TypeId,
        signature: ClassSignature,
    ) -> Result<(), TypeError> {
        let data = self.data(ty);
        let TypeKind::Class(class) = &data.kind else {
            return Err(TypeError::UnexpectedVariant {
                expected: "class type",
                found: self.display(ty).to_string(),
            });
        };
        let already_set = |field: &'static str| TypeError::AlreadySet {
            field,
            ty: self.display(ty).to_string(),
        };
        if class.type_args.get().is_some() {
            return Err(already_set("type parameters"));
        }
        if class.rpl_args.get().is_some() {
            return Err(already_set("region parameters"));
        }
        if class.effect_args.get().is_some() {
            return Err(already_set("effect parameters"));
        }
        if class.supertype.get().is_some() || class.interfaces.get().is_some() {
            return Err(already_set("supertypes"));
        }
        let _ = class.type_args.set(Rc::from(signature.type_params));
        let _ = class.rpl_args.set(Rc::from(signature.region_params));
        let _ = class.effect_args.set(Rc::from(signature.effect_params));
        if let Some(supertype) = signature.supertype {
            let _ = class.supertype.set(supertype);
        }
        let _ = class.interfaces.set(Rc::from(signature.interfaces));
        Ok(())
    }

    /// A class type as written at a use site, e.g. `C<String, R>`.
    pub fn class_type(&self, symbol: SymbolId, init: ClassTypeInit) -> TypeId {
        let outer = init.outer.unwrap_or(self.well_known().none);
        let class = ClassType::new(
            outer,
            Some(Rc::from(init.type_args)),
            Some(Rc::from(init.rpl_args)),
            Some(Rc::from(init.effect_args)),
            init.cell_type,
        );
        let mut data = TypeData::new(Some(symbol), TypeKind::Class(class));
        data.erased = init.erased;
        self.alloc(data)
    }

    pub fn set_cell_type(&self, ty: TypeId, cell_type: Option<TypeId>) {
        if let TypeKind::Class(class) = &self.data(ty).kind {
            class.cell_type.set(cell_type);
        }
    }

    pub fn cell_type(&self, ty: TypeId) -> Option<TypeId> {
        match &self.data(ty).kind {
            TypeKind::Class(class) => class.cell_type.get(),
            _ => None,
        }
    }

    pub fn array_type(
        &self,
        elem: TypeId,
        rpl: Option<Rpl>,
        index_var: Option<SymbolId>,
    ) -> TypeId {
        self.alloc(TypeData::new(
            None,
            TypeKind::Array(ArrayType {
                elem,
                rpl: rpl.unwrap_or_default(),
                index_var,
            }),
        ))
    }

    pub fn method_type(&self, params: Vec<TypeId>, restype: TypeId, thrown: Vec<TypeId>) -> TypeId {
        self.alloc_method(Rc::from(params), restype, Rc::from(thrown), None)
    }

    pub(crate) fn alloc_method(
        &self,
        params: TypeList,
        restype: TypeId,
        thrown: TypeList,
        call_site: Option<CallSiteActuals>,
    ) -> TypeId {
        self.alloc(TypeData::new(
            None,
            TypeKind::Method(MethodType {
                params,
                restype,
                thrown: RefCell::new(thrown),
                call_site: call_site.map(OnceCell::from).unwrap_or_default(),
            }),
        ))
    }

    /// Record the actuals a polymorphic method was applied to at one call site. Written once.
    pub fn record_call_site_actuals(
        &self,
        method: TypeId,
        actuals: CallSiteActuals,
    ) -> Result<(), TypeError> {
        let data = self.data(method);
        let method_type = match &data.kind {
            TypeKind::Method(m) => m,
            TypeKind::ForAll(f) => return self.record_call_site_actuals(f.qtype, actuals),
            _ => {
                return Err(TypeError::UnexpectedVariant {
                    expected: "method type",
                    found: self.display(method).to_string(),
                })
            }
        };
        method_type
            .call_site
            .set(actuals)
            .map_err(|_| TypeError::AlreadySet {
                field: "call-site actuals",
                ty: self.display(method).to_string(),
            })
    }

    pub fn call_site_actuals(&self, method: TypeId) -> CallSiteActuals {
        match &self.data(method).kind {
            TypeKind::Method(m) => m.call_site.get().cloned().unwrap_or_default(),
            TypeKind::ForAll(f) => self.call_site_actuals(f.qtype),
            _ => CallSiteActuals::default(),
        }
    }

    pub fn for_all(
        &self,
        tvars: Vec<TypeId>,
        rvars: Vec<Rpl>,
        evars: Vec<Effects>,
        qtype: TypeId,
    ) -> TypeId {
        let symbol = self.data(qtype).symbol;
        self.alloc(TypeData::new(
            symbol,
            TypeKind::ForAll(ForAll {
                tvars: Rc::from(tvars),
                rvars: Rc::from(rvars),
                evars: Rc::from(evars),
                qtype,
            }),
        ))
    }

    /// A fresh type variable declared as `name` in `owner`. Its bound is set later.
    pub fn new_type_var(
        &self,
        name: impl Into<SmolStr>,
        owner: Option<SymbolId>,
        lower: TypeId,
    ) -> TypeId {
        let symbol = self.new_symbol(SymbolKind::Type, name, owner, SymbolFlags::empty());
        let ty = self.type_var(TypeVarInit {
            symbol,
            bound: None,
            lower,
            rpl_params: Vec::new(),
            rpl_args: Vec::new(),
            prototype: None,
        });
        self.symbol(symbol).ty.set(Some(ty));
        ty
    }

    pub fn type_var(&self, init: TypeVarInit) -> TypeId {
        let bound = OnceCell::new();
        if let Some(b) = init.bound {
            let _ = bound.set(b);
        }
        self.alloc(TypeData::new(
            Some(init.symbol),
            TypeKind::TypeVar(TypeVar {
                bound,
                lower: init.lower,
                rpl_params: Rc::from(init.rpl_params),
                rpl_args: Rc::from(init.rpl_args),
                prototype: init.prototype,
            }),
        ))
    }

    /// A new occurrence of a declared type variable carrying region arguments.
    ///
    /// The copy has no bound of its own; it reads and writes the declaration's bound.
    pub fn copy_type_var(&self, declared: TypeId, rpl_args: Vec<Rpl>) -> TypeId {
        let data = self.data(declared);
        let var = match &data.kind {
            TypeKind::TypeVar(var) => var,
            _ => invariant_violation(format_args!(
                "copy_type_var on non-type-variable `{}`",
                self.display(declared)
            )),
        };
        self.type_var(TypeVarInit {
            symbol: data
                .symbol
                .unwrap_or_else(|| invariant_violation("type variable without symbol")),
            bound: None,
            lower: var.lower,
            rpl_params: var.rpl_params.to_vec(),
            rpl_args,
            prototype: Some(var.prototype.unwrap_or(declared)),
        })
    }

    pub fn captured_type(
        &self,
        name: impl Into<SmolStr>,
        owner: Option<SymbolId>,
        upper: TypeId,
        lower: TypeId,
        wildcard: TypeId,
    ) -> TypeId {
        let symbol = self.new_symbol(SymbolKind::Type, name, owner, SymbolFlags::empty());
        let bound = OnceCell::new();
        let _ = bound.set(upper);
        let ty = self.alloc(TypeData::new(
            Some(symbol),
            TypeKind::Captured(CapturedType {
                var: TypeVar {
                    bound,
                    lower,
                    rpl_params: Rc::from(Vec::new()),
                    rpl_args: Rc::from(Vec::new()),
                    prototype: None,
                },
                wildcard,
            }),
        ));
        self.symbol(symbol).ty.set(Some(ty));
        ty
    }

    pub fn wildcard(&self, ty: TypeId, kind: BoundKind, formal: Option<TypeId>) -> TypeId {
        self.alloc(TypeData::new(
            None,
            TypeKind::Wildcard(WildcardType {
                ty,
                kind,
                formal: Cell::new(formal),
            }),
        ))
    }

    pub fn undet_var(&self, origin: TypeId) -> TypeId {
        let symbol = self.data(origin).symbol;
        self.alloc(TypeData::new(
            symbol,
            TypeKind::UndetVar(UndetVar {
                origin,
                lo_bounds: RefCell::new(Vec::new()),
                hi_bounds: RefCell::new(Vec::new()),
                inst: OnceCell::new(),
            }),
        ))
    }

    pub fn declare_package(&self, name: impl Into<SmolStr>, owner: Option<SymbolId>) -> SymbolId {
        let sym = self.new_symbol(SymbolKind::Package, name, owner, SymbolFlags::empty());
        let ty = self.alloc(TypeData::new(Some(sym), TypeKind::Package));
        self.symbol(sym).ty.set(Some(ty));
        sym
    }

    /// A standalone error type with no symbol.
    pub fn error_type(&self) -> TypeId {
        self.alloc_error(None, self.well_known().none)
    }

    /// Turn `class` into a damaged symbol whose type is a fresh error type.
    ///
    /// The symbol's member scope is replaced by the always-empty error scope.
    pub fn error_type_for_class(&self, class: SymbolId) -> TypeId {
        let ty = self.alloc_error(Some(class), self.well_known().none);
        self.attach_error_type(class, ty);
        ty
    }

    /// An error type for an unresolvable name, with a fresh synthetic symbol in `container`.
    pub fn error_type_named(
        &self,
        name: impl Into<SmolStr>,
        container: Option<SymbolId>,
    ) -> TypeId {
        let sym = self.new_symbol(
            SymbolKind::Type,
            name,
            container,
            SymbolFlags::PUBLIC | SymbolFlags::STATIC | SymbolFlags::ACYCLIC,
        );
        self.error_type_for_class(sym)
    }

    fn alloc_error(&self, symbol: Option<SymbolId>, none: TypeId) -> TypeId {
        let empty = empty_types();
        self.alloc(TypeData::new(
            symbol,
            TypeKind::Error(ClassType::new(
                none,
                Some(empty),
                Some(Rc::from(Vec::new())),
                Some(Rc::from(Vec::new())),
                None,
            )),
        ))
    }

    fn attach_error_type(&self, class: SymbolId, ty: TypeId) {
        let sym = self.symbol(class);
        sym.ty.set(Some(ty));
        sym.kind.set(SymbolKind::Error);
        *sym.members.borrow_mut() = crate::Scope::Error;
        sym.completer.borrow_mut().take();
    }

    /// The same type carrying a literal value (`int` constant `3`, a `String` literal).
    ///
    /// Only primitive and class types can carry constants; the null type and the error type
    /// return themselves.
    pub fn const_type(&self, ty: TypeId, value: ConstValue) -> TypeId {
        let data = self.data(ty);
        let kind = match &data.kind {
            TypeKind::Primitive(p) => TypeKind::Primitive(*p),
            TypeKind::Class(class) => {
                let type_args = self.type_arguments(ty);
                TypeKind::Class(ClassType::new(
                    class.outer,
                    Some(type_args),
                    class.rpl_args.get().cloned(),
                    class.effect_args.get().cloned(),
                    class.cell_type.get(),
                ))
            }
            TypeKind::Bottom | TypeKind::Error(_) => return ty,
            _ => invariant_violation(format_args!(
                "constant type requested for `{}`",
                self.display(ty)
            )),
        };
        self.alloc(TypeData {
            symbol: data.symbol,
            erased: data.erased,
            constant: Some(value),
            kind,
        })
    }
}
