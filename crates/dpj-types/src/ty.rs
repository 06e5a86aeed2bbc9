use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;

use dpj_regions::Rpl;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{EffectsList, RplList, SymbolId, TypeId, TypeList};

/// Discriminant of a type. Declaration order matters: everything before `Void` is primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TypeTag {
    Byte = 1,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Void,
    Class,
    Array,
    Method,
    Package,
    TypeVar,
    Wildcard,
    ForAll,
    Bot,
    None,
    Error,
    UndetVar,
}

impl TypeTag {
    pub fn is_primitive(self) -> bool {
        self < TypeTag::Void
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Byte,
        PrimitiveType::Char,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Boolean,
    ];

    pub fn tag(self) -> TypeTag {
        match self {
            PrimitiveType::Byte => TypeTag::Byte,
            PrimitiveType::Char => TypeTag::Char,
            PrimitiveType::Short => TypeTag::Short,
            PrimitiveType::Int => TypeTag::Int,
            PrimitiveType::Long => TypeTag::Long,
            PrimitiveType::Float => TypeTag::Float,
            PrimitiveType::Double => TypeTag::Double,
            PrimitiveType::Boolean => TypeTag::Boolean,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Boolean => "boolean",
        }
    }
}

/// Literal attached to a constant type.
///
/// `boolean`, `char`, `byte`, `short` and `int` constants are all carried as `Int`.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(SmolStr),
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Long(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write_java_float(f, *v, f64::from(*v)),
            ConstValue::Double(v) => write_java_float(f, *v, *v),
            ConstValue::Str(v) => f.write_str(v),
        }
    }
}

/// Java's `Float.toString`/`Double.toString`: plain decimal in `[1e-3, 1e7)`, otherwise
/// `d.dddEn`; the fraction always has at least one digit.
fn write_java_float<T>(f: &mut fmt::Formatter<'_>, value: T, wide: f64) -> fmt::Result
where
    T: fmt::Display + fmt::LowerExp,
{
    if wide.is_nan() {
        return f.write_str("NaN");
    }
    if wide.is_infinite() {
        return f.write_str(if wide < 0.0 { "-Infinity" } else { "Infinity" });
    }

    let magnitude = wide.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let plain = value.to_string();
        f.write_str(&plain)?;
        if !plain.contains('.') {
            f.write_str(".0")?;
        }
        return Ok(());
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    f.write_str(mantissa)?;
    if !mantissa.contains('.') {
        f.write_str(".0")?;
    }
    write!(f, "E{exponent}")
}

/// Kinds reported to the language-model view of types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Void,
    Null,
    None,
    Declared,
    Error,
    Array,
    Executable,
    Package,
    TypeVar,
    Wildcard,
    Other,
}

/// A type allocated in a [`crate::TypeStore`].
#[derive(Debug)]
pub struct TypeData {
    pub(crate) symbol: Option<SymbolId>,
    /// Region/effect information was stripped for interoperation with plain Java.
    pub(crate) erased: bool,
    pub(crate) constant: Option<ConstValue>,
    pub(crate) kind: TypeKind,
}

impl TypeData {
    pub(crate) fn new(symbol: Option<SymbolId>, kind: TypeKind) -> Self {
        Self {
            symbol,
            erased: false,
            constant: None,
            kind,
        }
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn symbol(&self) -> Option<SymbolId> {
        self.symbol
    }

    pub fn is_erased(&self) -> bool {
        self.erased
    }

    pub fn constant(&self) -> Option<&ConstValue> {
        self.constant.as_ref()
    }

    pub fn tag(&self) -> TypeTag {
        match &self.kind {
            TypeKind::Primitive(p) => p.tag(),
            TypeKind::Void => TypeTag::Void,
            TypeKind::None => TypeTag::None,
            TypeKind::Bottom => TypeTag::Bot,
            TypeKind::Package => TypeTag::Package,
            TypeKind::Class(_) => TypeTag::Class,
            TypeKind::Error(_) => TypeTag::Error,
            TypeKind::Array(_) => TypeTag::Array,
            TypeKind::Method(_) => TypeTag::Method,
            TypeKind::ForAll(_) => TypeTag::ForAll,
            TypeKind::TypeVar(_) | TypeKind::Captured(_) => TypeTag::TypeVar,
            TypeKind::Wildcard(_) => TypeTag::Wildcard,
            TypeKind::UndetVar(_) => TypeTag::UndetVar,
        }
    }
}

#[derive(Debug)]
pub enum TypeKind {
    Primitive(PrimitiveType),
    Void,
    /// The missing type.
    None,
    /// The type of `null`.
    Bottom,
    Package,
    Class(ClassType),
    /// Absorbing sentinel for erroneous types. Shares the class-type layout.
    Error(ClassType),
    Array(ArrayType),
    Method(MethodType),
    ForAll(ForAll),
    TypeVar(TypeVar),
    Captured(CapturedType),
    Wildcard(WildcardType),
    UndetVar(UndetVar),
}

/// A class or interface type.
///
/// The argument lists and the supertype/interfaces are write-once: either supplied at
/// construction (use sites) or filled in by the symbol's completer (canonical types). The
/// `all_*` caches and the resolved region arguments are computed on first read; the enclosing
/// chain must be completed before that first read.
#[derive(Debug)]
pub struct ClassType {
    pub(crate) outer: TypeId,
    pub(crate) type_args: OnceCell<TypeList>,
    pub(crate) rpl_args: OnceCell<RplList>,
    pub(crate) effect_args: OnceCell<EffectsList>,
    pub(crate) supertype: OnceCell<TypeId>,
    pub(crate) interfaces: OnceCell<TypeList>,
    pub(crate) cell_type: Cell<Option<TypeId>>,
    pub(crate) resolved_rpl_args: OnceCell<RplList>,
    pub(crate) all_type_params: OnceCell<TypeList>,
    pub(crate) all_rpl_params: OnceCell<RplList>,
    pub(crate) all_effect_params: OnceCell<EffectsList>,
}

impl ClassType {
    pub(crate) fn new(
        outer: TypeId,
        type_args: Option<TypeList>,
        rpl_args: Option<RplList>,
        effect_args: Option<EffectsList>,
        cell_type: Option<TypeId>,
    ) -> Self {
        Self {
            outer,
            type_args: type_args.map(OnceCell::from).unwrap_or_default(),
            rpl_args: rpl_args.map(OnceCell::from).unwrap_or_default(),
            effect_args: effect_args.map(OnceCell::from).unwrap_or_default(),
            supertype: OnceCell::new(),
            interfaces: OnceCell::new(),
            cell_type: Cell::new(cell_type),
            resolved_rpl_args: OnceCell::new(),
            all_type_params: OnceCell::new(),
            all_rpl_params: OnceCell::new(),
            all_effect_params: OnceCell::new(),
        }
    }

    pub fn outer(&self) -> TypeId {
        self.outer
    }

    /// Supertype as recorded by completion, without triggering it.
    pub fn supertype(&self) -> Option<TypeId> {
        self.supertype.get().copied()
    }

    pub fn interfaces(&self) -> Option<TypeList> {
        self.interfaces.get().cloned()
    }

    pub fn cell_type(&self) -> Option<TypeId> {
        self.cell_type.get()
    }
}

#[derive(Debug)]
pub struct ArrayType {
    pub(crate) elem: TypeId,
    pub(crate) rpl: Rpl,
    /// Symbolic index variable used to express per-element effects (`T[]#i`).
    pub(crate) index_var: Option<SymbolId>,
}

impl ArrayType {
    pub fn elem(&self) -> TypeId {
        self.elem
    }

    pub fn rpl(&self) -> &Rpl {
        &self.rpl
    }

    pub fn index_var(&self) -> Option<SymbolId> {
        self.index_var
    }
}

/// Type, region and effect actuals recorded when a polymorphic method is applied at a call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallSiteActuals {
    pub type_actuals: Vec<TypeId>,
    pub region_actuals: Vec<Rpl>,
    pub effect_actuals: Vec<dpj_regions::Effects>,
}

#[derive(Debug)]
pub struct MethodType {
    pub(crate) params: TypeList,
    pub(crate) restype: TypeId,
    pub(crate) thrown: RefCell<TypeList>,
    pub(crate) call_site: OnceCell<CallSiteActuals>,
}

impl MethodType {
    pub fn params(&self) -> TypeList {
        self.params.clone()
    }

    pub fn restype(&self) -> TypeId {
        self.restype
    }

    pub fn thrown(&self) -> TypeList {
        self.thrown.borrow().clone()
    }

    pub fn call_site_actuals(&self) -> Option<&CallSiteActuals> {
        self.call_site.get()
    }
}

/// A declaration universally quantified over type, region and effect variables.
#[derive(Debug)]
pub struct ForAll {
    pub(crate) tvars: TypeList,
    pub(crate) rvars: RplList,
    pub(crate) evars: EffectsList,
    pub(crate) qtype: TypeId,
}

impl ForAll {
    pub fn tvars(&self) -> TypeList {
        self.tvars.clone()
    }

    pub fn rvars(&self) -> RplList {
        self.rvars.clone()
    }

    pub fn evars(&self) -> EffectsList {
        self.evars.clone()
    }

    pub fn qtype(&self) -> TypeId {
        self.qtype
    }
}

#[derive(Debug)]
pub struct TypeVar {
    /// Set once, by the declaration's completer. A prototype copy leaves this empty and reads
    /// through to `prototype`.
    pub(crate) bound: OnceCell<TypeId>,
    pub(crate) lower: TypeId,
    pub(crate) rpl_params: RplList,
    pub(crate) rpl_args: RplList,
    pub(crate) prototype: Option<TypeId>,
}

impl TypeVar {
    pub fn lower(&self) -> TypeId {
        self.lower
    }

    pub fn prototype(&self) -> Option<TypeId> {
        self.prototype
    }

    pub fn rpl_params(&self) -> RplList {
        self.rpl_params.clone()
    }
}

/// A fresh type variable standing for a captured wildcard.
#[derive(Debug)]
pub struct CapturedType {
    pub(crate) var: TypeVar,
    pub(crate) wildcard: TypeId,
}

impl CapturedType {
    pub fn var(&self) -> &TypeVar {
        &self.var
    }

    pub fn wildcard(&self) -> TypeId {
        self.wildcard
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundKind {
    Extends,
    Super,
    Unbound,
}

impl fmt::Display for BoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoundKind::Extends => "? extends ",
            BoundKind::Super => "? super ",
            BoundKind::Unbound => "?",
        })
    }
}

#[derive(Debug)]
pub struct WildcardType {
    pub(crate) ty: TypeId,
    pub(crate) kind: BoundKind,
    /// The formal type variable this wildcard is an argument for.
    pub(crate) formal: Cell<Option<TypeId>>,
}

impl WildcardType {
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    pub fn bound_kind(&self) -> BoundKind {
        self.kind
    }

    pub fn formal(&self) -> Option<TypeId> {
        self.formal.get()
    }
}

/// Inference placeholder.
///
/// The bound sets only grow; `inst` is written once, by the inference engine.
#[derive(Debug)]
pub struct UndetVar {
    pub(crate) origin: TypeId,
    pub(crate) lo_bounds: RefCell<Vec<TypeId>>,
    pub(crate) hi_bounds: RefCell<Vec<TypeId>>,
    pub(crate) inst: OnceCell<TypeId>,
}

impl UndetVar {
    pub fn origin(&self) -> TypeId {
        self.origin
    }

    pub fn lo_bounds(&self) -> Vec<TypeId> {
        self.lo_bounds.borrow().clone()
    }

    pub fn hi_bounds(&self) -> Vec<TypeId> {
        self.hi_bounds.borrow().clone()
    }

    pub fn inst(&self) -> Option<TypeId> {
        self.inst.get().copied()
    }
}
