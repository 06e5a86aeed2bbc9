//! Type representation for a Java dialect with region and effect parameters.
//!
//! Every type lives in a [`TypeStore`] and is named by a [`TypeId`] handle. Besides ordinary
//! generics (type arguments, wildcards, capture, raw types), class types carry region
//! arguments ([`dpj_regions::Rpl`]) and effect arguments ([`dpj_regions::Effects`]), and
//! polymorphic methods quantify over all three.
//!
//! Queries that depend on a class declaration (type arguments, supertypes, flags) complete the
//! class's [`Symbol`] on first use through its [`Completer`]. Structural substitution goes
//! through [`TypeStore::map`], which returns the very same handle when nothing changed.

#![forbid(unsafe_code)]

mod display;
mod equality;
mod error;
mod ids;
mod mapping;
mod query;
mod store;
mod symbol;
mod ty;
mod visitor;

pub use display::{DisplayOptions, TypeDisplay};
pub use equality::TypeKey;
pub use error::{CompletionError, TypeError};
pub use ids::{EffectsList, RplList, SymbolId, TypeId, TypeList};
pub use mapping::{mapping, FnMapping, Mapping, Subst};
pub use store::{ClassSignature, ClassTypeInit, TypeStore, TypeVarInit, WellKnownTypes};
pub use symbol::{Completer, Scope, Symbol, SymbolFlags, SymbolKind};
pub use ty::{
    ArrayType, BoundKind, CallSiteActuals, CapturedType, ClassType, ConstValue, ForAll,
    MethodType, ModelKind, PrimitiveType, TypeData, TypeKind, TypeTag, TypeVar, UndetVar,
    WildcardType,
};
pub use visitor::TypeVisitor;

pub(crate) use ids::{empty_effects, empty_rpls, empty_types};
