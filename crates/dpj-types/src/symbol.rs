use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use smol_str::SmolStr;

use crate::{CompletionError, SymbolId, TypeId, TypeStore};

bitflags! {
    /// Declaration modifiers and compiler-internal markers carried by a symbol.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SymbolFlags: u64 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const INTERFACE = 1 << 9;
        const ABSTRACT = 1 << 10;
        /// Synthetic class standing for an intersection of bounds.
        const COMPOUND = 1 << 24;
        /// Supertype graph already checked for cycles.
        const ACYCLIC = 1 << 27;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Package,
    Type,
    Var,
    Method,
    /// A class whose declaration could not be loaded.
    Error,
}

/// Loads a symbol's declaration on first demand.
///
/// A completer typically fills in the supertype, interfaces and formal parameter lists of the
/// symbol's canonical type through [`TypeStore::define_class_signature`]. Completion may block
/// (it can read class files or source); there is no timeout.
pub trait Completer {
    fn complete(&self, store: &TypeStore, symbol: SymbolId) -> Result<(), CompletionError>;
}

impl<F> Completer for F
where
    F: Fn(&TypeStore, SymbolId) -> Result<(), CompletionError>,
{
    fn complete(&self, store: &TypeStore, symbol: SymbolId) -> Result<(), CompletionError> {
        self(store, symbol)
    }
}

/// The member scope of a class symbol.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Scope {
    #[default]
    Empty,
    Members(Vec<SymbolId>),
    /// Stand-in for the members of a class that failed to load: always empty.
    Error,
}

impl Scope {
    pub fn enter(&mut self, symbol: SymbolId) {
        match self {
            Scope::Empty => *self = Scope::Members(vec![symbol]),
            Scope::Members(members) => members.push(symbol),
            Scope::Error => {}
        }
    }

    pub fn members(&self) -> &[SymbolId] {
        match self {
            Scope::Members(members) => members,
            Scope::Empty | Scope::Error => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Scope::Error)
    }
}

/// A declaration. Types refer to their symbol by [`SymbolId`]; a class symbol refers back to
/// its canonical type by [`TypeId`].
pub struct Symbol {
    pub(crate) name: SmolStr,
    pub(crate) owner: Option<SymbolId>,
    pub(crate) kind: Cell<SymbolKind>,
    pub(crate) flags: Cell<SymbolFlags>,
    pub(crate) ty: Cell<Option<TypeId>>,
    pub(crate) completer: RefCell<Option<Rc<dyn Completer>>>,
    /// Set while the completer runs.
    pub(crate) completing: Cell<bool>,
    pub(crate) members: RefCell<Scope>,
}

impl Symbol {
    pub(crate) fn new(
        kind: SymbolKind,
        name: SmolStr,
        owner: Option<SymbolId>,
        flags: SymbolFlags,
    ) -> Self {
        Self {
            name,
            owner,
            kind: Cell::new(kind),
            flags: Cell::new(flags),
            ty: Cell::new(None),
            completer: RefCell::new(None),
            completing: Cell::new(false),
            members: RefCell::new(Scope::default()),
        }
    }

    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    pub fn owner(&self) -> Option<SymbolId> {
        self.owner
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind.get()
    }

    /// Flags as currently recorded, without triggering completion.
    pub fn raw_flags(&self) -> SymbolFlags {
        self.flags.get()
    }

    /// The canonical type of this symbol, if one has been attached.
    pub fn ty(&self) -> Option<TypeId> {
        self.ty.get()
    }

    pub fn has_completer(&self) -> bool {
        self.completer.borrow().is_some()
    }

    /// Whether this symbol's completer is running right now.
    pub fn is_completing(&self) -> bool {
        self.completing.get()
    }

    pub fn members(&self) -> Scope {
        self.members.borrow().clone()
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Symbol")
            .field("name", &self.name)
            .field("kind", &self.kind.get())
            .field("owner", &self.owner)
            .field("flags", &self.flags.get())
            .field("ty", &self.ty.get())
            .finish_non_exhaustive()
    }
}

impl TypeStore {
    pub fn new_symbol(
        &self,
        kind: SymbolKind,
        name: impl Into<SmolStr>,
        owner: Option<SymbolId>,
        flags: SymbolFlags,
    ) -> SymbolId {
        self.alloc_symbol(Symbol::new(kind, name.into(), owner, flags))
    }

    pub fn set_completer(&self, symbol: SymbolId, completer: impl Completer + 'static) {
        *self.symbol(symbol).completer.borrow_mut() = Some(Rc::new(completer));
    }

    /// Run the symbol's completer, if it still has one.
    ///
    /// The completer is detached before it runs, so queries it makes against the symbol do not
    /// recurse. Until it returns, those queries see empty lists and nothing they compute is
    /// cached, so the completer can still define the signature afterwards.
    pub fn complete_symbol(&self, symbol: SymbolId) -> Result<(), CompletionError> {
        let sym = self.symbol(symbol);
        let completer = sym.completer.borrow_mut().take();
        let Some(completer) = completer else {
            return Ok(());
        };
        tracing::debug!(target: "dpj.types", symbol = %sym.name, "completing symbol");
        sym.completing.set(true);
        self.completions_in_flight.set(self.completions_in_flight.get() + 1);
        let result = completer.complete(self, symbol);
        self.completions_in_flight.set(self.completions_in_flight.get() - 1);
        sym.completing.set(false);
        result
    }

    /// No completion is running, so derived results are final and may be cached.
    pub(crate) fn caches_settled(&self) -> bool {
        self.completions_in_flight.get() == 0
    }

    /// Completion triggered from inside an accessor: failures are logged and the accessor
    /// continues with whatever the symbol holds.
    pub(crate) fn complete_lazily(&self, symbol: Option<SymbolId>) {
        let Some(symbol) = symbol else {
            return;
        };
        if let Err(err) = self.complete_symbol(symbol) {
            tracing::warn!(
                target: "dpj.types",
                symbol = %err.symbol,
                error = %err.message,
                "symbol completion failed"
            );
        }
    }

    /// Flags after completing the symbol.
    pub fn symbol_flags(&self, symbol: SymbolId) -> SymbolFlags {
        self.complete_lazily(Some(symbol));
        self.symbol(symbol).raw_flags()
    }

    pub fn set_symbol_flags(&self, symbol: SymbolId, flags: SymbolFlags) {
        self.symbol(symbol).flags.set(flags);
    }

    pub fn enter_member(&self, class: SymbolId, member: SymbolId) {
        self.symbol(class).members.borrow_mut().enter(member);
    }

    /// Fully qualified name: owner's qualified name and simple name joined with `.`, for
    /// owners that are packages or types. Unnamed owners contribute nothing.
    pub fn qualified_name(&self, symbol: SymbolId) -> SmolStr {
        let sym = self.symbol(symbol);
        let Some(owner) = sym.owner else {
            return sym.name.clone();
        };
        let owner_sym = self.symbol(owner);
        let qualifying = matches!(owner_sym.kind(), SymbolKind::Package | SymbolKind::Type);
        if !qualifying || owner_sym.name.is_empty() {
            return sym.name.clone();
        }
        let prefix = self.qualified_name(owner);
        SmolStr::from(format!("{prefix}.{}", sym.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_scope_ignores_entries() {
        let mut scope = Scope::Error;
        scope.enter(SymbolId(3));
        assert!(scope.members().is_empty());

        let mut scope = Scope::default();
        scope.enter(SymbolId(3));
        assert_eq!(scope.members(), &[SymbolId(3)]);
    }
}
