//! Source-like rendering of types for diagnostics and logs.
//!
//! The output is meant for people; nothing parses it back.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ty::{ArrayType, BoundKind, ClassType, TypeData, TypeKind, TypeTag};
use crate::{SymbolFlags, SymbolKind, TypeId, TypeStore};

/// Modulus for the short suffix that tells captured variables apart.
const CAPTURE_SUFFIX_MODULUS: u32 = 997;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Append disambiguating identities to type variables and anonymous classes, and print the
    /// formal bound of wildcards.
    pub verbose: bool,
    /// Print region and effect arguments.
    pub print_regions: bool,
}

/// A type paired with the store it lives in, rendered with the store's display options.
pub struct TypeDisplay<'a> {
    store: &'a TypeStore,
    ty: TypeId,
    options: DisplayOptions,
}

impl TypeDisplay<'_> {
    pub fn with_options(mut self, options: DisplayOptions) -> Self {
        self.options = options;
        self
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.store.write_type(f, self.ty, self.options)
    }
}

impl fmt::Debug for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} `{}`", self.ty, self)
    }
}

impl TypeStore {
    pub fn display(&self, ty: TypeId) -> TypeDisplay<'_> {
        TypeDisplay {
            store: self,
            ty,
            options: self.display_options(),
        }
    }

    /// Comma-separated rendering of a list of types.
    pub fn display_list(&self, types: &[TypeId]) -> String {
        let mut out = String::new();
        for (idx, ty) in types.iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            out.push_str(&self.display(*ty).to_string());
        }
        out
    }

    /// Parameter types of a method, with a trailing array parameter rendered as `elem...`
    /// when the method is variable-arity.
    pub fn display_arg_types(&self, ty: TypeId, varargs: bool) -> String {
        let params = self.parameter_types(ty);
        let Some((last, init)) = params.split_last().filter(|_| varargs) else {
            return self.display_list(&params);
        };
        let mut out = String::new();
        for param in init {
            out.push_str(&self.display(*param).to_string());
            out.push(',');
        }
        match self.data(*last).kind() {
            TypeKind::Array(array) => {
                out.push_str(&self.display(array.elem).to_string());
                out.push_str("...");
            }
            _ => out.push_str(&self.display(*last).to_string()),
        }
        out
    }

    fn write_type(
        &self,
        f: &mut fmt::Formatter<'_>,
        ty: TypeId,
        opts: DisplayOptions,
    ) -> fmt::Result {
        let data = self.data(ty);
        match &data.kind {
            TypeKind::Primitive(_) | TypeKind::Void | TypeKind::None | TypeKind::Bottom => {
                self.write_symbol_name(f, &data)
            }
            TypeKind::Package => match data.symbol {
                Some(sym) => f.write_str(&self.qualified_name(sym)),
                None => f.write_str("<none>"),
            },
            TypeKind::Class(class) => self.write_class(f, ty, &data, class, opts),
            TypeKind::Error(_) => match data.symbol {
                Some(sym) => f.write_str(&self.qualified_name(sym)),
                None => f.write_str("<any>"),
            },
            TypeKind::Array(array) => self.write_array(f, array, opts),
            TypeKind::Method(method) => {
                f.write_str("(")?;
                self.write_types(f, &method.params, opts)?;
                f.write_str(")")?;
                self.write_type(f, method.restype, opts)
            }
            TypeKind::ForAll(forall) => {
                f.write_str("<")?;
                self.write_types(f, &forall.tvars, opts)?;
                if !forall.rvars.is_empty() {
                    if !forall.tvars.is_empty() {
                        f.write_str(", ")?;
                    }
                    f.write_str("region ")?;
                    write_joined(f, &forall.rvars)?;
                }
                if !forall.evars.is_empty() {
                    if !forall.tvars.is_empty() || !forall.rvars.is_empty() {
                        f.write_str(", ")?;
                    }
                    write_joined(f, &forall.evars)?;
                }
                f.write_str(">")?;
                self.write_type(f, forall.qtype, opts)
            }
            TypeKind::TypeVar(_) => {
                self.write_symbol_name(f, &data)?;
                if opts.verbose {
                    write!(f, "{}", ty.index())?;
                }
                let rpls = self.rpl_arguments(ty);
                if opts.print_regions && !rpls.is_empty() {
                    f.write_str("<")?;
                    write_joined(f, &rpls)?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeKind::Captured(captured) => {
                write!(f, "capture#{} of ", ty.index() % CAPTURE_SUFFIX_MODULUS)?;
                self.write_type(f, captured.wildcard, opts)
            }
            TypeKind::Wildcard(wildcard) => {
                write!(f, "{}", wildcard.kind)?;
                if wildcard.kind != BoundKind::Unbound {
                    self.write_type(f, wildcard.ty, opts)?;
                }
                if opts.verbose {
                    if let Some(upper) = wildcard.formal.get().and_then(|v| self.upper_bound(v)) {
                        let plain = DisplayOptions {
                            verbose: false,
                            ..opts
                        };
                        f.write_str("{:")?;
                        self.write_type(f, upper, plain)?;
                        f.write_str(":}")?;
                    }
                }
                Ok(())
            }
            TypeKind::UndetVar(undet) => match undet.inst.get() {
                Some(inst) => self.write_type(f, *inst, opts),
                None => {
                    self.write_type(f, undet.origin, opts)?;
                    f.write_str("?")
                }
            },
        }
    }

    fn write_symbol_name(&self, f: &mut fmt::Formatter<'_>, data: &TypeData) -> fmt::Result {
        match data.symbol {
            Some(sym) => f.write_str(&self.symbol(sym).name),
            None => f.write_str("<none>"),
        }
    }

    fn write_types(
        &self,
        f: &mut fmt::Formatter<'_>,
        types: &[TypeId],
        opts: DisplayOptions,
    ) -> fmt::Result {
        for (idx, ty) in types.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            self.write_type(f, *ty, opts)?;
        }
        Ok(())
    }

    fn write_class(
        &self,
        f: &mut fmt::Formatter<'_>,
        ty: TypeId,
        data: &TypeData,
        class: &ClassType,
        opts: DisplayOptions,
    ) -> fmt::Result {
        let member_of_type = data
            .symbol
            .and_then(|sym| self.symbol(sym).owner())
            .is_some_and(|owner| self.symbol(owner).kind() == SymbolKind::Type);
        if member_of_type && self.tag(class.outer) == TypeTag::Class {
            self.write_type(f, class.outer, opts)?;
            f.write_str(".")?;
            self.write_class_name(f, ty, data, false, opts)?;
        } else {
            self.write_class_name(f, ty, data, true, opts)?;
        }

        let type_args = self.type_arguments(ty);
        let (rpl_args, effect_args) = if opts.print_regions {
            (self.rpl_arguments(ty), self.effect_arguments(ty))
        } else {
            (crate::empty_rpls(), crate::empty_effects())
        };
        if type_args.is_empty() && rpl_args.is_empty() && effect_args.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        self.write_types(f, &type_args, opts)?;
        if !rpl_args.is_empty() {
            if !type_args.is_empty() {
                f.write_str(", ")?;
            }
            write_joined(f, &rpl_args)?;
        }
        if !effect_args.is_empty() {
            if !type_args.is_empty() || !rpl_args.is_empty() {
                f.write_str(", ")?;
            }
            write_joined(f, &effect_args)?;
        }
        f.write_str(">")
    }

    fn write_class_name(
        &self,
        f: &mut fmt::Formatter<'_>,
        ty: TypeId,
        data: &TypeData,
        qualified: bool,
        opts: DisplayOptions,
    ) -> fmt::Result {
        let Some(sym_id) = data.symbol else {
            return f.write_str("<none>");
        };
        let sym = self.symbol(sym_id);
        if !sym.name().is_empty() {
            return if qualified {
                f.write_str(&self.qualified_name(sym_id))
            } else {
                f.write_str(sym.name())
            };
        }

        if sym.raw_flags().contains(SymbolFlags::COMPOUND) {
            if let Some(supertype) = self.supertype(ty) {
                self.write_type(f, supertype, opts)?;
            }
            for iface in self.interfaces(ty).iter() {
                f.write_str("&")?;
                self.write_type(f, *iface, opts)?;
            }
            return Ok(());
        }

        // Anonymous: described by its first interface, else its superclass, as recorded on
        // the canonical type without completing it.
        let canonical = sym.ty().map(|c| self.data(c));
        let described = canonical.as_deref().and_then(|c| match &c.kind {
            TypeKind::Class(cls) => cls
                .interfaces
                .get()
                .and_then(|ifaces| ifaces.first().copied())
                .or_else(|| cls.supertype.get().copied()),
            _ => None,
        });
        f.write_str("<anonymous")?;
        if let Some(described) = described {
            f.write_str(" ")?;
            self.write_type(f, described, opts)?;
        }
        f.write_str(">")?;
        if opts.verbose {
            write!(f, "{}", sym_id.index())?;
        }
        Ok(())
    }

    fn write_array(
        &self,
        f: &mut fmt::Formatter<'_>,
        array: &ArrayType,
        opts: DisplayOptions,
    ) -> fmt::Result {
        if !opts.print_regions {
            self.write_type(f, array.elem, opts)?;
            return f.write_str("[]");
        }

        let mut dims = vec![(array.rpl.clone(), array.index_var)];
        let mut base = array.elem;
        while let TypeKind::Array(inner) = self.data(base).kind() {
            dims.push((inner.rpl.clone(), inner.index_var));
            base = inner.elem;
        }
        self.write_type(f, base, opts)?;
        for (rpl, index_var) in dims {
            f.write_str("[]")?;
            if !rpl.is_root() {
                write!(f, "<{rpl}>")?;
            }
            if let Some(var) = index_var {
                let name = self.symbol_name(var);
                if name.as_str() != "_" {
                    write!(f, "#{name}")?;
                }
            }
        }
        Ok(())
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
