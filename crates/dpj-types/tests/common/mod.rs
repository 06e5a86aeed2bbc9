#![allow(dead_code)]

use dpj_regions::Rpl;
use dpj_types::{ClassSignature, ClassTypeInit, SymbolFlags, SymbolId, TypeId, TypeStore};

/// `package demo; class Object; class String; class Cell<T, region R>`.
pub struct Fixture {
    pub store: TypeStore,
    pub pkg: SymbolId,
    pub object: TypeId,
    pub string: TypeId,
    pub cell: SymbolId,
    pub cell_ty: TypeId,
    pub t: TypeId,
}

impl Fixture {
    pub fn new() -> Self {
        let store = TypeStore::new();
        let pkg = store.declare_package("demo", None);
        let object = declare_plain(&store, pkg, "Object", None);
        let string = declare_plain(&store, pkg, "String", Some(object));

        let cell = store.declare_class("Cell", Some(pkg), SymbolFlags::PUBLIC, None);
        let cell_ty = store.symbol_type(cell).unwrap();
        let t = store.new_type_var("T", Some(cell), store.well_known().bot);
        store.set_upper_bound(t, object).unwrap();
        store
            .define_class_signature(
                cell_ty,
                ClassSignature {
                    type_params: vec![t],
                    region_params: vec![Rpl::param("R")],
                    supertype: Some(object),
                    ..ClassSignature::default()
                },
            )
            .unwrap();

        Self {
            store,
            pkg,
            object,
            string,
            cell,
            cell_ty,
            t,
        }
    }

    /// `Cell<arg>` with no region argument.
    pub fn cell_of(&self, arg: TypeId) -> TypeId {
        self.store.class_type(
            self.cell,
            ClassTypeInit {
                type_args: vec![arg],
                ..ClassTypeInit::default()
            },
        )
    }

    pub fn cell_in(&self, arg: TypeId, region: Rpl) -> TypeId {
        self.store.class_type(
            self.cell,
            ClassTypeInit {
                type_args: vec![arg],
                rpl_args: vec![region],
                ..ClassTypeInit::default()
            },
        )
    }

    pub fn raw_cell(&self) -> TypeId {
        self.store.class_type(self.cell, ClassTypeInit::default())
    }

    pub fn declare_plain(&self, name: &str, supertype: Option<TypeId>) -> TypeId {
        declare_plain(&self.store, self.pkg, name, supertype)
    }
}

pub fn declare_plain(
    store: &TypeStore,
    pkg: SymbolId,
    name: &str,
    supertype: Option<TypeId>,
) -> TypeId {
    let sym = store.declare_class(name, Some(pkg), SymbolFlags::PUBLIC, None);
    let ty = store.symbol_type(sym).unwrap();
    store
        .define_class_signature(
            ty,
            ClassSignature {
                supertype,
                ..ClassSignature::default()
            },
        )
        .unwrap();
    ty
}
