mod common;

use std::rc::Rc;

use common::Fixture;
use dpj_regions::{Effect, Effects, Rpl};
use dpj_types::{
    ClassSignature, ClassTypeInit, CompletionError, SymbolFlags, SymbolId, SymbolKind, TypeError,
    TypeKind, TypeStore,
};

use pretty_assertions::assert_eq;

#[test]
fn use_site_without_region_argument_defaults_to_root() {
    let fx = Fixture::new();
    let store = &fx.store;

    let cell_string = fx.cell_of(fx.string);

    assert_eq!(&*store.rpl_arguments(cell_string), &[Rpl::root()]);
    assert_eq!(&*store.type_arguments(cell_string), &[fx.string]);
    assert!(store.is_parameterized(cell_string));
    assert!(!store.is_raw(cell_string));
}

#[test]
fn region_backfill_is_cached() {
    let fx = Fixture::new();
    let cell_string = fx.cell_of(fx.string);

    let first = fx.store.rpl_arguments(cell_string);
    let second = fx.store.rpl_arguments(cell_string);
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn erased_use_site_gets_no_region_arguments() {
    let fx = Fixture::new();
    let erased = fx.store.class_type(
        fx.cell,
        ClassTypeInit {
            type_args: vec![fx.string],
            erased: true,
            ..ClassTypeInit::default()
        },
    );

    assert!(fx.store.rpl_arguments(erased).is_empty());
    assert!(fx.store.is_erased(erased));
}

#[test]
fn explicit_region_arguments_are_kept() {
    let fx = Fixture::new();
    let in_a = fx.cell_in(fx.string, Rpl::named("A"));

    assert_eq!(&*fx.store.rpl_arguments(in_a), &[Rpl::named("A")]);
    assert_eq!(fx.store.owner_region(in_a), Rpl::named("A"));
}

#[test]
fn canonical_type_reports_its_formals() {
    let fx = Fixture::new();
    let store = &fx.store;

    assert_eq!(&*store.type_arguments(fx.cell_ty), &[fx.t]);
    assert_eq!(&*store.rpl_arguments(fx.cell_ty), &[Rpl::param("R")]);
    assert!(store.effect_arguments(fx.cell_ty).is_empty());
    assert!(store.has_region_params(fx.cell_ty));
    assert!(!store.has_effect_params(fx.cell_ty));
    assert_eq!(store.supertype(fx.cell_ty), Some(fx.object));
}

#[test]
fn raw_detection() {
    let fx = Fixture::new();
    let store = &fx.store;

    let raw = fx.raw_cell();
    assert!(store.is_raw(raw));
    assert!(!store.is_parameterized(raw));

    // The canonical type is never raw, nor is a non-generic class.
    assert!(!store.is_raw(fx.cell_ty));
    let plain_use = store.class_type(
        store.as_element(fx.string).unwrap(),
        ClassTypeInit::default(),
    );
    assert!(!store.is_raw(plain_use));
    assert!(!store.is_raw(fx.cell_of(fx.string)));

    // Arrays delegate to the element type.
    let raw_array = store.array_type(raw, None, None);
    assert!(store.is_raw(raw_array));
    let array = store.array_type(fx.cell_of(fx.string), None, None);
    assert!(store.is_parameterized(array));
    assert!(!store.is_raw(array));
}

#[test]
fn nested_class_accumulates_outer_parameters_first() {
    let fx = Fixture::new();
    let store = &fx.store;

    let outer = store.declare_class("Outer", Some(fx.pkg), SymbolFlags::PUBLIC, None);
    let outer_ty = store.symbol_type(outer).unwrap();
    let x = store.new_type_var("X", Some(outer), store.well_known().bot);
    store.set_upper_bound(x, fx.object).unwrap();
    store
        .define_class_signature(
            outer_ty,
            ClassSignature {
                type_params: vec![x],
                region_params: vec![Rpl::param("O")],
                effect_params: vec![Effects::variable("E")],
                supertype: Some(fx.object),
                ..ClassSignature::default()
            },
        )
        .unwrap();

    let inner = store.declare_class("Inner", Some(outer), SymbolFlags::PUBLIC, Some(outer_ty));
    let inner_ty = store.symbol_type(inner).unwrap();
    let y = store.new_type_var("Y", Some(inner), store.well_known().bot);
    store
        .define_class_signature(
            inner_ty,
            ClassSignature {
                type_params: vec![y],
                region_params: vec![Rpl::param("I")],
                supertype: Some(fx.object),
                ..ClassSignature::default()
            },
        )
        .unwrap();

    assert_eq!(&*store.all_type_params(inner_ty), &[x, y]);
    assert_eq!(
        &*store.all_rpl_params(inner_ty),
        &[Rpl::param("O"), Rpl::param("I")]
    );
    assert_eq!(&*store.all_effect_params(inner_ty), &[Effects::variable("E")]);
    assert_eq!(store.enclosing_type(inner_ty), Some(outer_ty));

    let outer_string = store.class_type(
        outer,
        ClassTypeInit {
            type_args: vec![fx.string],
            ..ClassTypeInit::default()
        },
    );
    let inner_use = store.class_type(
        inner,
        ClassTypeInit {
            outer: Some(outer_string),
            type_args: vec![fx.object],
            ..ClassTypeInit::default()
        },
    );
    assert_eq!(&*store.all_type_params(inner_use), &[fx.string, fx.object]);
    assert!(!store.is_raw(inner_use));

    // Leaving out every type argument along the chain makes the inner type raw.
    let raw_outer = store.class_type(outer, ClassTypeInit::default());
    let raw_inner = store.class_type(
        inner,
        ClassTypeInit {
            outer: Some(raw_outer),
            ..ClassTypeInit::default()
        },
    );
    assert!(store.is_raw(raw_inner));
}

#[test]
fn effect_arguments_are_carried_by_use_sites() {
    let fx = Fixture::new();
    let writes_a = Effects::single(Effect::Write(Rpl::named("A")));
    let ty = fx.store.class_type(
        fx.cell,
        ClassTypeInit {
            type_args: vec![fx.string],
            effect_args: vec![writes_a.clone()],
            ..ClassTypeInit::default()
        },
    );
    assert_eq!(&*fx.store.effect_arguments(ty), &[writes_a]);
}

#[test]
fn completer_runs_on_first_query_only() {
    let fx = Fixture::new();
    let store = &fx.store;
    let object = fx.object;

    let list = store.declare_class("List", Some(fx.pkg), SymbolFlags::PUBLIC, None);
    let list_ty = store.symbol_type(list).unwrap();
    let e = store.new_type_var("E", Some(list), store.well_known().bot);
    store.set_completer(
        list,
        move |store: &TypeStore, sym: SymbolId| -> Result<(), CompletionError> {
            let ty = store
                .symbol_type(sym)
                .ok_or_else(|| CompletionError::new("List", "no canonical type"))?;
            store.set_symbol_flags(sym, SymbolFlags::PUBLIC | SymbolFlags::INTERFACE);
            store
                .define_class_signature(
                    ty,
                    ClassSignature {
                        type_params: vec![e],
                        supertype: Some(object),
                        ..ClassSignature::default()
                    },
                )
                .map_err(|err| CompletionError::new("List", err.to_string()))
        },
    );

    assert!(store.symbol(list).has_completer());
    assert_eq!(&*store.type_arguments(list_ty), &[e]);
    assert!(!store.symbol(list).has_completer());
    assert!(store.is_interface(list_ty));

    // A second completion is a no-op.
    assert_eq!(store.complete_symbol(list), Ok(()));
}

#[test]
fn queries_during_completion_do_not_freeze_the_class() {
    let fx = Fixture::new();
    let store = &fx.store;
    let object = fx.object;

    // class Foo<T extends Comparable<Foo<T>>>: the completer builds `Foo<T>` for the bound and
    // inspects it before the signature exists.
    let foo = store.declare_class("Foo", Some(fx.pkg), SymbolFlags::PUBLIC, None);
    let foo_ty = store.symbol_type(foo).unwrap();
    let t = store.new_type_var("T", Some(foo), store.well_known().bot);
    store.set_completer(
        foo,
        move |store: &TypeStore, sym: SymbolId| -> Result<(), CompletionError> {
            let foo_t = store.class_type(
                sym,
                ClassTypeInit {
                    type_args: vec![t],
                    ..ClassTypeInit::default()
                },
            );
            assert!(store.symbol(sym).is_completing());
            assert!(!store.is_raw(foo_t));
            assert!(store.type_arguments(store.symbol_type(sym).unwrap()).is_empty());
            assert!(store.rpl_arguments(foo_t).is_empty());

            store
                .define_class_signature(
                    store.symbol_type(sym).unwrap(),
                    ClassSignature {
                        type_params: vec![t],
                        region_params: vec![Rpl::param("R")],
                        supertype: Some(object),
                        ..ClassSignature::default()
                    },
                )
                .map_err(|err| CompletionError::new("Foo", err.to_string()))
        },
    );

    assert_eq!(store.complete(foo_ty), Ok(()));
    assert!(!store.symbol(foo).is_completing());
    assert_eq!(&*store.type_arguments(foo_ty), &[t]);
    assert_eq!(&*store.all_type_params(foo_ty), &[t]);
    assert_eq!(&*store.rpl_arguments(foo_ty), &[Rpl::param("R")]);

    let raw_foo = store.class_type(foo, ClassTypeInit::default());
    assert!(store.is_raw(raw_foo));
    assert_eq!(&*store.rpl_arguments(raw_foo), &[Rpl::root()]);
}

#[test]
fn failed_completion_leaves_empty_lists() {
    let fx = Fixture::new();
    let store = &fx.store;

    let broken = store.declare_class("Broken", Some(fx.pkg), SymbolFlags::PUBLIC, None);
    let broken_ty = store.symbol_type(broken).unwrap();
    store.set_completer(
        broken,
        |_: &TypeStore, _: SymbolId| -> Result<(), CompletionError> {
            Err(CompletionError::new("Broken", "class file not found"))
        },
    );

    let err = store.complete(broken_ty).unwrap_err();
    assert_eq!(err.symbol, "Broken");
    assert!(store.type_arguments(broken_ty).is_empty());
    assert!(store.rpl_arguments(broken_ty).is_empty());
    assert_eq!(store.supertype(broken_ty), None);
}

#[test]
fn compound_check_does_not_complete() {
    let fx = Fixture::new();
    let store = &fx.store;

    let lazy = store.declare_class("", Some(fx.pkg), SymbolFlags::COMPOUND, None);
    let lazy_ty = store.symbol_type(lazy).unwrap();
    store.set_completer(
        lazy,
        |_: &TypeStore, _: SymbolId| -> Result<(), CompletionError> { Ok(()) },
    );
    assert!(!store.is_compound(lazy_ty));
    assert!(store.symbol(lazy).has_completer());

    let eager = store.declare_class("", Some(fx.pkg), SymbolFlags::COMPOUND, None);
    assert!(store.is_compound(store.symbol_type(eager).unwrap()));
}

#[test]
fn define_class_signature_is_write_once() {
    let fx = Fixture::new();
    let err = fx
        .store
        .define_class_signature(fx.cell_ty, ClassSignature::default())
        .unwrap_err();
    assert!(matches!(err, TypeError::AlreadySet { .. }));

    let err = fx
        .store
        .define_class_signature(fx.store.well_known().int, ClassSignature::default())
        .unwrap_err();
    assert!(matches!(err, TypeError::UnexpectedVariant { .. }));
}

#[test]
fn error_type_absorbs_queries() {
    let fx = Fixture::new();
    let store = &fx.store;

    for err in [store.error_type(), store.well_known().error] {
        assert!(store.is_erroneous(err));
        assert!(store.type_arguments(err).is_empty());
        assert!(store.rpl_arguments(err).is_empty());
        assert!(store.effect_arguments(err).is_empty());
        assert!(store.all_type_params(err).is_empty());
        assert!(!store.is_raw(err));
        assert!(!store.is_compound(err));
        assert!(!store.is_interface(err));
        assert_eq!(store.enclosing_type(err), Some(err));
        assert_eq!(store.return_type(err), Some(err));
    }
}

#[test]
fn damaged_class_gets_error_scope() {
    let fx = Fixture::new();
    let store = &fx.store;

    let missing = store.declare_class("Missing", Some(fx.pkg), SymbolFlags::PUBLIC, None);
    store.enter_member(missing, fx.cell);
    let err = store.error_type_for_class(missing);

    let sym = store.symbol(missing);
    assert_eq!(sym.kind(), SymbolKind::Error);
    assert!(sym.members().is_error());
    assert!(sym.members().members().is_empty());
    assert_eq!(store.symbol_type(missing), Some(err));

    store.enter_member(missing, fx.cell);
    assert!(store.symbol(missing).members().members().is_empty());

    let named = store.error_type_named("Nowhere", Some(fx.pkg));
    assert!(store.is_erroneous(named));
    assert_eq!(store.qualified_name(store.as_element(named).unwrap()), "demo.Nowhere");
}

#[test]
fn erroneous_propagates_through_structure() {
    let fx = Fixture::new();
    let store = &fx.store;
    let err = store.error_type();

    assert!(store.is_erroneous(fx.cell_of(err)));
    assert!(store.is_erroneous(store.array_type(err, None, None)));
    let method = store.method_type(vec![store.well_known().int], err, vec![]);
    assert!(store.is_erroneous(method));
    let forall = store.for_all(vec![fx.t], vec![], vec![], method);
    assert!(store.is_erroneous(forall));
    assert!(!store.is_erroneous(fx.cell_of(fx.string)));
    assert!(store.is_erroneous_list(&[fx.string, err]));
}

#[test]
fn bound_is_shared_with_prototype() {
    let fx = Fixture::new();
    let store = &fx.store;
    let bot = store.well_known().bot;

    let declared = store.new_type_var("U", None, bot);
    let copy = store.copy_type_var(declared, vec![Rpl::named("A")]);
    assert_eq!(store.upper_bound(copy), None);

    store.set_upper_bound(copy, fx.string).unwrap();
    assert_eq!(store.upper_bound(declared), Some(fx.string));
    assert_eq!(store.type_var_bound(copy), fx.string);
    assert_eq!(&*store.rpl_arguments(copy), &[Rpl::named("A")]);

    let declared = store.new_type_var("V", None, bot);
    let copy = store.copy_type_var(declared, Vec::new());
    store.set_upper_bound(declared, fx.object).unwrap();
    assert_eq!(store.upper_bound(copy), Some(fx.object));

    // Copies of copies still share the declaration.
    let copy2 = store.copy_type_var(copy, Vec::new());
    match store.data(copy2).kind() {
        TypeKind::TypeVar(var) => assert_eq!(var.prototype(), Some(declared)),
        other => panic!("expected a type variable, got {other:?}"),
    }
}

#[test]
fn conflicting_bound_is_rejected() {
    let fx = Fixture::new();
    let store = &fx.store;

    let declared = store.new_type_var("U", None, store.well_known().bot);
    store.set_upper_bound(declared, fx.string).unwrap();
    assert_eq!(store.set_upper_bound(declared, fx.string), Ok(()));
    assert!(matches!(
        store.set_upper_bound(declared, fx.object),
        Err(TypeError::AlreadySet { .. })
    ));
    assert!(matches!(
        store.set_upper_bound(fx.string, fx.object),
        Err(TypeError::UnexpectedVariant { .. })
    ));
}

#[test]
#[should_panic(expected = "internal error")]
fn bound_of_unbounded_variable_is_fatal() {
    let store = TypeStore::new();
    let var = store.new_type_var("W", None, store.well_known().bot);
    store.type_var_bound(var);
}
