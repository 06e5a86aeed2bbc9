mod common;

use std::collections::HashSet;
use std::rc::Rc;

use common::Fixture;
use dpj_regions::{Effects, Rpl};
use dpj_types::{
    mapping, BoundKind, CallSiteActuals, ModelKind, TypeError, TypeId, TypeStore,
    TypeVisitor,
};

use pretty_assertions::assert_eq;

/// One type of every variant, built over the fixture.
fn zoo(fx: &Fixture) -> Vec<TypeId> {
    let store = &fx.store;
    let wk = store.well_known().clone();
    let cell_string = fx.cell_of(fx.string);
    let array = store.array_type(cell_string, Some(Rpl::named("A")), None);
    let method = store.method_type(vec![wk.int, cell_string], fx.t, vec![fx.object]);
    let forall = store.for_all(vec![fx.t], vec![Rpl::param("R")], vec![], method);
    let wildcard = store.wildcard(fx.string, BoundKind::Extends, Some(fx.t));
    let captured = store.captured_type("CAP#1", None, fx.string, wk.bot, wildcard);
    let undet = store.undet_var(fx.t);
    let error = store.error_type_named("Missing", Some(fx.pkg));
    let package = store.symbol_type(fx.pkg).unwrap();

    vec![
        wk.int,
        wk.boolean,
        wk.void,
        wk.bot,
        wk.none,
        wk.error,
        fx.cell_ty,
        cell_string,
        fx.raw_cell(),
        array,
        method,
        forall,
        fx.t,
        captured,
        wildcard,
        undet,
        error,
        package,
    ]
}

#[test]
fn identity_mapping_returns_the_same_handle() {
    let fx = Fixture::new();
    let mut identity = mapping("identity", |_: &TypeStore, ty| ty);

    for ty in zoo(&fx) {
        assert_eq!(fx.store.map(ty, &mut identity), ty, "{}", fx.store.display(ty));
    }
}

#[test]
fn every_type_contains_itself() {
    let fx = Fixture::new();
    for ty in zoo(&fx) {
        assert!(fx.store.contains(ty, ty), "{}", fx.store.display(ty));
    }
}

#[test]
fn rebuild_keeps_unchanged_children() {
    let fx = Fixture::new();
    let store = &fx.store;
    let wk = store.well_known().clone();

    let cell_string = fx.cell_of(fx.string);
    let method = store.method_type(vec![wk.int, cell_string], fx.t, vec![fx.object]);
    store
        .record_call_site_actuals(
            method,
            CallSiteActuals {
                type_actuals: vec![fx.string],
                region_actuals: vec![Rpl::named("A")],
                effect_actuals: vec![Effects::pure()],
            },
        )
        .unwrap();

    let (int, long) = (wk.int, wk.long);
    let mut widen = mapping("widen", move |_: &TypeStore, ty| if ty == int { long } else { ty });
    let mapped = store.map(method, &mut widen);

    assert_ne!(mapped, method);
    let params = store.parameter_types(mapped);
    assert_eq!(&*params, &[wk.long, cell_string]);
    assert_eq!(store.return_type(mapped), Some(fx.t));
    assert!(Rc::ptr_eq(&store.thrown_types(mapped), &store.thrown_types(method)));
    assert_eq!(store.call_site_actuals(mapped), store.call_site_actuals(method));
}

#[test]
fn class_rebuild_preserves_regions() {
    let fx = Fixture::new();
    let store = &fx.store;

    let cell_t = fx.cell_in(fx.t, Rpl::named("A"));
    let substituted = store.subst(cell_t, &[fx.t], &[fx.string]);

    assert_ne!(substituted, cell_t);
    assert_eq!(&*store.type_arguments(substituted), &[fx.string]);
    assert_eq!(&*store.rpl_arguments(substituted), &[Rpl::named("A")]);
    assert_eq!(store.enclosing_type(substituted), store.enclosing_type(cell_t));
    assert_eq!(store.as_element(substituted), Some(fx.cell));
}

#[test]
fn array_rebuild_resets_region() {
    let fx = Fixture::new();
    let store = &fx.store;

    let index = store.new_symbol(dpj_types::SymbolKind::Var, "i", None, Default::default());
    let array = store.array_type(fx.t, Some(Rpl::named("A")), Some(index));
    let mapped = store.subst(array, &[fx.t], &[fx.string]);

    match store.data(mapped).kind() {
        dpj_types::TypeKind::Array(a) => {
            assert_eq!(a.elem(), fx.string);
            assert!(a.rpl().is_root());
            assert_eq!(a.index_var(), None);
        }
        other => panic!("expected an array, got {other:?}"),
    }
}

#[test]
fn subst_rewrites_nested_occurrences() {
    let fx = Fixture::new();
    let store = &fx.store;

    let cell_t = fx.cell_of(fx.t);
    let array_t = store.array_type(fx.t, None, None);
    let wildcard = store.wildcard(fx.t, BoundKind::Super, None);
    let method = store.method_type(vec![cell_t, array_t, wildcard], fx.t, vec![]);

    let mapped = store.subst(method, &[fx.t], &[fx.string]);
    assert_eq!(store.return_type(mapped), Some(fx.string));
    let params = store.parameter_types(mapped);
    assert_eq!(&*store.type_arguments(params[0]), &[fx.string]);
    assert!(store.types_equal(params[1], store.array_type(fx.string, None, None)));
    assert_eq!(store.super_bound(params[2]), Some(fx.string));
    assert!(!store.contains(mapped, fx.t));

    // Other occurrences of the same declared variable are substituted too.
    let copy = store.copy_type_var(fx.t, vec![Rpl::named("B")]);
    assert_eq!(store.subst(copy, &[fx.t], &[fx.object]), fx.object);
}

#[test]
fn subst_respects_forall_shadowing() {
    let fx = Fixture::new();
    let store = &fx.store;
    let wk = store.well_known().clone();

    let method = store.method_type(vec![fx.t], fx.t, vec![]);
    let forall = store.for_all(vec![fx.t], vec![], vec![], method);
    assert_eq!(store.subst(forall, &[fx.t], &[fx.string]), forall);

    let u = store.new_type_var("U", None, wk.bot);
    let mixed = store.method_type(vec![fx.t, u], wk.void, vec![]);
    let forall = store.for_all(vec![fx.t], vec![], vec![], mixed);
    let mapped = store.subst(forall, &[fx.t, u], &[fx.string, fx.object]);
    assert_ne!(mapped, forall);
    assert_eq!(&*store.type_variables(mapped), &[fx.t]);
    assert_eq!(&*store.parameter_types(mapped), &[fx.t, fx.object]);
}

#[test]
fn subst_list_keeps_identity_when_nothing_matches() {
    let fx = Fixture::new();
    let store = &fx.store;
    let list: dpj_types::TypeList = Rc::from(vec![fx.string, fx.object]);
    assert!(Rc::ptr_eq(
        &store.subst_list(&list, &[fx.t], &[fx.string]),
        &list
    ));
}

#[test]
fn forall_map_rewraps_changed_body() {
    let fx = Fixture::new();
    let store = &fx.store;
    let wk = store.well_known().clone();

    let method = store.method_type(vec![wk.int], wk.void, vec![]);
    let forall = store.for_all(
        vec![fx.t],
        vec![Rpl::param("P")],
        vec![Effects::variable("E")],
        method,
    );
    let mut swap = mapping("swap", |store: &TypeStore, ty| {
        if store.try_as_method_type(ty).is_some() {
            store.map(ty, &mut mapping("int to long", |s: &TypeStore, t| {
                if t == s.well_known().int {
                    s.well_known().long
                } else {
                    t
                }
            }))
        } else {
            ty
        }
    });
    let mapped = store.map(forall, &mut swap);
    assert_ne!(mapped, forall);
    assert_eq!(&*store.type_variables(mapped), &[fx.t]);
    assert_eq!(&*store.rpl_arguments(mapped), &[Rpl::param("P")]);
    assert_eq!(&*store.effect_variables(mapped), &[Effects::variable("E")]);
    assert_eq!(&*store.parameter_types(mapped), &[wk.long]);
}

#[test]
fn error_type_ignores_mapping() {
    let fx = Fixture::new();
    let store = &fx.store;
    let int = store.well_known().int;
    let mut everything_is_int = mapping("const", move |_: &TypeStore, _| int);

    for err in [store.error_type(), store.well_known().error] {
        assert_eq!(store.map(err, &mut everything_is_int), err);
    }
}

#[test]
fn containment() {
    let fx = Fixture::new();
    let store = &fx.store;
    let wk = store.well_known().clone();

    let cell_string = fx.cell_of(fx.string);
    assert!(store.contains(cell_string, fx.string));
    assert!(!store.contains(fx.raw_cell(), fx.string));

    let method = store.method_type(vec![wk.int, cell_string], wk.void, vec![]);
    assert!(store.contains(method, fx.string));
    assert!(store.contains(method, wk.void));
    assert!(!store.contains(method, wk.double));

    let forall = store.for_all(vec![fx.t], vec![], vec![], method);
    assert!(store.contains(forall, wk.int));
    assert!(store.contains_list(&[wk.boolean, forall], fx.string));

    // Every candidate is checked, not just the first.
    assert!(store.contains_some(method, &[wk.double, fx.string]));
    assert!(!store.contains_some(method, &[wk.double, wk.float]));
}

#[test]
fn array_equality_ignores_region() {
    let fx = Fixture::new();
    let store = &fx.store;
    let int = store.well_known().int;

    let in_a = store.array_type(int, Some(Rpl::named("A")), None);
    let in_root = store.array_type(int, None, None);
    assert_ne!(in_a, in_root);
    assert!(store.types_equal(in_a, in_root));
    assert_eq!(store.type_hash(in_a), store.type_hash(in_root));

    let keys: HashSet<_> = [in_a, in_root].into_iter().map(|t| store.key(t)).collect();
    assert_eq!(keys.len(), 1);

    let of_long = store.array_type(store.well_known().long, None, None);
    assert!(!store.types_equal(in_a, of_long));
}

#[test]
fn method_equality_is_structural() {
    let fx = Fixture::new();
    let store = &fx.store;
    let wk = store.well_known().clone();

    let m1 = store.method_type(vec![wk.int, fx.string], wk.void, vec![]);
    let m2 = store.method_type(vec![wk.int, fx.string], wk.void, vec![fx.object]);
    let m3 = store.method_type(vec![fx.string, wk.int], wk.void, vec![]);
    let m4 = store.method_type(vec![wk.int], wk.void, vec![]);

    assert!(store.types_equal(m1, m2));
    assert_eq!(store.type_hash(m1), store.type_hash(m2));
    assert!(!store.types_equal(m1, m3));
    assert!(!store.types_equal(m1, m4));
    assert_eq!(store.key(m1), store.key(m2));
}

#[test]
fn call_site_actuals_are_write_once() {
    let fx = Fixture::new();
    let store = &fx.store;
    let method = store.method_type(vec![fx.t], fx.t, vec![]);
    let forall = store.for_all(vec![fx.t], vec![], vec![], method);

    let actuals = CallSiteActuals {
        type_actuals: vec![fx.string],
        ..CallSiteActuals::default()
    };
    store.record_call_site_actuals(forall, actuals.clone()).unwrap();
    assert_eq!(store.call_site_actuals(method), actuals);
    assert!(matches!(
        store.record_call_site_actuals(method, CallSiteActuals::default()),
        Err(TypeError::AlreadySet { .. })
    ));
}

#[test]
fn method_accessors_see_through_forall() {
    let fx = Fixture::new();
    let store = &fx.store;
    let wk = store.well_known().clone();

    let method = store.method_type(vec![fx.t], wk.void, vec![]);
    let forall = store.for_all(vec![fx.t], vec![], vec![Effects::variable("E")], method);

    assert_eq!(store.as_method_type(forall), method);
    assert_eq!(&*store.parameter_types(forall), &[fx.t]);
    assert_eq!(store.return_type(forall), Some(wk.void));
    assert_eq!(&*store.effect_variables(forall), &[Effects::variable("E")]);
    assert!(store.type_variables(method).is_empty());

    store.set_thrown(forall, vec![fx.object]);
    assert_eq!(&*store.thrown_types(method), &[fx.object]);
    assert_eq!(store.model_kind(forall), ModelKind::Executable);
    assert_eq!(store.complete(forall), Ok(()));
}

#[test]
#[should_panic(expected = "internal error")]
fn method_signature_of_class_is_fatal() {
    let fx = Fixture::new();
    fx.store.as_method_type(fx.string);
}

struct Describe;

impl TypeVisitor<()> for Describe {
    type Output = &'static str;

    fn visit_type(&mut self, _store: &TypeStore, _ty: TypeId, _arg: ()) -> &'static str {
        "other"
    }

    fn visit_class_type(&mut self, _store: &TypeStore, _ty: TypeId, _arg: ()) -> &'static str {
        "class"
    }

    fn visit_type_var(&mut self, _store: &TypeStore, _ty: TypeId, _arg: ()) -> &'static str {
        "type variable"
    }

    fn visit_error_type(&mut self, _store: &TypeStore, _ty: TypeId, _arg: ()) -> &'static str {
        "error"
    }
}

#[test]
fn visitor_dispatches_by_variant() {
    let fx = Fixture::new();
    let store = &fx.store;
    let wk = store.well_known().clone();
    let wildcard = store.wildcard(fx.string, BoundKind::Extends, None);
    let captured = store.captured_type("CAP#1", None, fx.string, wk.bot, wildcard);

    let mut describe = Describe;
    assert_eq!(store.accept(fx.cell_of(fx.string), &mut describe, ()), "class");
    assert_eq!(store.accept(fx.t, &mut describe, ()), "type variable");
    assert_eq!(store.accept(captured, &mut describe, ()), "type variable");
    assert_eq!(store.accept(wk.error, &mut describe, ()), "error");
    assert_eq!(store.accept(wk.int, &mut describe, ()), "other");
    assert_eq!(store.accept(wildcard, &mut describe, ()), "other");
}

#[test]
fn free_type_vars_skip_quantified_ones() {
    let fx = Fixture::new();
    let store = &fx.store;
    let wk = store.well_known().clone();

    let u = store.new_type_var("U", None, wk.bot);
    let method = store.method_type(vec![fx.cell_of(fx.t), u], fx.t, vec![]);
    assert_eq!(store.free_type_vars(method), vec![fx.t, u]);

    let forall = store.for_all(vec![fx.t], vec![], vec![], method);
    assert_eq!(store.free_type_vars(forall), vec![u]);
}
