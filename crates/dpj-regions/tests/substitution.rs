use dpj_regions::{Effect, Effects, Rpl, RplElement};

use pretty_assertions::assert_eq;

#[test]
fn rpl_subst_replaces_leading_param() {
    // P:A with P := Root:B gives Root:B:A
    let p_a = Rpl::param("P").child(RplElement::Name("A".into()));
    let b = Rpl::named("B");

    let out = p_a.subst(&[Rpl::param("P")], &[b]);
    assert_eq!(out.to_string(), "Root:B:A");
}

#[test]
fn rpl_subst_leaves_unrelated_paths_alone() {
    let q = Rpl::param("Q");
    let out = q.subst(&[Rpl::param("P")], &[Rpl::named("B")]);
    assert_eq!(out, q);

    let named = Rpl::named("A");
    assert_eq!(named.subst(&[Rpl::param("P")], &[Rpl::root()]), named);
}

#[test]
fn effects_display_and_purity() {
    assert_eq!(Effects::pure().to_string(), "pure");
    assert!(Effects::pure().is_pure());

    let effects = Effects::single(Effect::Read(Rpl::named("A")))
        .with(Effect::Write(Rpl::named("B")));
    assert_eq!(effects.to_string(), "reads Root:A writes Root:B");
    assert_eq!(effects.len(), 2);
}

#[test]
fn effect_variable_substitution_splices_summary() {
    let e = Effects::variable("E").with(Effect::Read(Rpl::named("A")));
    let replacement = Effects::single(Effect::Write(Rpl::named("B")));

    let out = e.subst_effect_var("E", &replacement);
    assert_eq!(
        out,
        Effects::single(Effect::Read(Rpl::named("A"))).with(Effect::Write(Rpl::named("B")))
    );
}

#[test]
fn writes_cover_reads() {
    let a_star = Rpl::named("A").child(RplElement::Star);
    let reads = Effects::single(Effect::Read(Rpl::named("A").child(RplElement::Name("X".into()))));
    let writes = Effects::single(Effect::Write(a_star));

    assert!(reads.is_subeffect_of(&writes));
    assert!(!writes.is_subeffect_of(&reads));
    assert!(Effects::pure().is_subeffect_of(&reads));
}

#[test]
fn effects_rpl_substitution() {
    let e = Effects::single(Effect::Write(Rpl::param("R")));
    let out = e.subst_rpl(&[Rpl::param("R")], &[Rpl::named("Left")]);
    assert_eq!(out.to_string(), "writes Root:Left");
}
