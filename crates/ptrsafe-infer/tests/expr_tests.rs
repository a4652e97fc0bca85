use crate::test_utils::{add_unit, returns, var_at};
use crate::{ProgramInfo, ResolveError};
use ptrsafe_ast::{BinaryOp, Type, UnitBuilder};
use ptrsafe_common::UnitId;
use ptrsafe_solver::{CVarSet, Category};

fn int_ptr() -> Type {
    Type::ptr(Type::int())
}

#[test]
fn subscript_strips_one_level() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let pp = b.global("pp", Type::ptr(int_ptr()), 1);
    let p = b.global("p", int_ptr(), 2);
    let base2 = b.decl_ref(pp);
    let i = b.int(1);
    let sub2 = b.subscript(base2, i);
    let base1 = b.decl_ref(p);
    let sub1 = b.subscript(base1, i);
    let unit = b.build();

    let mut info = ProgramInfo::default();
    add_unit(&mut info, &unit);
    let outer = var_at(&info, &unit, pp, false);

    info.enter_compilation_unit(&unit);
    let once = info.resolve_expr(&unit, sub2, true).unwrap();
    let twice = info.resolve_expr(&unit, sub2, true).unwrap();
    assert!(info.resolve_expr(&unit, sub1, true).unwrap().is_empty());
    info.exit_compilation_unit();

    assert_eq!(once, twice);
    assert_eq!(once.len(), 1);
    let derived = info.arena().pointer(*once.first().unwrap()).unwrap();
    let original = info.arena().pointer(outer).unwrap();
    assert_eq!(derived.depth(), 1);
    assert_eq!(derived.atoms[0], original.atoms[1]);
    assert_eq!(derived.name, "pp");
}

#[test]
fn deref_strips_one_level_and_rejects_functions() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let pp = b.global("pp", Type::ptr(Type::ptr(int_ptr())), 1);
    let f = b.declare_fn("f", Type::void(), vec![], 2);
    let r = b.decl_ref(pp);
    let d1 = b.deref(r);
    let d2 = b.deref(d1);
    let fr = b.decl_ref(f);
    let bad = b.deref(fr);
    let unit = b.build();

    let mut info = ProgramInfo::default();
    add_unit(&mut info, &unit);

    info.enter_compilation_unit(&unit);
    let two = info.resolve_expr(&unit, d2, false).unwrap();
    assert_eq!(
        info.arena().pointer(*two.first().unwrap()).unwrap().depth(),
        1
    );
    assert_eq!(
        info.resolve_expr(&unit, bad, false),
        Err(ResolveError::DerefOfFunction { expr: bad })
    );
    info.exit_compilation_unit();
}

#[test]
fn string_literal_is_a_fresh_null_terminated_array() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let s1 = b.string("hello");
    let s2 = b.string("hello");
    let wrapped = b.paren(s1);
    let unit = b.build();

    let mut info = ProgramInfo::default();
    info.enter_compilation_unit(&unit);
    let a = info.resolve_expr(&unit, s1, false).unwrap();
    let again = info.resolve_expr(&unit, wrapped, true).unwrap();
    let other = info.resolve_expr(&unit, s2, false).unwrap();
    info.exit_compilation_unit();

    assert_eq!(a, again);
    assert_ne!(a, other);
    assert_eq!(a.len(), 1);
    let v = *a.first().unwrap();
    let pv = info.arena().pointer(v).unwrap();
    assert_eq!(pv.depth(), 1);
    let atom = pv.atoms[0];

    let env = info.solve();
    assert_eq!(env.category_of(atom), Category::NtArr);
}

#[test]
fn wrappers_are_transparent() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let p = b.global("p", int_ptr(), 1);
    let r = b.decl_ref(p);
    let e1 = b.paren(r);
    let e2 = b.implicit_cast(e1);
    let e3 = b.bind_temporary(e2);
    let unit = b.build();

    let mut info = ProgramInfo::default();
    add_unit(&mut info, &unit);
    info.enter_compilation_unit(&unit);
    let direct = info.resolve_expr(&unit, r, false).unwrap();
    assert_eq!(info.resolve_expr(&unit, e3, false).unwrap(), direct);
    info.exit_compilation_unit();
}

#[test]
fn operators_union_their_operands() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let p = b.global("p", int_ptr(), 1);
    let q = b.global("q", int_ptr(), 2);
    let c = b.global("c", int_ptr(), 3);
    let n = b.global("n", Type::int(), 4);
    let (rp, rq, rc, rn) = (b.decl_ref(p), b.decl_ref(q), b.decl_ref(c), b.decl_ref(n));
    let sum = b.binary(BinaryOp::Add, rp, rn);
    let cond = b.conditional(rc, rp, rq);
    let unit = b.build();

    let mut info = ProgramInfo::default();
    add_unit(&mut info, &unit);
    let (vp, vq, vc) = (
        var_at(&info, &unit, p, false),
        var_at(&info, &unit, q, false),
        var_at(&info, &unit, c, false),
    );

    info.enter_compilation_unit(&unit);
    assert_eq!(info.resolve_expr(&unit, sum, false).unwrap(), CVarSet::from([vp]));
    assert_eq!(
        info.resolve_expr(&unit, cond, false).unwrap(),
        CVarSet::from([vp, vq, vc])
    );
    info.exit_compilation_unit();
}

#[test]
fn call_resolves_to_the_declared_return() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let f = b.declare_fn("f", int_ptr(), vec![], 1);
    let fp = b.global("fp", Type::ptr(Type::func(int_ptr(), vec![])), 2);
    let cf = b.decl_ref(f);
    let call_f = b.call(cf, vec![]);
    let cfp = b.decl_ref(fp);
    let call_fp = b.call(cfp, vec![]);
    let unit = b.build();

    let mut info = ProgramInfo::default();
    add_unit(&mut info, &unit);
    let f_returns = returns(&info, var_at(&info, &unit, f, true));
    let attached = info
        .arena()
        .pointer(var_at(&info, &unit, fp, false))
        .unwrap()
        .function
        .unwrap();

    info.enter_compilation_unit(&unit);
    // In-body context is ignored for calls.
    assert_eq!(info.resolve_expr(&unit, call_f, true).unwrap(), f_returns);
    assert_eq!(
        info.resolve_expr(&unit, call_fp, false).unwrap(),
        returns(&info, attached)
    );
    info.exit_compilation_unit();
}

#[test]
fn computed_callee_goes_through_the_pointer() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let table = b.global(
        "table",
        Type::array(Type::ptr(Type::func(int_ptr(), vec![])), Some(4)),
        1,
    );
    let r = b.decl_ref(table);
    let i = b.int(2);
    let entry = b.subscript(r, i);
    let call = b.call(entry, vec![]);
    let unit = b.build();

    let mut info = ProgramInfo::default();
    add_unit(&mut info, &unit);
    let attached = info
        .arena()
        .pointer(var_at(&info, &unit, table, false))
        .unwrap()
        .function
        .unwrap();

    info.enter_compilation_unit(&unit);
    let got = info.resolve_expr(&unit, call, false).unwrap();
    info.exit_compilation_unit();
    assert_eq!(got, returns(&info, attached));
}

#[test]
fn unknown_callee_gets_a_stable_placeholder() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let f = b.declare_fn("f", int_ptr(), vec![], 1);
    let cf = b.decl_ref(f);
    let call = b.call(cf, vec![]);
    let unit = b.build();

    // Nothing was added, as for a function declared in an unanalyzed header.
    let mut info = ProgramInfo::default();
    info.enter_compilation_unit(&unit);
    let first = info.resolve_expr(&unit, call, false).unwrap();
    let second = info.resolve_expr(&unit, call, false).unwrap();
    info.exit_compilation_unit();

    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    let placeholder = info.arena().function(*first.first().unwrap()).unwrap();
    assert!(placeholder.returns.is_empty());
    assert_eq!(placeholder.num_params(), 0);
}

#[test]
fn callee_that_is_not_a_declarator_is_an_error() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let t = b.typedef("handler_t", Type::func(Type::void(), vec![]), 1);
    let r = b.decl_ref(t);
    let call = b.call(r, vec![]);
    let unit = b.build();

    let mut info = ProgramInfo::default();
    info.enter_compilation_unit(&unit);
    assert_eq!(
        info.resolve_expr(&unit, call, false),
        Err(ResolveError::UnclassifiableCallee {
            anchor: unit.anchor(t)
        })
    );
    info.exit_compilation_unit();
}

#[test]
fn other_expressions_resolve_to_nothing() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let p = b.global("p", int_ptr(), 1);
    let n = b.int(3);
    let size = b.size_of(Type::int());
    let r = b.decl_ref(p);
    let cast = b.cast(Type::ptr(Type::char()), r);
    let unit = b.build();

    let mut info = ProgramInfo::default();
    add_unit(&mut info, &unit);
    info.enter_compilation_unit(&unit);
    for e in [n, size, cast] {
        assert!(info.resolve_expr(&unit, e, false).unwrap().is_empty());
    }
    info.exit_compilation_unit();
}
