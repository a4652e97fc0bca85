use crate::{DeclKind, Expr, Stmt, Type, UnitBuilder};
use ptrsafe_common::{Anchor, UnitId};

#[test]
fn builder_assigns_distinct_columns_on_one_line() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let p = b.param("p", Type::ptr(Type::int()), 1);
    let f = b.declare_fn("f", Type::int(), vec![p], 1);
    let unit = b.build();

    assert_eq!(unit.anchor(p), Anchor::new("a.c", 1, 1));
    assert_eq!(unit.anchor(f), Anchor::new("a.c", 1, 5));
}

#[test]
fn same_header_gives_same_anchors_in_two_units() {
    let build = |id: u32, main: &str| {
        let mut b = UnitBuilder::new(UnitId(id), main);
        b.in_file("shared.h");
        let p = b.param("p", Type::ptr(Type::int()), 3);
        let f = b.declare_fn("f", Type::int(), vec![p], 3);
        let unit = b.build();
        (unit.anchor(f), unit.anchor(p))
    };
    assert_eq!(build(0, "a.c"), build(1, "b.c"));
}

#[test]
fn params_know_their_owner_and_position() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let x = b.param("x", Type::int(), 1);
    let y = b.param("y", Type::ptr(Type::char()), 1);
    let f = b.declare_fn("f", Type::void(), vec![x, y], 1);
    let unit = b.build();

    assert_eq!(unit.param_index(x), Some((f, 0)));
    assert_eq!(unit.param_index(y), Some((f, 1)));
    match &unit.decl(f).kind {
        DeclKind::Function { ty, .. } => {
            assert_eq!(ty.params, vec![Type::int(), Type::ptr(Type::char())]);
        }
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn orphan_param_has_no_index() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let lonely = b.param("q", Type::ptr(Type::int()), 2);
    let unit = b.build();
    assert_eq!(unit.param_index(lonely), None);
}

#[test]
fn declaration_and_definition_follow_the_redeclaration_chain() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let p1 = b.param("p", Type::ptr(Type::int()), 1);
    let proto = b.declare_fn("f", Type::int(), vec![p1], 1);
    let p2 = b.param("p", Type::ptr(Type::int()), 5);
    let def = b.define_fn("f", Type::int(), vec![p2], vec![], 5);
    let unit = b.build();

    assert_eq!(unit.declaration_of(def), Some(proto));
    assert_eq!(unit.declaration_of(proto), Some(proto));
    assert_eq!(unit.definition_of(proto), Some(def));
    assert!(unit.decl(def).has_body());
}

#[test]
fn callee_decl_strips_parens_and_implicit_casts() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let f = b.declare_fn("f", Type::int(), vec![], 1);
    let r = b.decl_ref(f);
    let cast = b.implicit_cast(r);
    let paren = b.paren(cast);
    let call = b.call(paren, vec![]);
    let arr = b.global("table", Type::array(Type::ptr(Type::func(Type::int(), vec![])), Some(2)), 2);
    let ar = b.decl_ref(arr);
    let zero = b.int(0);
    let sub = b.subscript(ar, zero);
    let indirect = b.call(sub, vec![]);
    let unit = b.build();

    assert_eq!(unit.callee_decl(call), Some(f));
    assert_eq!(unit.callee_decl(indirect), None);
    assert!(matches!(
        unit.expr(unit.ignore_paren_imp_casts(paren)),
        Expr::DeclRef { .. }
    ));
}

#[test]
fn macro_declarations_are_not_rewritable() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let g = b.global("g", Type::ptr(Type::int()), 1);
    let h = b.global("h", Type::ptr(Type::int()), 2);
    b.in_macro(g);
    let unit = b.build();
    assert!(!unit.is_rewritable(g));
    assert!(unit.is_rewritable(h));
}

#[test]
fn k_and_r_declaration_has_no_prototype() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let f = b.declare_fn_no_proto("legacy", Type::int(), 1);
    let body_ret = b.int(0);
    let g = b.define_fn("g", Type::int(), vec![], vec![Stmt::ret(Some(body_ret))], 2);
    let unit = b.build();
    match &unit.decl(f).kind {
        DeclKind::Function { ty, .. } => assert!(!ty.has_prototype),
        other => panic!("expected function, got {other:?}"),
    }
    assert_eq!(unit.decl(g).body().map(<[Stmt]>::len), Some(1));
}

#[test]
fn declarators_include_locals_but_not_params() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let g = b.global("g", Type::ptr(Type::int()), 1);
    let p = b.param("p", Type::ptr(Type::int()), 2);
    let local = b.local("q", Type::ptr(Type::int()), 3);
    let f = b.define_fn("f", Type::void(), vec![p], vec![Stmt::decl(local)], 2);
    let unit = b.build();
    assert_eq!(unit.declarators(), vec![g, f, local]);
}

#[test]
fn declarators_reach_locals_in_nested_blocks() {
    let mut b = UnitBuilder::new(UnitId(0), "a.c");
    let outer = b.local("a", Type::ptr(Type::int()), 2);
    let inner = b.local("b", Type::ptr(Type::int()), 4);
    let last = b.local("c", Type::ptr(Type::int()), 6);
    let body = vec![
        Stmt::decl(outer),
        Stmt::block(vec![Stmt::block(vec![Stmt::decl(inner)])]),
        Stmt::decl(last),
    ];
    let f = b.define_fn("f", Type::void(), vec![], body, 1);
    let unit = b.build();
    assert_eq!(unit.declarators(), vec![f, outer, inner, last]);
}
