//! End-to-end runs of the inference pipeline over small multi-unit programs.

use ptrsafe::ast::{DeclId, Stmt, TranslationUnit, Type, UnitBuilder};
use ptrsafe::common::UnitId;
use ptrsafe::{Category, InferOptions, Outcome, Pipeline};

fn int_ptr() -> Type {
    Type::ptr(Type::int())
}

fn char_ptr() -> Type {
    Type::ptr(Type::char())
}

/// Categories of the first pointer variable recorded at a declaration.
fn categories(outcome: &Outcome, unit: &TranslationUnit, decl: DeclId) -> Vec<Category> {
    let anchor = unit.anchor(decl);
    outcome
        .assignment
        .at(&anchor)
        .unwrap_or_else(|| panic!("nothing recorded at {anchor}"))
        .iter()
        .find(|v| !v.categories().is_empty())
        .map(|v| v.categories().to_vec())
        .unwrap_or_else(|| panic!("no pointer at {anchor}"))
}

fn run(units: &[TranslationUnit]) -> Outcome {
    Pipeline::new(InferOptions::default()).run(units)
}

/// `int *f(int *p);` in its own unit.
fn declaring_unit(id: u32, file: &str) -> (TranslationUnit, DeclId) {
    let mut b = UnitBuilder::new(UnitId(id), file);
    let p = b.param("p", int_ptr(), 1);
    b.declare_fn("f", int_ptr(), vec![p], 1);
    (b.build(), p)
}

#[test]
fn declarations_in_other_units_follow_the_definition() {
    let (a, a_p) = declaring_unit(0, "a.c");
    let (b, b_p) = declaring_unit(1, "b.c");

    // int *f(int *p) { p[3]; return p; }
    let mut cb = UnitBuilder::new(UnitId(2), "c.c");
    let p = cb.param("p", int_ptr(), 1);
    let r = cb.decl_ref(p);
    let three = cb.int(3);
    let sub = cb.subscript(r, three);
    let ret = cb.decl_ref(p);
    cb.define_fn(
        "f",
        int_ptr(),
        vec![p],
        vec![Stmt::expr(sub), Stmt::ret(Some(ret))],
        1,
    );
    let c = cb.build();

    let outcome = run(&[a.clone(), b.clone(), c.clone()]);
    assert!(outcome.converged);
    assert!(outcome.link.merged_declarations >= 1);
    assert_eq!(outcome.link.unresolved_externs, 0);

    assert_eq!(categories(&outcome, &c, p), vec![Category::Arr]);
    assert_eq!(categories(&outcome, &a, a_p), vec![Category::Arr]);
    assert_eq!(categories(&outcome, &b, b_p), vec![Category::Arr]);
}

#[test]
fn shared_header_declarator_is_one_entity() {
    let header = |b: &mut UnitBuilder| {
        b.in_file("shared.h");
        let g = b.global("buf", int_ptr(), 1);
        b.in_main_file();
        g
    };

    // a.c: void use_buf(void) { buf[2]; }
    let mut ab = UnitBuilder::new(UnitId(0), "a.c");
    let g = header(&mut ab);
    let r = ab.decl_ref(g);
    let two = ab.int(2);
    let sub = ab.subscript(r, two);
    ab.define_fn("use_buf", Type::void(), vec![], vec![Stmt::expr(sub)], 3);
    let a = ab.build();

    // b.c only sees the header.
    let mut bb = UnitBuilder::new(UnitId(1), "b.c");
    let g_in_b = header(&mut bb);
    let b = bb.build();

    assert_eq!(a.anchor(g), b.anchor(g_in_b));
    let outcome = run(&[a.clone(), b.clone()]);
    let reports = outcome.assignment.at(&b.anchor(g_in_b)).expect("indexed");
    assert_eq!(reports.len(), 1);
    assert_eq!(categories(&outcome, &b, g_in_b), vec![Category::Arr]);
}

#[test]
fn macro_declarations_are_wild() {
    let mut b = UnitBuilder::new(UnitId(0), "m.c");
    let q = b.global("q", Type::ptr(int_ptr()), 1);
    b.in_macro(q);
    let unit = b.build();

    let outcome = run(&[unit.clone()]);
    assert_eq!(
        categories(&outcome, &unit, q),
        vec![Category::Wild, Category::Wild]
    );
}

#[test]
fn macro_parameter_is_wild_after_a_full_run() {
    // void f(int *p) {}  where `p` comes from a macro expansion
    let mut b = UnitBuilder::new(UnitId(0), "m.c");
    let p = b.param("p", int_ptr(), 1);
    b.define_fn("f", Type::void(), vec![p], vec![], 1);
    b.in_macro(p);
    let unit = b.build();

    let outcome = run(&[unit.clone()]);
    assert_eq!(categories(&outcome, &unit, p), vec![Category::Wild]);
}

/// `int *ext(int *q);  void g(void) { int *x; ext(x); }`
fn extern_caller() -> (TranslationUnit, DeclId) {
    let mut b = UnitBuilder::new(UnitId(0), "e.c");
    let q = b.param("q", int_ptr(), 1);
    let ext = b.declare_fn("ext", int_ptr(), vec![q], 1);
    let x = b.local("x", int_ptr(), 3);
    let callee = b.decl_ref(ext);
    let arg = b.decl_ref(x);
    let call = b.call(callee, vec![arg]);
    b.define_fn(
        "g",
        Type::void(),
        vec![],
        vec![Stmt::decl(x), Stmt::expr(call)],
        2,
    );
    (b.build(), x)
}

#[test]
fn arguments_to_unresolved_externs_become_wild() {
    let (unit, x) = extern_caller();
    let outcome = run(&[unit.clone()]);
    assert_eq!(outcome.link.unresolved_externs, 1);
    assert_eq!(categories(&outcome, &unit, x), vec![Category::Wild]);
}

#[test]
fn allow_listed_externs_stay_safe() {
    let (unit, x) = extern_caller();
    let mut options = InferOptions::default();
    options.extern_allow_list.push("ext".to_string());
    let outcome = Pipeline::new(options).run(&[unit.clone()]);
    assert_eq!(outcome.link.unresolved_externs, 0);
    assert_eq!(categories(&outcome, &unit, x), vec![Category::Ptr]);
}

#[test]
fn string_literal_initializer_is_null_terminated() {
    let mut b = UnitBuilder::new(UnitId(0), "s.c");
    let s = b.global("greeting", char_ptr(), 1);
    let lit = b.string("hello");
    b.set_init(s, lit);
    let unit = b.build();

    let outcome = run(&[unit.clone()]);
    assert_eq!(categories(&outcome, &unit, s), vec![Category::NtArr]);
}

#[test]
fn incompatible_cast_makes_both_sides_wild() {
    // void h(void) { int *p; char *c; c = (char *)p; }
    let mut b = UnitBuilder::new(UnitId(0), "k.c");
    let p = b.local("p", int_ptr(), 2);
    let c = b.local("c", char_ptr(), 3);
    let lhs = b.decl_ref(c);
    let operand = b.decl_ref(p);
    let cast = b.cast(char_ptr(), operand);
    let assign = b.assign(lhs, cast);
    b.define_fn(
        "h",
        Type::void(),
        vec![],
        vec![Stmt::decl(p), Stmt::decl(c), Stmt::expr(assign)],
        1,
    );
    let unit = b.build();

    let outcome = run(&[unit.clone()]);
    assert_eq!(categories(&outcome, &unit, p), vec![Category::Wild]);
    assert_eq!(categories(&outcome, &unit, c), vec![Category::Wild]);
}

#[test]
fn linking_again_adds_nothing() {
    let (a, _) = declaring_unit(0, "a.c");
    let (b, _) = declaring_unit(1, "b.c");
    let mut pipeline = Pipeline::new(InferOptions::default());
    let first = pipeline.run(&[a, b]);
    assert!(first.link.new_constraints > 0);

    let mut info = pipeline.into_info();
    assert_eq!(info.link().new_constraints, 0);
}

#[test]
fn runs_are_deterministic() {
    let (a, _) = declaring_unit(1, "a.c");
    let (unit, _) = extern_caller();
    let first = run(&[a.clone(), unit.clone()]);
    let second = run(&[a, unit]);
    assert_eq!(first.assignment, second.assignment);
    assert_eq!(first.rounds, second.rounds);
}
