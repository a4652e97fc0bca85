use crate::{LoadError, Type, UnitBuilder, load_unit};
use ptrsafe_common::UnitId;
use std::io::Write;

fn sample_unit() -> crate::TranslationUnit {
    let mut b = UnitBuilder::new(UnitId(3), "m.c");
    let p = b.param("p", Type::ptr(Type::int()), 1);
    let pr = b.decl_ref(p);
    let three = b.int(3);
    let sub = b.subscript(pr, three);
    b.define_fn("f", Type::void(), vec![p], vec![crate::Stmt::expr(sub)], 1);
    b.build()
}

#[test]
fn unit_survives_a_json_file() {
    let unit = sample_unit();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    let text = serde_json::to_string_pretty(&unit).expect("serialize");
    file.write_all(text.as_bytes()).expect("write");

    let loaded = load_unit(file.path()).expect("load");
    assert_eq!(loaded.id, UnitId(3));
    assert_eq!(loaded.decls, unit.decls);
    assert_eq!(loaded.exprs, unit.exprs);
    assert_eq!(loaded.top_level, unit.top_level);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(b"{ \"file\": 12 }").expect("write");
    let err = load_unit(file.path()).expect_err("must fail");
    assert!(matches!(err, LoadError::Parse { .. }), "got {err}");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = load_unit(&dir.path().join("absent.json")).expect_err("must fail");
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn dangling_expression_ids_are_rejected() {
    let mut unit = sample_unit();
    unit.exprs.truncate(1);
    let err = unit.validate().expect_err("must fail");
    assert!(matches!(err, LoadError::DanglingExpr { .. }));
}

#[test]
fn self_referencing_expression_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    let text = r#"{
        "file": "loop.c",
        "decls": [{
            "name": "g",
            "loc": { "file": "loop.c", "line": 1, "column": 1 },
            "kind": { "kind": "var", "ty": { "pointer": { "builtin": "int" } }, "is_global": true, "init": 0 }
        }],
        "exprs": [{ "expr": "paren", "inner": 0 }],
        "top_level": [0]
    }"#;
    file.write_all(text.as_bytes()).expect("write");

    let err = load_unit(file.path()).expect_err("must fail");
    assert!(matches!(err, LoadError::CyclicExpr { expr: 0, .. }), "got {err}");
}

#[test]
fn operand_must_precede_its_user() {
    let mut unit = sample_unit();
    // Point the reference at the subscript that uses it: 2 -> 0 -> 2.
    unit.exprs[0] = crate::Expr::Paren {
        inner: crate::ExprId(2),
    };
    let err = unit.validate().expect_err("must fail");
    assert!(matches!(err, LoadError::CyclicExpr { expr: 0, .. }), "got {err}");
}

#[test]
fn shared_operand_is_rejected() {
    let mut b = UnitBuilder::new(UnitId(0), "s.c");
    let g = b.global("g", Type::ptr(Type::int()), 1);
    let r = b.decl_ref(g);
    let add = b.binary(crate::BinaryOp::Add, r, r);
    b.set_init(g, add);
    let unit = b.build();

    let err = unit.validate().expect_err("must fail");
    assert!(matches!(err, LoadError::SharedExpr { expr: 0, .. }), "got {err}");
}

#[test]
fn dangling_local_inside_a_block_is_rejected() {
    let mut unit = sample_unit();
    let inner = crate::Stmt::block(vec![crate::Stmt::decl(crate::DeclId(9))]);
    if let crate::DeclKind::Function { body: Some(body), .. } = &mut unit.decls[1].kind {
        body.push(crate::Stmt::block(vec![inner]));
    }
    let err = unit.validate().expect_err("must fail");
    assert!(matches!(err, LoadError::DanglingDecl { decl: 9, .. }), "got {err}");
}
