use crate::{Anchor, CVarId, FuncKey};
use std::collections::BTreeSet;

#[test]
fn anchors_order_by_file_then_line_then_column() {
    let mut set = BTreeSet::new();
    set.insert(Anchor::new("b.c", 1, 1));
    set.insert(Anchor::new("a.c", 9, 3));
    set.insert(Anchor::new("a.c", 9, 1));
    set.insert(Anchor::new("a.c", 2, 40));

    let ordered: Vec<_> = set.into_iter().collect();
    assert_eq!(
        ordered,
        vec![
            Anchor::new("a.c", 2, 40),
            Anchor::new("a.c", 9, 1),
            Anchor::new("a.c", 9, 3),
            Anchor::new("b.c", 1, 1),
        ]
    );
}

#[test]
fn anchor_displays_its_position() {
    let anchor = Anchor::new("util.h", 12, 7);
    assert!(anchor.is_valid());
    assert_eq!(anchor.to_string(), "util.h:12:7");
}

#[test]
fn anchor_without_file_is_invalid() {
    assert!(!Anchor::new("", 3, 1).is_valid());
    assert!(!Anchor::new("x.c", 0, 1).is_valid());
}

#[test]
fn func_key_formats_file_line_and_name() {
    let key = FuncKey::new("lib.c", 40, "strcpy");
    assert_eq!(key.as_str(), "lib.c:40:strcpy");
}

#[test]
fn cvar_ids_order_by_allocation() {
    assert!(CVarId(1) < CVarId(2));
    assert_eq!(CVarId(7).index(), 7);
}
