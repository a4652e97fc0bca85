//! Identifier newtypes shared between the solver and the inference core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a constraint variable stored in the inference core's arena.
///
/// Handles are allocated sequentially and never reused, so ordering by
/// `CVarId` is ordering by creation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CVarId(pub u32);

impl CVarId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of one translation unit handed over by the front end.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Key pairing a function's declarations with its definition across units.
///
/// Built from the file, line and name of one declaration of the function
/// (`file:line:name`). A definition and a prototype get different keys; the
/// function registries record how they correspond.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FuncKey(String);

impl FuncKey {
    pub fn new(file: &str, line: u32, name: &str) -> Self {
        FuncKey(format!("{file}:{line}:{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FuncKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
