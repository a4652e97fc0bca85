//! Source anchors.
//!
//! An [`Anchor`] is the persistent identity of a declaration: the file, line
//! and column of its name. Two visits of the same header from different
//! translation units produce equal anchors, which is what lets the inference
//! core treat them as one entity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, totally ordered key for a declaration's source position: the
/// file, line and column of its name, as reported by the front end.
///
/// Ordering is file, then line, then column, so iteration over an
/// anchor-keyed `BTreeMap` walks each file top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Anchor {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Anchor {
            file: file.into(),
            line,
            column,
        }
    }

    /// An anchor is valid when it names a file and a real (1-based) line.
    pub fn is_valid(&self) -> bool {
        !self.file.is_empty() && self.line > 0
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
