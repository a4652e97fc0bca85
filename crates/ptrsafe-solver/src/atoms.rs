//! Atoms and the safety lattice.

use ena::unify::{NoError, UnifyKey, UnifyValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A solver variable standing for the category of one pointer level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarAtom(pub u32);

/// Pointer-safety category.
///
/// Declaration order is the lattice order: `Ptr` is the most restrictive
/// (safest) and `Wild` the least safe. `Ord` therefore answers "is strictly
/// more restrictive than" with `<`.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Single-object checked pointer.
    #[default]
    Ptr,
    /// Checked array pointer with bounds.
    Arr,
    /// Checked null-terminated array pointer.
    NtArr,
    /// Unchecked pointer.
    Wild,
}

impl Category {
    pub const fn least_safe() -> Category {
        Category::Wild
    }

    pub const fn most_safe() -> Category {
        Category::Ptr
    }

    pub fn join(self, other: Category) -> Category {
        self.max(other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Ptr => "PTR",
            Category::Arr => "ARR",
            Category::NtArr => "NTARR",
            Category::Wild => "WILD",
        })
    }
}

/// Lower bound carried by an equivalence class of atoms.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AtomValue(pub Category);

impl UnifyKey for VarAtom {
    type Value = AtomValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        VarAtom(u)
    }

    fn tag() -> &'static str {
        "VarAtom"
    }
}

impl UnifyValue for AtomValue {
    type Error = NoError;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, Self::Error> {
        Ok(AtomValue(a.0.join(b.0)))
    }
}
