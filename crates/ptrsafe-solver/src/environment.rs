//! Solved atom-to-category assignment.

use crate::atoms::{Category, VarAtom};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    values: Vec<Category>,
}

impl Environment {
    pub(crate) fn new(values: Vec<Category>) -> Self {
        Environment { values }
    }

    /// Category of an atom. Atoms allocated after the snapshot was taken are
    /// unconstrained as far as this environment knows.
    pub fn category_of(&self, atom: VarAtom) -> Category {
        self.values
            .get(atom.0 as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Whether any of the atoms solved to the least-safe category.
    pub fn has_wild<'a>(&self, atoms: impl IntoIterator<Item = &'a VarAtom>) -> bool {
        atoms
            .into_iter()
            .any(|&a| self.category_of(a) == Category::least_safe())
    }

    /// Least safe category among the atoms, `None` for an empty sequence.
    pub fn highest<'a>(&self, atoms: impl IntoIterator<Item = &'a VarAtom>) -> Option<Category> {
        atoms.into_iter().map(|&a| self.category_of(a)).max()
    }

    /// Strict lattice order: `a` is more restrictive than `b`.
    pub fn is_lt(&self, a: Category, b: Category) -> bool {
        a < b
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of atoms in each category, in lattice order.
    pub fn counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for &c in &self.values {
            counts[c as usize] += 1;
        }
        counts
    }
}
