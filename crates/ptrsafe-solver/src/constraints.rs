//! Equality constraints and the Union-Find table that solves them.

use crate::atoms::{AtomValue, Category, VarAtom};
use crate::environment::Environment;
use crate::registry::FunctionRegistry;
use ena::unify::InPlaceUnificationTable;
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use tracing::trace;

/// An equality constraint.
///
/// `EqConst` is read as a lower bound: an atom equated with `Arr` solves to
/// `Arr` or anything less safe that it is also equated with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Constraint {
    EqVars(VarAtom, VarAtom),
    EqConst(VarAtom, Category),
}

impl Constraint {
    /// Canonical form, so `a = b` and `b = a` are recognised as one constraint.
    fn normalized(self) -> Constraint {
        match self {
            Constraint::EqVars(a, b) if b < a => Constraint::EqVars(b, a),
            other => other,
        }
    }
}

/// The constraint store.
pub struct ConstraintSystem {
    table: InPlaceUnificationTable<VarAtom>,
    constraints: IndexSet<Constraint, FxBuildHasher>,
    registry: FunctionRegistry,
}

impl Default for ConstraintSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintSystem {
    pub fn new() -> Self {
        ConstraintSystem {
            table: InPlaceUnificationTable::new(),
            constraints: IndexSet::default(),
            registry: FunctionRegistry::default(),
        }
    }

    /// Allocate a fresh, unconstrained atom.
    pub fn fresh_var(&mut self) -> VarAtom {
        self.table.new_key(AtomValue(Category::most_safe()))
    }

    pub fn num_vars(&self) -> usize {
        self.table.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Record a constraint. Returns `false` when it was already present.
    pub fn add_constraint(&mut self, constraint: Constraint) -> bool {
        let constraint = constraint.normalized();
        if let Constraint::EqVars(a, b) = constraint {
            if a == b {
                return false;
            }
        }
        if !self.constraints.insert(constraint) {
            return false;
        }
        trace!(?constraint, "add constraint");
        match constraint {
            Constraint::EqVars(a, b) => self.table.union(a, b),
            Constraint::EqConst(a, c) => self.table.union_value(a, AtomValue(c)),
        }
        true
    }

    pub fn eq_vars(&mut self, a: VarAtom, b: VarAtom) -> bool {
        self.add_constraint(Constraint::EqVars(a, b))
    }

    pub fn eq_const(&mut self, a: VarAtom, c: Category) -> bool {
        self.add_constraint(Constraint::EqConst(a, c))
    }

    /// Snapshot the current assignment of every atom.
    pub fn solve(&mut self) -> Environment {
        let values = (0..self.table.len() as u32)
            .map(|i| self.table.probe_value(VarAtom(i)).0)
            .collect();
        Environment::new(values)
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }
}
