//! Equality constraints between constraint variables.

use crate::cvar::ConstraintVariable;
use crate::state::ProgramInfo;
use ptrsafe_common::CVarId;
use ptrsafe_solver::{CVarSet, Category};

impl ProgramInfo {
    /// Constrain every atom of `var` to at least `category`, recursing into
    /// attached functions and slots. Returns whether any constraint was new.
    pub fn constrain_to(&mut self, var: CVarId, category: Category) -> bool {
        let mut added = false;
        for atom in self.atoms_of(var) {
            added |= self.cs.eq_const(atom, category);
        }
        added
    }

    pub fn constrain_set_to(&mut self, set: &CVarSet, category: Category) -> bool {
        let mut added = false;
        for &var in set {
            added |= self.constrain_to(var, category);
        }
        added
    }

    /// Force two variables to solve to the same categories.
    ///
    /// - pointer/pointer: atoms are paired outermost first, up to the shorter
    ///   depth, and attached functions are linked
    /// - function/function: return sets are linked, and parameter slots when
    ///   the arities agree
    /// - pointer/function: the pointer's attached function is linked with the
    ///   function, or lacking one, the pointer with the function's returns
    pub fn constrain_eq(&mut self, a: CVarId, b: CVarId) {
        if a == b {
            return;
        }
        match (self.vars.get(a), self.vars.get(b)) {
            (ConstraintVariable::Pointer(p), ConstraintVariable::Pointer(q)) => {
                let pairs: Vec<_> = p.atoms.iter().copied().zip(q.atoms.iter().copied()).collect();
                let functions = p.function.zip(q.function);
                for (x, y) in pairs {
                    self.cs.eq_vars(x, y);
                }
                if let Some((f, g)) = functions {
                    self.constrain_eq(f, g);
                }
            }
            (ConstraintVariable::Function(f), ConstraintVariable::Function(g)) => {
                let returns = (f.returns.clone(), g.returns.clone());
                let params = (f.params.len() == g.params.len())
                    .then(|| (f.params.clone(), g.params.clone()));
                self.constrain_eq_sets(&returns.0, &returns.1);
                if let Some((fp, gp)) = params {
                    for (x, y) in fp.iter().zip(&gp) {
                        self.constrain_eq_sets(x, y);
                    }
                }
            }
            (ConstraintVariable::Pointer(p), ConstraintVariable::Function(_)) => {
                let attached = p.function;
                self.link_pointer_with_function(a, attached, b);
            }
            (ConstraintVariable::Function(_), ConstraintVariable::Pointer(q)) => {
                let attached = q.function;
                self.link_pointer_with_function(b, attached, a);
            }
        }
    }

    fn link_pointer_with_function(
        &mut self,
        pointer: CVarId,
        attached: Option<CVarId>,
        function: CVarId,
    ) {
        match attached {
            Some(attached) => self.constrain_eq(attached, function),
            None => {
                let returns = self
                    .vars
                    .function(function)
                    .map(|f| f.returns.clone())
                    .unwrap_or_default();
                for r in returns {
                    self.constrain_eq(pointer, r);
                }
            }
        }
    }

    /// Equate every member of `a` with every member of `b`.
    pub fn constrain_eq_sets(&mut self, a: &CVarSet, b: &CVarSet) {
        for &x in a {
            for &y in b {
                self.constrain_eq(x, y);
            }
        }
    }
}
