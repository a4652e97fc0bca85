//! Reconciling function declarations with their definitions after solving.
//!
//! For `T1 -> T2 <: S1 -> S2` the declaration's parameters may be more
//! restrictive than the definition's only if they are raised to match
//! (contravariance), and the definition's return may be more restrictive than
//! the declaration's only if it is raised to match (covariance).

use crate::state::ProgramInfo;
use ptrsafe_common::{CVarId, FuncKey};
use ptrsafe_solver::{CVarSet, Category, Environment, VarAtom};
use tracing::{debug, trace};

impl ProgramInfo {
    /// Apply one round of subtyping repair against a solved environment.
    ///
    /// Returns whether some atom was raised above its category in `env`, in
    /// which case the caller should solve again and repeat. Every reported
    /// change raises an atom in a four-level lattice, so the loop ends.
    pub fn handle_function_subtyping(&mut self, env: &Environment) -> bool {
        let definitions: Vec<(FuncKey, CVarSet)> = self
            .cs
            .registry()
            .definitions()
            .map(|(key, set)| (key.clone(), set.clone()))
            .collect();

        let mut changed = false;
        for (key, defs) in definitions {
            let Some(def) = self.highest_var(&defs, env) else {
                continue;
            };
            for decl in self.declarations_for(&key, def) {
                if decl == def {
                    continue;
                }
                changed |= self.repair_pair(def, decl, env);
            }
        }
        debug!(changed, "function subtyping");
        changed
    }

    /// Declaration-side function variables paired with a definition: the
    /// same-unit prototype when one was recorded, otherwise every bodiless
    /// global declaration of the name together with the on-demand signature.
    fn declarations_for(&self, key: &FuncKey, def: CVarId) -> Vec<CVarId> {
        if let Some(decls) = self.cs.registry().declaration_for(key) {
            return decls.iter().copied().collect();
        }
        let mut decls: Vec<CVarId> = Vec::new();
        let name = self.vars.get(def).name();
        if let Some(globals) = self.global_symbols.get(name) {
            decls.extend(
                globals
                    .iter()
                    .copied()
                    .filter(|&v| self.vars.function(v).is_some_and(|f| !f.has_body)),
            );
        }
        if let Some(on_demand) = self.on_demand.get(key) {
            decls.extend(on_demand.iter().copied());
        }
        decls
    }

    fn repair_pair(&mut self, def: CVarId, decl: CVarId, env: &Environment) -> bool {
        let (Some(d), Some(p)) = (self.vars.function(def), self.vars.function(decl)) else {
            return false;
        };
        let (def_returns, decl_returns) = (d.returns.clone(), p.returns.clone());
        let params: Vec<(CVarSet, CVarSet)> = if d.params.len() == p.params.len() {
            d.params.iter().cloned().zip(p.params.iter().cloned()).collect()
        } else {
            Vec::new()
        };

        let mut changed = false;
        if let (Some(def_ret), Some(decl_ret)) = (
            self.highest_var(&def_returns, env),
            self.highest_var(&decl_returns, env),
        ) {
            if self.is_wild(def_ret, env) {
                changed |= self.raise(decl_ret, Category::least_safe(), env);
            } else if !self.is_wild(decl_ret, env) {
                if let (Some(def_cat), Some(decl_cat)) =
                    (self.category(def_ret, env), self.category(decl_ret, env))
                {
                    if env.is_lt(def_cat, decl_cat) {
                        changed |= self.raise(def_ret, decl_cat, env);
                    }
                }
            }
        }

        for (def_slot, decl_slot) in params {
            let (Some(def_param), Some(decl_param)) =
                (self.highest_var(&def_slot, env), self.highest_var(&decl_slot, env))
            else {
                continue;
            };
            if self.is_wild(def_param, env) || self.is_wild(decl_param, env) {
                continue;
            }
            let (Some(def_cat), Some(decl_cat)) =
                (self.category(def_param, env), self.category(decl_param, env))
            else {
                continue;
            };
            if env.is_lt(decl_cat, def_cat) {
                changed |= self.raise(decl_param, def_cat, env);
            }
        }
        changed
    }

    /// A pointer variable's own levels; every atom beneath anything else.
    fn own_atoms(&self, var: CVarId) -> Vec<VarAtom> {
        match self.vars.pointer(var) {
            Some(p) => p.atoms.to_vec(),
            None => self.atoms_of(var),
        }
    }

    /// Least safe category among a variable's own levels; `None` for a
    /// variable with no levels.
    fn category(&self, var: CVarId, env: &Environment) -> Option<Category> {
        env.highest(&self.own_atoms(var))
    }

    fn is_wild(&self, var: CVarId, env: &Environment) -> bool {
        env.has_wild(&self.own_atoms(var))
    }

    /// The member of `set` with the least safe category; the earliest created
    /// wins ties.
    fn highest_var(&self, set: &CVarSet, env: &Environment) -> Option<CVarId> {
        let mut best: Option<(CVarId, Option<Category>)> = None;
        for &v in set {
            let cat = self.category(v, env);
            if best.is_none_or(|(_, b)| cat > b) {
                best = Some((v, cat));
            }
        }
        best.map(|(v, _)| v)
    }

    /// Constrain every level of a pointer variable to at least `target`.
    /// Reports a change only if some level currently solves below it.
    fn raise(&mut self, var: CVarId, target: Category, env: &Environment) -> bool {
        let Some(p) = self.vars.pointer(var) else {
            return false;
        };
        let atoms = p.atoms.clone();
        let mut changed = false;
        for atom in atoms {
            if env.category_of(atom) < target {
                changed = true;
            }
            self.cs.eq_const(atom, target);
        }
        if changed {
            trace!(var = var.0, %target, "raised by subtyping repair");
        }
        changed
    }
}
