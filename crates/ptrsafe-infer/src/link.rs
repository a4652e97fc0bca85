//! Cross-unit linking.

use crate::state::ProgramInfo;
use ptrsafe_ast::{Type, structurally_equal};
use ptrsafe_common::CVarId;
use ptrsafe_solver::{CVarSet, Category};
use tracing::{debug, warn};

/// What one [`ProgramInfo::link`] run did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Anchors holding more than one variable.
    pub shared_anchors: usize,
    /// Pairs of bodiless declarations equated.
    pub merged_declarations: usize,
    /// Declaration pairs forced wild because their arities disagree.
    pub arity_mismatches: usize,
    /// Bodiless externs outside the allow-list.
    pub unresolved_externs: usize,
    /// Constraints added by this run; zero once linking is saturated.
    pub new_constraints: usize,
}

impl ProgramInfo {
    /// Link variables across every unit seen so far.
    ///
    /// 1. Variables sharing an anchor are chained equal.
    /// 2. Bodiless declarations of one global function are chained equal
    ///    (when `merge_multiple_func_decls` is set); arity mismatches between
    ///    prototyped declarations force both wild.
    /// 3. Functions whose body was never seen are forced wild unless
    ///    allow-listed.
    ///
    /// Call with no unit open. Running it again adds nothing.
    pub fn link(&mut self) -> LinkStats {
        assert!(!self.is_unit_open(), "link called while a unit is still open");
        let before = self.cs.num_constraints();
        let mut stats = LinkStats::default();

        let shared: Vec<Vec<CVarId>> = self
            .variables
            .values()
            .filter(|set| set.len() > 1)
            .map(|set| set.iter().copied().collect())
            .collect();
        stats.shared_anchors = shared.len();
        for chain in shared {
            for pair in chain.windows(2) {
                self.constrain_eq(pair[0], pair[1]);
            }
        }

        if self.options.merge_multiple_func_decls {
            let groups: Vec<Vec<CVarId>> = self
                .global_symbols
                .values()
                .map(|set| {
                    set.iter()
                        .copied()
                        .filter(|&v| self.vars.function(v).is_some_and(|f| !f.has_body))
                        .collect()
                })
                .collect();
            for group in groups {
                for pair in group.windows(2) {
                    if self.link_declarations(pair[0], pair[1]) {
                        stats.merged_declarations += 1;
                    } else {
                        stats.arity_mismatches += 1;
                    }
                }
            }
        }

        let unresolved: Vec<String> = self
            .extern_functions
            .iter()
            .filter(|(name, seen)| !**seen && !self.options.is_extern_allowed(name))
            .map(|(name, _)| name.clone())
            .collect();
        stats.unresolved_externs = unresolved.len();
        for name in unresolved {
            let functions = self.global_symbols.get(&name).cloned().unwrap_or_default();
            debug!(name = %name, variants = functions.len(), "no body seen; forcing wild");
            for fv in functions {
                self.constrain_signature_to(fv, Category::least_safe());
            }
        }

        stats.new_constraints = self.cs.num_constraints() - before;
        debug!(?stats, "linked");
        stats
    }

    /// Equate two bodiless declarations. Returns `false` when their arities
    /// could not be reconciled.
    fn link_declarations(&mut self, a: CVarId, b: CVarId) -> bool {
        let (Some(f), Some(g)) = (self.vars.function(a), self.vars.function(b)) else {
            return true;
        };
        if let (Some(x), Some(y)) = (&f.signature, &g.signature) {
            let (x, y) = (Type::Function(x.clone()), Type::Function(y.clone()));
            if !structurally_equal(&x, &y) {
                warn!(
                    name = %f.name,
                    first = %x,
                    second = %y,
                    "declarations disagree; equating anyway"
                );
            }
        }
        let returns = (f.returns.clone(), g.returns.clone());
        let same_arity = f.params.len() == g.params.len();
        let both_prototyped = f.has_prototype && g.has_prototype;
        let params = (f.params.clone(), g.params.clone());

        self.constrain_eq_sets(&returns.0, &returns.1);
        if same_arity {
            for (x, y) in params.0.iter().zip(&params.1) {
                self.constrain_eq_sets(x, y);
            }
            true
        } else if both_prototyped {
            debug!(a = a.0, b = b.0, "arity mismatch between declarations; forcing wild");
            self.constrain_signature_to(a, Category::least_safe());
            self.constrain_signature_to(b, Category::least_safe());
            false
        } else {
            true
        }
    }

    /// Constrain the return and parameter variables of a function variable.
    fn constrain_signature_to(&mut self, fv: CVarId, category: Category) {
        let Some(f) = self.vars.function(fv) else {
            return;
        };
        let mut slots: Vec<CVarSet> = vec![f.returns.clone()];
        slots.extend(f.params.iter().cloned());
        for slot in &slots {
            self.constrain_set_to(slot, category);
        }
    }
}
