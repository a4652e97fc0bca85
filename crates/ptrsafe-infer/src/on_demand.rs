//! Signatures manufactured for functions with no separate prototype.
//!
//! A declaration-context lookup must find a function variable even when the
//! only declaration of a function is its definition. The cache synthesizes one
//! per definition key; it is never indexed at an anchor, so it stays distinct
//! from the definition's own variable until repair reconciles the two.

use crate::create::func_key;
use crate::state::ProgramInfo;
use ptrsafe_ast::{DeclId, TranslationUnit};
use ptrsafe_solver::CVarSet;
use tracing::trace;

impl ProgramInfo {
    /// Get or create the on-demand declaration of `func`.
    pub fn on_demand_declaration(&mut self, unit: &TranslationUnit, func: DeclId) -> CVarSet {
        self.assert_open(unit);
        let key = func_key(unit, func);
        if let Some(existing) = self.on_demand.get(&key) {
            return existing.clone();
        }
        let target = unit.definition_of(func).unwrap_or(func);
        let fv = self.new_function_variable(unit, target);
        trace!(%key, "on-demand declaration");
        self.cs.registry_mut().add_declaration(key.clone(), fv);
        let set = CVarSet::from([fv]);
        self.on_demand.insert(key, set.clone());
        set
    }
}
