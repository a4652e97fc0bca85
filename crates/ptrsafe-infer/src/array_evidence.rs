//! Per-unit evidence that a declaration is used as an array.
//!
//! The constraint builder flags declarations assigned from a sized allocation
//! and remembers the expressions that describe the element count. Entries are
//! keyed by `DeclId`, so they are only meaningful while their unit is open.

use crate::state::ProgramInfo;
use indexmap::{IndexMap, IndexSet};
use ptrsafe_ast::{DeclId, ExprId, TranslationUnit};
use rustc_hash::FxBuildHasher;
use tracing::trace;

#[derive(Debug, Default)]
pub(crate) struct ArrayEvidence {
    candidates: IndexSet<DeclId, FxBuildHasher>,
    size_exprs: IndexMap<DeclId, IndexSet<ExprId, FxBuildHasher>, FxBuildHasher>,
}

impl ArrayEvidence {
    pub(crate) fn len(&self) -> usize {
        self.candidates.len()
    }
}

impl ProgramInfo {
    pub fn insert_potential_array_var(&mut self, unit: &TranslationUnit, decl: DeclId) {
        trace!(name = %unit.decl(decl).name, "array candidate");
        self.open_unit_mut(unit).evidence.candidates.insert(decl);
    }

    pub fn is_identified_array_var(&self, unit: &TranslationUnit, decl: DeclId) -> bool {
        self.open_unit(unit).evidence.candidates.contains(&decl)
    }

    /// Record `size` as a plausible element count for `decl`.
    ///
    /// Panics unless `decl` was first flagged with
    /// [`insert_potential_array_var`](Self::insert_potential_array_var).
    pub fn add_allocation_based_size_expr(
        &mut self,
        unit: &TranslationUnit,
        decl: DeclId,
        size: ExprId,
    ) {
        let evidence = &mut self.open_unit_mut(unit).evidence;
        assert!(
            evidence.candidates.contains(&decl),
            "size expression recorded for '{}', which is not an array candidate",
            unit.decl(decl).name
        );
        evidence.size_exprs.entry(decl).or_default().insert(size);
    }

    /// Every candidate with the size expressions seen for it, in the order
    /// candidates were found.
    pub fn array_vars_and_sizes(&self, unit: &TranslationUnit) -> Vec<(DeclId, Vec<ExprId>)> {
        let evidence = &self.open_unit(unit).evidence;
        evidence
            .candidates
            .iter()
            .map(|&decl| {
                let sizes = evidence
                    .size_exprs
                    .get(&decl)
                    .map(|s| s.iter().copied().collect())
                    .unwrap_or_default();
                (decl, sizes)
            })
            .collect()
    }
}
