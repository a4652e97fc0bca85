//! The analysis session.
//!
//! [`ProgramInfo`] owns every table that outlives a translation unit: the
//! declaration Index, the Global Symbol Table, the Extern Table, the
//! On-Demand Cache and the constraint system. State that refers into one
//! unit's arenas lives in [`OpenUnit`] and is dropped when the unit closes.

use crate::array_evidence::ArrayEvidence;
use crate::cvar::{CVarArena, ConstraintVariable};
use crate::options::InferOptions;
use ptrsafe_ast::{ExprId, TranslationUnit};
use ptrsafe_common::{Anchor, CVarId, FuncKey, UnitId};
use ptrsafe_solver::{CVarSet, ConstraintSystem, Environment, VarAtom};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::debug;

/// Transient state of the translation unit currently being visited.
#[derive(Debug)]
pub(crate) struct OpenUnit {
    pub(crate) id: UnitId,
    pub(crate) file: String,
    pub(crate) evidence: ArrayEvidence,
    /// Variable synthesized for each string literal resolved so far.
    pub(crate) literals: FxHashMap<ExprId, CVarId>,
    /// Empty signatures synthesized for calls with no identifiable target.
    pub(crate) placeholders: FxHashMap<ExprId, CVarId>,
}

pub struct ProgramInfo {
    pub(crate) options: InferOptions,
    pub(crate) cs: ConstraintSystem,
    pub(crate) vars: CVarArena,
    /// Declaration Index.
    pub(crate) variables: BTreeMap<Anchor, CVarSet>,
    /// External function name to every Function variant seen for it.
    pub(crate) global_symbols: BTreeMap<String, CVarSet>,
    /// External function name to whether a body was seen in any unit.
    pub(crate) extern_functions: BTreeMap<String, bool>,
    pub(crate) on_demand: BTreeMap<FuncKey, CVarSet>,
    /// One-level-stripped variant of a pointer variable, `None` when nothing
    /// would remain.
    pub(crate) derived: FxHashMap<CVarId, Option<CVarId>>,
    pub(crate) open: Option<OpenUnit>,
}

impl Default for ProgramInfo {
    fn default() -> Self {
        Self::new(InferOptions::default())
    }
}

impl ProgramInfo {
    pub fn new(options: InferOptions) -> Self {
        ProgramInfo {
            options,
            cs: ConstraintSystem::new(),
            vars: CVarArena::default(),
            variables: BTreeMap::new(),
            global_symbols: BTreeMap::new(),
            extern_functions: BTreeMap::new(),
            on_demand: BTreeMap::new(),
            derived: FxHashMap::default(),
            open: None,
        }
    }

    // =========================================================================
    // Unit lifecycle
    // =========================================================================

    /// Start visiting `unit`.
    ///
    /// Panics if another unit is still open.
    pub fn enter_compilation_unit(&mut self, unit: &TranslationUnit) {
        if let Some(open) = &self.open {
            panic!(
                "cannot enter unit '{}' while unit '{}' is still open",
                unit.file, open.file
            );
        }
        debug!(file = %unit.file, unit = unit.id.0, "enter compilation unit");
        self.open = Some(OpenUnit {
            id: unit.id,
            file: unit.file.clone(),
            evidence: ArrayEvidence::default(),
            literals: FxHashMap::default(),
            placeholders: FxHashMap::default(),
        });
    }

    /// Finish the open unit, dropping everything that refers into it.
    ///
    /// Panics if no unit is open.
    pub fn exit_compilation_unit(&mut self) {
        let Some(open) = self.open.take() else {
            panic!("exit_compilation_unit called with no open unit");
        };
        debug!(
            file = %open.file,
            array_candidates = open.evidence.len(),
            literals = open.literals.len(),
            "exit compilation unit"
        );
    }

    pub fn is_unit_open(&self) -> bool {
        self.open.is_some()
    }

    pub(crate) fn assert_open(&self, unit: &TranslationUnit) {
        self.open_unit(unit);
    }

    /// The open unit's transient state; panics unless `unit` is the open unit.
    pub(crate) fn open_unit(&self, unit: &TranslationUnit) -> &OpenUnit {
        match &self.open {
            Some(open) if open.id == unit.id && open.file == unit.file => open,
            other => wrong_unit(unit, other.as_ref()),
        }
    }

    pub(crate) fn open_unit_mut(&mut self, unit: &TranslationUnit) -> &mut OpenUnit {
        if !matches!(&self.open, Some(open) if open.id == unit.id && open.file == unit.file) {
            wrong_unit(unit, self.open.as_ref());
        }
        let Some(open) = self.open.as_mut() else {
            panic!("unit '{}' used while no unit is open", unit.file);
        };
        open
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn options(&self) -> &InferOptions {
        &self.options
    }

    pub fn constraints(&self) -> &ConstraintSystem {
        &self.cs
    }

    pub fn constraints_mut(&mut self) -> &mut ConstraintSystem {
        &mut self.cs
    }

    pub fn var(&self, id: CVarId) -> &ConstraintVariable {
        self.vars.get(id)
    }

    pub fn arena(&self) -> &CVarArena {
        &self.vars
    }

    /// The whole Index, in anchor order.
    pub fn variables(&self) -> &BTreeMap<Anchor, CVarSet> {
        &self.variables
    }

    pub fn variables_at(&self, anchor: &Anchor) -> Option<&CVarSet> {
        self.variables.get(anchor)
    }

    pub fn global_symbol(&self, name: &str) -> Option<&CVarSet> {
        self.global_symbols.get(name)
    }

    /// `Some(true)` once a body for `name` has been seen in any unit.
    pub fn extern_body_seen(&self, name: &str) -> Option<bool> {
        self.extern_functions.get(name).copied()
    }

    pub fn on_demand_entries(&self) -> impl Iterator<Item = (&FuncKey, &CVarSet)> {
        self.on_demand.iter()
    }

    /// Every atom a variable owns, transitively.
    pub fn atoms_of(&self, id: CVarId) -> Vec<VarAtom> {
        let mut out = Vec::new();
        self.vars.collect_atoms(id, &mut out);
        out
    }

    pub fn solve(&mut self) -> Environment {
        self.cs.solve()
    }
}

fn wrong_unit(unit: &TranslationUnit, open: Option<&OpenUnit>) -> ! {
    match open {
        Some(open) => panic!(
            "unit '{}' used while unit '{}' is open",
            unit.file, open.file
        ),
        None => panic!("unit '{}' used while no unit is open", unit.file),
    }
}
