//! Fixtures shared by the inference tests.

use crate::{ConstraintBuilder, ProgramInfo};
use ptrsafe_ast::{DeclId, TranslationUnit};
use ptrsafe_common::CVarId;
use ptrsafe_solver::{CVarSet, Category, Environment};

/// Pass 1 for one unit: add every declarator and note functions for linking.
pub(crate) fn add_unit(info: &mut ProgramInfo, unit: &TranslationUnit) {
    info.enter_compilation_unit(unit);
    for decl in unit.declarators() {
        info.add_variable(unit, decl);
        if unit.decl(decl).is_function() {
            info.see_function_decl(unit, decl);
        }
    }
    info.exit_compilation_unit();
}

/// Pass 2 for one unit.
pub(crate) fn constrain_unit(info: &mut ProgramInfo, unit: &TranslationUnit) {
    info.enter_compilation_unit(unit);
    ConstraintBuilder::new(info, unit).build();
    info.exit_compilation_unit();
}

/// Both passes over every unit, then link.
pub(crate) fn analyze(info: &mut ProgramInfo, units: &[&TranslationUnit]) {
    for unit in units {
        add_unit(info, unit);
    }
    for unit in units {
        constrain_unit(info, unit);
    }
    info.link();
}

/// Solve and repair until repair reports no change.
pub(crate) fn solve_to_fixpoint(info: &mut ProgramInfo) -> Environment {
    for _ in 0..64 {
        let env = info.solve();
        if !info.handle_function_subtyping(&env) {
            return env;
        }
    }
    panic!("repair did not converge");
}

/// The single variable of the given kind stored at a declaration's anchor.
pub(crate) fn var_at(
    info: &ProgramInfo,
    unit: &TranslationUnit,
    decl: DeclId,
    function: bool,
) -> CVarId {
    let set = info
        .variables_at(&unit.anchor(decl))
        .unwrap_or_else(|| panic!("nothing indexed for '{}'", unit.decl(decl).name));
    set.iter()
        .copied()
        .find(|&v| info.arena().function(v).is_some() == function)
        .unwrap_or_else(|| panic!("no matching variable for '{}'", unit.decl(decl).name))
}

/// Categories of a pointer variable's levels.
pub(crate) fn levels(info: &ProgramInfo, env: &Environment, var: CVarId) -> Vec<Category> {
    info.arena()
        .pointer(var)
        .map(|p| p.atoms.iter().map(|&a| env.category_of(a)).collect())
        .unwrap_or_default()
}

/// Categories of every atom under every variable of a set.
pub(crate) fn set_levels(info: &ProgramInfo, env: &Environment, set: &CVarSet) -> Vec<Category> {
    set.iter()
        .flat_map(|&v| info.atoms_of(v))
        .map(|a| env.category_of(a))
        .collect()
}

/// Parameter slot `index` of a function variable.
pub(crate) fn param_slot(info: &ProgramInfo, fv: CVarId, index: usize) -> CVarSet {
    info.arena()
        .function(fv)
        .and_then(|f| f.params.get(index).cloned())
        .unwrap_or_default()
}

pub(crate) fn returns(info: &ProgramInfo, fv: CVarId) -> CVarSet {
    info.arena()
        .function(fv)
        .map(|f| f.returns.clone())
        .unwrap_or_default()
}
