//! Serializable snapshot of the solved categories, keyed by anchor.

use crate::cvar::ConstraintVariable;
use crate::state::ProgramInfo;
use ptrsafe_common::{Anchor, CVarId, FuncKey};
use ptrsafe_solver::{Category, Environment};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub variables: Vec<AnchorEntry>,
    pub on_demand: Vec<OnDemandEntry>,
    /// Atom counts per category, in lattice order.
    pub counts: CategoryCounts,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnchorEntry {
    pub anchor: Anchor,
    pub variables: Vec<VariableReport>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OnDemandEntry {
    pub key: FuncKey,
    pub variables: Vec<VariableReport>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    pub ptr: usize,
    pub arr: usize,
    pub nt_arr: usize,
    pub wild: usize,
}

/// One constraint variable with the categories of its levels.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableReport {
    Pointer {
        name: String,
        base_type: String,
        /// Outermost level first.
        categories: Vec<Category>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        is_array: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        itype: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        function: Option<Box<VariableReport>>,
    },
    Function {
        name: String,
        returns: Vec<VariableReport>,
        params: Vec<Vec<VariableReport>>,
        has_body: bool,
    },
}

impl VariableReport {
    /// Categories of a pointer report; empty for functions.
    pub fn categories(&self) -> &[Category] {
        match self {
            VariableReport::Pointer { categories, .. } => categories,
            VariableReport::Function { .. } => &[],
        }
    }
}

impl ProgramInfo {
    /// Snapshot every indexed and on-demand variable under `env`.
    pub fn assignment(&self, env: &Environment) -> Assignment {
        let variables = self
            .variables
            .iter()
            .map(|(anchor, set)| AnchorEntry {
                anchor: anchor.clone(),
                variables: set.iter().map(|&v| self.report(v, env)).collect(),
            })
            .collect();
        let on_demand = self
            .on_demand
            .iter()
            .map(|(key, set)| OnDemandEntry {
                key: key.clone(),
                variables: set.iter().map(|&v| self.report(v, env)).collect(),
            })
            .collect();
        let [ptr, arr, nt_arr, wild] = env.counts();
        Assignment {
            variables,
            on_demand,
            counts: CategoryCounts {
                ptr,
                arr,
                nt_arr,
                wild,
            },
        }
    }

    fn report(&self, var: CVarId, env: &Environment) -> VariableReport {
        match self.vars.get(var) {
            ConstraintVariable::Pointer(p) => VariableReport::Pointer {
                name: p.name.clone(),
                base_type: p.base_type.clone(),
                categories: p.atoms.iter().map(|&a| env.category_of(a)).collect(),
                is_array: p.is_array,
                itype: p.itype.clone(),
                function: p.function.map(|f| Box::new(self.report(f, env))),
            },
            ConstraintVariable::Function(f) => VariableReport::Function {
                name: f.name.clone(),
                returns: f.returns.iter().map(|&r| self.report(r, env)).collect(),
                params: f
                    .params
                    .iter()
                    .map(|slot| slot.iter().map(|&p| self.report(p, env)).collect())
                    .collect(),
                has_body: f.has_body,
            },
        }
    }
}

impl Assignment {
    /// Variables recorded at `anchor`.
    pub fn at(&self, anchor: &Anchor) -> Option<&[VariableReport]> {
        self.variables
            .binary_search_by(|e| e.anchor.cmp(anchor))
            .ok()
            .map(|i| self.variables[i].variables.as_slice())
    }
}
