//! Knobs of the inference core.

use ptrsafe_common::limits::{DEFAULT_EXTERN_ALLOW_LIST, MAX_REPAIR_ITERATIONS};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferOptions {
    /// Equate the signatures of bodiless declarations sharing a name.
    pub merge_multiple_func_decls: bool,
    /// Bodiless externs that are not forced to the least-safe category.
    pub extern_allow_list: Vec<String>,
    /// Upper bound on solve/repair rounds.
    pub max_repair_iterations: u32,
}

impl Default for InferOptions {
    fn default() -> Self {
        InferOptions {
            merge_multiple_func_decls: true,
            extern_allow_list: DEFAULT_EXTERN_ALLOW_LIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_repair_iterations: MAX_REPAIR_ITERATIONS,
        }
    }
}

impl InferOptions {
    pub fn is_extern_allowed(&self, name: &str) -> bool {
        self.extern_allow_list.iter().any(|n| n == name)
    }
}
