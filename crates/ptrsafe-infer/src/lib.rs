//! Pointer-safety inference core.
//!
//! [`ProgramInfo`] is the analysis session. Translation units are visited one
//! at a time between [`ProgramInfo::enter_compilation_unit`] and
//! [`ProgramInfo::exit_compilation_unit`]:
//!
//! - **Index**: [`ProgramInfo::add_variable`] gives each pointer- or
//!   function-typed declarator its constraint variables, keyed by anchor
//! - **Constraints**: [`ConstraintBuilder`] walks bodies and initializers,
//!   resolving expressions ([`ProgramInfo::resolve_expr`]) and declarations
//!   ([`ProgramInfo::lookup`]) to variables and equating them
//! - **Linking**: [`ProgramInfo::link`] merges same-symbol variables across
//!   units and closes unresolved externs
//! - **Repair**: after solving, [`ProgramInfo::handle_function_subtyping`]
//!   reconciles declarations with definitions until nothing changes

mod array_evidence;
mod assignment;
mod builder;
mod constrain;
mod create;
mod cvar;
mod error;
mod expr;
mod link;
mod lookup;
mod on_demand;
mod options;
mod state;
mod subtyping;

pub use assignment::{AnchorEntry, Assignment, CategoryCounts, OnDemandEntry, VariableReport};
pub use builder::{BuildStats, ConstraintBuilder};
pub use create::{decl_key, func_key};
pub use cvar::{
    Atoms, CVarArena, CVarKind, ConstraintVariable, FunctionVariable, PointerVariable,
};
pub use error::{LookupError, ResolveError};
pub use link::LinkStats;
pub use options::InferOptions;
pub use state::ProgramInfo;

#[cfg(test)]
#[path = "../tests/index_tests.rs"]
mod index_tests;
#[cfg(test)]
#[path = "../tests/link_tests.rs"]
mod link_tests;
#[cfg(test)]
#[path = "../tests/lookup_tests.rs"]
mod lookup_tests;
#[cfg(test)]
#[path = "../tests/expr_tests.rs"]
mod expr_tests;
#[cfg(test)]
#[path = "../tests/builder_tests.rs"]
mod builder_tests;
#[cfg(test)]
#[path = "../tests/subtyping_tests.rs"]
mod subtyping_tests;
#[cfg(test)]
#[path = "../tests/test_utils.rs"]
mod test_utils;
