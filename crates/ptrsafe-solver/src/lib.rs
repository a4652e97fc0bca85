//! Constraint solver for pointer-safety categories.
//!
//! This crate is the solver collaborator of the inference core:
//!
//! - **Atoms**: one `VarAtom` per level of pointer indirection
//! - **Lattice**: `Ptr ⊑ Arr ⊑ NtArr ⊑ Wild`, safety decreasing rightward
//! - **Ena**: equality constraints are unified with a Union-Find table whose
//!   per-class value is the join of every constant the class was equated with
//! - **Registries**: the definition/declaration maps used to pair a function's
//!   prototype with its body across translation units
//!
//! The solved [`Environment`] is a snapshot; adding constraints afterwards
//! requires another [`ConstraintSystem::solve`].

mod atoms;
mod constraints;
mod environment;
mod registry;

pub use atoms::{Category, VarAtom};
pub use constraints::{Constraint, ConstraintSystem};
pub use environment::Environment;
pub use registry::{CVarSet, FunctionRegistry};

#[cfg(test)]
#[path = "../tests/solver_tests.rs"]
mod solver_tests;
#[cfg(test)]
#[path = "../tests/registry_tests.rs"]
mod registry_tests;
