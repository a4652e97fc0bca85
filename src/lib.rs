//! Pointer-safety inference for C programs.
//!
//! This crate ties the workspace together:
//!
//! - [`ast`]: the translation units an external front end hands over
//! - [`solver`]: atoms, the safety lattice and the equality solver
//! - [`infer`]: the analysis session ([`ProgramInfo`]) and its passes
//! - [`pipeline`]: the two-pass driver with the solve/repair loop
//! - [`cli`]: argument parsing, configuration and the `ptrsafe` binary driver

pub use ptrsafe_ast as ast;
pub use ptrsafe_common as common;
pub use ptrsafe_infer as infer;
pub use ptrsafe_solver as solver;

pub use ptrsafe_infer::{Assignment, InferOptions, LinkStats, ProgramInfo};
pub use ptrsafe_solver::{Category, Environment};

pub mod cli;
pub mod pipeline;
pub mod tracing_config;

pub use pipeline::{Outcome, Pipeline};
