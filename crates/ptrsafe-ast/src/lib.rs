//! Program representation for the pointer-safety inference core.
//!
//! The inference core never parses C. It consumes translation units that an
//! external front end has already parsed and resolved: arena-indexed
//! declarations and expressions, owned declarator types, and the few
//! navigation queries the core needs (redeclaration chains, parameter owners,
//! call targets, macro-expansion detection).
//!
//! Units can be built in memory with [`UnitBuilder`] or loaded from the JSON
//! form the front end writes ([`load_unit`]).

pub mod builder;
pub mod load;
pub mod node;
pub mod types;
pub mod unit;

pub use builder::UnitBuilder;
pub use load::{LoadError, load_unit};
pub use node::{BinaryOp, Decl, DeclId, DeclKind, Expr, ExprId, Stmt, UnaryOp};
pub use types::{FunctionType, Type, structurally_equal};
pub use unit::TranslationUnit;

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod types_tests;
#[cfg(test)]
#[path = "../tests/unit_tests.rs"]
mod unit_tests;
#[cfg(test)]
#[path = "../tests/load_tests.rs"]
mod load_tests;
