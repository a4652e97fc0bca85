//! Errors for program shapes the core cannot interpret.
//!
//! These are reachable from front-end output, so they are returned rather than
//! asserted. Phase misuse by the caller (touching a closed unit) still panics.

use ptrsafe_ast::ExprId;
use ptrsafe_common::Anchor;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupError {
    /// A parameter declaration with no owning function.
    OrphanParameter { anchor: Anchor },
    /// An in-body lookup of a parameter whose function has no definition in
    /// the open unit.
    MissingDefinition { function: String },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::OrphanParameter { anchor } => {
                write!(f, "parameter at {anchor} has no owning function")
            }
            LookupError::MissingDefinition { function } => {
                write!(f, "function '{function}' has no definition in this unit")
            }
        }
    }
}

impl std::error::Error for LookupError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// The callee names something that is neither a variable, field,
    /// parameter nor function.
    UnclassifiableCallee { anchor: Anchor },
    /// `*e` where `e` denotes a function rather than a pointer.
    DerefOfFunction { expr: ExprId },
    Lookup(LookupError),
    /// Expression nesting exceeded `MAX_EXPR_RESOLVE_DEPTH`.
    DepthExceeded { expr: ExprId },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnclassifiableCallee { anchor } => {
                write!(f, "call target declared at {anchor} is not callable")
            }
            ResolveError::DerefOfFunction { expr } => {
                write!(f, "expression #{} dereferences a function", expr.0)
            }
            ResolveError::Lookup(err) => err.fmt(f),
            ResolveError::DepthExceeded { expr } => {
                write!(f, "expression #{} nests too deeply to resolve", expr.0)
            }
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Lookup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LookupError> for ResolveError {
    fn from(err: LookupError) -> Self {
        ResolveError::Lookup(err)
    }
}
