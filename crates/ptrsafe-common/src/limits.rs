//! Centralized limits and thresholds for the inference pipeline.
//!
//! Centralizing these values keeps the resolver, the structural type check and
//! the driver from growing private copies with inconsistent values.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth the expression resolver follows.
///
/// Each parenthesis, cast, operator or call adds a frame; at this depth the
/// resolver gives up with an error instead of overflowing the stack on
/// machine-generated input.
pub const MAX_EXPR_RESOLVE_DEPTH: u32 = 512;

/// Maximum depth for structural type comparison.
///
/// Typedef chains and nested declarator types are walked recursively. Past this
/// depth two types are reported as not equal, which callers already treat as
/// "could not prove equal".
pub const MAX_TYPE_COMPARE_DEPTH: u32 = 128;

// =============================================================================
// Iteration Limits
// =============================================================================

/// Upper bound on solve/repair rounds.
///
/// Every round that reports a change raises at least one atom in a
/// four-element lattice, so the loop terminates after at most three rounds per
/// atom; this bound only guards against a broken solver collaborator.
pub const MAX_REPAIR_ITERATIONS: u32 = 64;

// =============================================================================
// Extern Policy
// =============================================================================

/// Bodiless externs that are safe by convention and are not forced to the
/// least-safe category by the linker.
pub const DEFAULT_EXTERN_ALLOW_LIST: &[&str] = &["malloc", "free"];
