//! Common types and utilities for the ptrsafe pointer-safety inference tool.
//!
//! This crate provides foundational types used across all ptrsafe crates:
//! - Source anchors (`Anchor`) that identify declarations stably
//!   across translation-unit visits
//! - Constraint variable handles (`CVarId`)
//! - Function pairing keys (`FuncKey`)
//! - Centralized limits and thresholds

// Anchors - stable declaration keys
pub mod anchor;
pub use anchor::Anchor;

// Constraint variable handles and function keys
pub mod ids;
pub use ids::{CVarId, FuncKey, UnitId};

// Centralized limits and thresholds
pub mod limits;

#[cfg(test)]
#[path = "../tests/anchor_tests.rs"]
mod anchor_tests;
