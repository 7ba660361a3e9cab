//! # jd-core
//!
//! Core types, traits, and error definitions for jumpdiff.
//!
//! This crate provides the foundational building blocks shared across all
//! other crates in the workspace: scalar type aliases, the error hierarchy
//! with its `ensure!` / `fail!` macros, and number formatting used when
//! rendering calibration results.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `fail!` macros.
pub mod errors;

/// Number formatting helpers.
pub mod formatting;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A price level.
pub type Price = Real;

/// A time measurement in the units of the calibration grid (usually years).
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use formatting::format_significant;
