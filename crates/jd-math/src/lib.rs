//! # jd-math
//!
//! Mathematical utilities: the normal and Poisson distributions used by the
//! path simulator, a Mersenne-Twister random number generator with
//! inverse-CDF sampling, and a bounds-respecting derivative-free
//! optimization framework (Powell, Nelder–Mead).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use jd_core::Real;

// ── Modules ───────────────────────────────────────────────────────────────────

/// Probability distributions.
pub mod distributions;

/// Derivative-free optimization.
pub mod optimization;

/// Random number generators.
pub mod random_numbers;

// ── Linear algebra aliases ────────────────────────────────────────────────────

/// A dynamically-sized column vector of reals.
pub type Array = nalgebra::DVector<Real>;

/// A dynamically-sized matrix of reals (column-major).
pub type Matrix = nalgebra::DMatrix<Real>;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use distributions::{normal_cdf_inverse, PoissonDistribution};
pub use optimization::{
    BoxConstraint, CostFunction, EndCriteria, EndCriteriaType, OptimizationMethod,
    OptimizationResult, Powell, Simplex,
};
pub use random_numbers::{InverseCumulativeRng, MersenneTwisterUniformRng};
