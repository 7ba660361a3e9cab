//! Probability distributions.
//!
//! The simulator samples both distributions by inversion, one uniform per
//! variate, so the generator's position never depends on parameter values.

pub mod normal;
pub mod poisson;

pub use normal::normal_cdf_inverse;
pub use poisson::PoissonDistribution;
