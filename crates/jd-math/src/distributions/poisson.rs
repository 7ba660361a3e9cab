//! Poisson distribution.
//!
//! Tail probabilities come from `statrs`; sampling goes through
//! [`poisson_inverse_cumulative`], which maps exactly one uniform deviate
//! to one count.

use crate::distributions::normal_cdf_inverse;
use jd_core::{ensure, errors::Result, Real};
use statrs::distribution::{DiscreteCDF, Poisson};

/// Above this mean `e^{-λ}` loses too much precision for the product
/// recurrence and the normal approximation is used instead.
const NORMAL_APPROXIMATION_MEAN: Real = 500.0;

/// Poisson distribution with mean `lambda ≥ 0`.
///
/// A zero mean is allowed and degenerates to the point mass at 0, which is
/// what a jump intensity of zero requires.
#[derive(Debug, Clone)]
pub struct PoissonDistribution {
    dist: Option<Poisson>,
}

impl PoissonDistribution {
    /// Create a Poisson distribution with the given mean `lambda`.
    pub fn new(lambda: Real) -> Result<Self> {
        ensure!(
            lambda.is_finite() && lambda >= 0.0,
            "Poisson mean must be finite and non-negative, got {lambda}"
        );
        let dist = if lambda > 0.0 {
            Some(Poisson::new(lambda).map_err(|e| {
                jd_core::Error::InvalidArgument(format!("Poisson({lambda}): {e}"))
            })?)
        } else {
            None
        };
        Ok(Self { dist })
    }

    /// Tail probability P(X > k).
    pub fn survival(&self, k: u64) -> Real {
        match &self.dist {
            Some(d) => d.sf(k),
            None => 0.0,
        }
    }
}

/// Invert the Poisson CDF of mean `lambda` at `u` by sequential search.
///
/// For small means (the per-step jump counts of a daily grid) almost every
/// call returns after the first comparison.
pub fn poisson_inverse_cumulative(u: Real, lambda: Real) -> u64 {
    if lambda <= 0.0 {
        return 0;
    }
    if lambda > NORMAL_APPROXIMATION_MEAN {
        let x = lambda + lambda.sqrt() * normal_cdf_inverse(u);
        return (x + 0.5).floor().max(0.0) as u64;
    }

    let limit = (lambda + 12.0 * lambda.sqrt() + 30.0).ceil() as u64;
    let mut k = 0u64;
    let mut pmf = (-lambda).exp();
    let mut cdf = pmf;
    while u > cdf && k < limit {
        k += 1;
        pmf *= lambda / k as Real;
        cdf += pmf;
    }
    k
}
