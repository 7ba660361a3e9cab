//! Random number generators.
//!
//! All randomness in a simulation comes from one [`MersenneTwisterUniformRng`]
//! stream. [`InverseCumulativeRng`] turns that stream into normal and Poisson
//! variates by inversion, consuming exactly one uniform per variate, so a
//! fixed seed reproduces the same draws bit for bit whatever the model
//! parameters are.

use crate::distributions::{normal_cdf_inverse, poisson::poisson_inverse_cumulative};
use jd_core::Real;
use rand_mt::Mt19937GenRand64;

/// 2⁻⁵³, the spacing of the uniform grid.
const UNIT: Real = 1.0 / 9_007_199_254_740_992.0;

/// A uniform pseudo-random number generator based on the Mersenne Twister
/// MT19937-64 algorithm.
pub struct MersenneTwisterUniformRng {
    rng: Mt19937GenRand64,
}

impl MersenneTwisterUniformRng {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mt19937GenRand64::new(seed),
        }
    }

    /// Create a generator seeded from the operating system's entropy.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Next uniform deviate in the open interval `(0, 1)`.
    ///
    /// The top 53 bits are mapped to the midpoints of a `2⁻⁵³` grid, so
    /// neither end point can occur and no draw is ever rejected.
    #[inline]
    pub fn next_real(&mut self) -> Real {
        ((self.rng.next_u64() >> 11) as Real + 0.5) * UNIT
    }

    /// Next raw 64-bit output.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

/// Inverse-CDF sampler for the variates a jump-diffusion step needs.
pub struct InverseCumulativeRng {
    inner: MersenneTwisterUniformRng,
}

impl InverseCumulativeRng {
    /// Create a sampler backed by a Mersenne Twister with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            inner: MersenneTwisterUniformRng::new(seed),
        }
    }

    /// Create a sampler seeded from entropy.
    pub fn from_entropy() -> Self {
        Self {
            inner: MersenneTwisterUniformRng::from_entropy(),
        }
    }

    /// Next uniform deviate in `(0, 1)`.
    #[inline]
    pub fn next_uniform(&mut self) -> Real {
        self.inner.next_real()
    }

    /// Next standard-normal deviate.
    #[inline]
    pub fn next_normal(&mut self) -> Real {
        normal_cdf_inverse(self.inner.next_real())
    }

    /// Next Poisson count with mean `lambda`, optionally capped at `cap`.
    #[inline]
    pub fn next_poisson(&mut self, lambda: Real, cap: Option<u32>) -> u64 {
        let k = poisson_inverse_cumulative(self.inner.next_real(), lambda);
        match cap {
            Some(c) => k.min(u64::from(c)),
            None => k,
        }
    }

    /// Fill `out` with standard-normal deviates.
    pub fn fill_normal(&mut self, out: &mut [Real]) {
        for z in out {
            *z = self.next_normal();
        }
    }

    /// Fill `out` with Poisson counts (stored as reals).
    pub fn fill_poisson(&mut self, out: &mut [Real], lambda: Real, cap: Option<u32>) {
        for k in out {
            *k = self.next_poisson(lambda, cap) as Real;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mt_open_interval() {
        let mut rng = MersenneTwisterUniformRng::new(42);
        for _ in 0..10_000 {
            let x = rng.next_real();
            assert!(x > 0.0 && x < 1.0);
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = InverseCumulativeRng::new(7);
        let mut b = InverseCumulativeRng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_normal().to_bits(), b.next_normal().to_bits());
        }
    }

    #[test]
    fn poisson_consumes_one_uniform() {
        // Whatever the mean, the stream stays aligned afterwards.
        let mut a = InverseCumulativeRng::new(11);
        let mut b = InverseCumulativeRng::new(11);
        for _ in 0..50 {
            a.next_poisson(0.001, None);
            b.next_poisson(40.0, None);
        }
        assert_eq!(a.next_uniform(), b.next_uniform());
    }

    #[test]
    fn poisson_cap() {
        let mut rng = InverseCumulativeRng::new(3);
        for _ in 0..1_000 {
            assert!(rng.next_poisson(50.0, Some(2)) <= 2);
        }
    }

    #[test]
    fn normal_moments() {
        let mut rng = InverseCumulativeRng::new(42);
        let mut samples = vec![0.0; 20_000];
        rng.fill_normal(&mut samples);
        let n = samples.len() as Real;
        let mean = samples.iter().sum::<Real>() / n;
        let var = samples.iter().map(|z| (z - mean).powi(2)).sum::<Real>() / (n - 1.0);
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "variance {var}");
    }

    #[test]
    fn poisson_mean() {
        let mut rng = InverseCumulativeRng::new(5);
        let mut counts = vec![0.0; 20_000];
        rng.fill_poisson(&mut counts, 2.0, None);
        let mean = counts.iter().sum::<Real>() / counts.len() as Real;
        assert!((mean - 2.0).abs() < 0.05, "mean {mean}");
    }
}
