//! Merton jump-diffusion process.
//!
//! ```text
//! dS/S = (μ − λ·κ·1_{RN}) dt + σ dW + (e^J − 1) dN
//! J ~ N(μ_J, σ_J²),  N ~ Poisson(λ t),  κ = exp(μ_J + σ_J²/2) − 1
//! ```
//!
//! On a grid of spacing `dt` the log-price increment for one step is
//!
//! ```text
//! (drift − σ²/2)·dt + σ·√dt·Z + K·μ_J + √K·σ_J·Z_J
//! ```
//!
//! with `Z, Z_J ~ N(0, 1)` and `K ~ Poisson(λ·dt)`. The `K` jumps of a step
//! are aggregated into one normal draw with mean `K·μ_J` and variance
//! `K·σ_J²`: the sum of `K` independent normal log-jumps has exactly that
//! law, so the step is exact in distribution, but it is not a draw-by-draw
//! replay of `K` separate jumps. Fitted jump parameters are defined with
//! respect to this scheme.

use jd_core::{ensure, errors::Result, Error, Real, Time};
use jd_math::Array;
use std::fmt;
use std::str::FromStr;

// ── Parameter names ──────────────────────────────────────────────────────────

/// One of the five model parameters, in canonical vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MertonParameter {
    /// Drift μ.
    Mu,
    /// Diffusive volatility σ.
    Sigma,
    /// Jump intensity λ (jumps per unit time).
    Lam,
    /// Mean log-jump size μ_J.
    MuJ,
    /// Log-jump size standard deviation σ_J.
    SigmaJ,
}

impl MertonParameter {
    /// All parameters in vector order.
    pub const ALL: [MertonParameter; 5] = [
        MertonParameter::Mu,
        MertonParameter::Sigma,
        MertonParameter::Lam,
        MertonParameter::MuJ,
        MertonParameter::SigmaJ,
    ];

    /// Canonical name (`mu`, `sigma`, `lam`, `mu_j`, `sigma_j`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Mu => "mu",
            Self::Sigma => "sigma",
            Self::Lam => "lam",
            Self::MuJ => "mu_j",
            Self::SigmaJ => "sigma_j",
        }
    }

    /// Position in the parameter vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether the parameter must be non-negative.
    pub fn is_non_negative(self) -> bool {
        matches!(self, Self::Sigma | Self::Lam | Self::SigmaJ)
    }
}

impl fmt::Display for MertonParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MertonParameter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mu" => Ok(Self::Mu),
            "sigma" => Ok(Self::Sigma),
            "lam" | "lambda" | "lambd" => Ok(Self::Lam),
            "mu_j" => Ok(Self::MuJ),
            "sigma_j" => Ok(Self::SigmaJ),
            other => Err(Error::UnknownParameter(other.to_string())),
        }
    }
}

// ── Parameters ───────────────────────────────────────────────────────────────

/// Merton model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MertonParameters {
    /// Drift μ.
    pub mu: Real,
    /// Diffusive volatility σ ≥ 0.
    pub sigma: Real,
    /// Jump intensity λ ≥ 0.
    pub lam: Real,
    /// Mean log-jump size μ_J.
    pub mu_j: Real,
    /// Log-jump size standard deviation σ_J ≥ 0.
    pub sigma_j: Real,
}

impl MertonParameters {
    /// Create a parameter set. No validation is performed.
    pub fn new(mu: Real, sigma: Real, lam: Real, mu_j: Real, sigma_j: Real) -> Self {
        Self {
            mu,
            sigma,
            lam,
            mu_j,
            sigma_j,
        }
    }

    /// Build from a vector in [`MertonParameter::ALL`] order.
    pub fn from_slice(values: &[Real]) -> Result<Self> {
        ensure!(
            values.len() == 5,
            "expected 5 Merton parameters, got {}",
            values.len()
        );
        Ok(Self::new(values[0], values[1], values[2], values[3], values[4]))
    }

    /// The parameters as a vector in [`MertonParameter::ALL`] order.
    pub fn to_array(&self) -> Array {
        Array::from_vec(vec![self.mu, self.sigma, self.lam, self.mu_j, self.sigma_j])
    }

    /// Value of a single parameter.
    pub fn get(&self, p: MertonParameter) -> Real {
        match p {
            MertonParameter::Mu => self.mu,
            MertonParameter::Sigma => self.sigma,
            MertonParameter::Lam => self.lam,
            MertonParameter::MuJ => self.mu_j,
            MertonParameter::SigmaJ => self.sigma_j,
        }
    }

    /// All values finite and σ, λ, σ_J non-negative.
    pub fn is_valid(&self) -> bool {
        MertonParameter::ALL.iter().all(|&p| {
            let v = self.get(p);
            v.is_finite() && (!p.is_non_negative() || v >= 0.0)
        })
    }

    /// Error describing the first domain violation, if any.
    pub fn validate(&self) -> Result<()> {
        for p in MertonParameter::ALL {
            let v = self.get(p);
            ensure!(v.is_finite(), "{p} must be finite, got {v}");
            ensure!(
                !p.is_non_negative() || v >= 0.0,
                "{p} must be non-negative, got {v}"
            );
        }
        Ok(())
    }

    /// Jump compensator κ = E[e^J] − 1 = exp(μ_J + σ_J²/2) − 1.
    pub fn jump_compensator(&self) -> Real {
        (self.mu_j + 0.5 * self.sigma_j * self.sigma_j).exp() - 1.0
    }

    /// Drift used in the log-price step: μ, or μ − λκ under the
    /// risk-neutral measure.
    pub fn drift(&self, risk_neutral: bool) -> Real {
        if risk_neutral {
            self.mu - self.lam * self.jump_compensator()
        } else {
            self.mu
        }
    }
}

impl fmt::Display for MertonParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mu={}, sigma={}, lam={}, mu_j={}, sigma_j={}",
            self.mu, self.sigma, self.lam, self.mu_j, self.sigma_j
        )
    }
}

// ── Process ──────────────────────────────────────────────────────────────────

/// Per-step coefficients of the discretized Merton process on a fixed `dt`.
#[derive(Debug, Clone, Copy)]
pub struct MertonProcess {
    params: MertonParameters,
    dt: Time,
    drift_term: Real,
    diffusion_term: Real,
}

impl MertonProcess {
    /// Discretize `params` on a grid of spacing `dt`.
    pub fn new(params: MertonParameters, dt: Time, risk_neutral: bool) -> Result<Self> {
        params.validate()?;
        ensure!(dt.is_finite() && dt > 0.0, "dt must be positive, got {dt}");
        let drift_term = (params.drift(risk_neutral) - 0.5 * params.sigma * params.sigma) * dt;
        Ok(Self {
            params,
            dt,
            drift_term,
            diffusion_term: params.sigma * dt.sqrt(),
        })
    }

    /// The model parameters.
    pub fn params(&self) -> &MertonParameters {
        &self.params
    }

    /// Grid spacing.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Poisson mean of the per-step jump count, λ·dt.
    pub fn jump_mean(&self) -> Real {
        self.params.lam * self.dt
    }

    /// Log-price increment for one path given its three draws.
    #[inline]
    pub fn log_increment(&self, z: Real, jumps: Real, z_jump: Real) -> Real {
        let jump = jumps * self.params.mu_j + jumps.sqrt() * self.params.sigma_j * z_jump;
        self.drift_term + self.diffusion_term * z + jump
    }

    /// Log-price increments for a whole batch of paths.
    pub fn log_increments(&self, z: &Array, jumps: &Array, z_jump: &Array) -> Array {
        z.zip_zip_map(jumps, z_jump, |z, k, zj| self.log_increment(z, k, zj))
    }
}
