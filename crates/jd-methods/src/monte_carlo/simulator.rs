//! Jump-diffusion path simulator.
//!
//! Time steps run sequentially; within a step every path is advanced in one
//! batch operation over the time-slice column.
//!
//! # Draw order
//!
//! All variates come from a single Mersenne-Twister stream, one uniform per
//! variate. For each step `i = 0..n_steps`:
//!
//! 1. `n_paths` standard normals `Z` (diffusive shocks), path 0 first;
//! 2. `n_paths` Poisson counts `K ~ Poisson(λ·dt)`;
//! 3. `n_paths` standard normals `Z_J` (aggregated jump sizes).
//!
//! A seed therefore fixes every draw independently of the parameter values,
//! and reproduces the ensemble bit for bit.

use super::path_ensemble::{LogReturnEnsemble, PathEnsemble};
use crate::time_grid::TimeGrid;
use jd_core::{ensure, errors::Result, Price, Real, Size, Time};
use jd_math::random_numbers::InverseCumulativeRng;
use jd_math::{Array, Matrix};
use jd_processes::{MertonParameters, MertonProcess};

/// Grid, ensemble size, and RNG controls for one simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationSettings {
    /// Number of time steps.
    pub n_steps: Size,
    /// Number of paths.
    pub n_paths: Size,
    /// Step length.
    pub dt: Time,
    /// Compensate the drift so the discounted price is a martingale.
    pub risk_neutral: bool,
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Cap on jumps per path per step (`k_max`); `None` for no cap.
    pub max_jumps_per_step: Option<u32>,
}

impl SimulationSettings {
    /// `n_steps` steps of length `dt`, other settings at their defaults.
    pub fn new(n_steps: Size, dt: Time) -> Self {
        Self {
            n_steps,
            dt,
            ..Self::default()
        }
    }

    /// Set the number of paths.
    pub fn with_paths(mut self, n_paths: Size) -> Self {
        self.n_paths = n_paths;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use the risk-neutral drift.
    pub fn risk_neutral(mut self, risk_neutral: bool) -> Self {
        self.risk_neutral = risk_neutral;
        self
    }

    /// Cap per-step jump counts at `k_max`.
    pub fn with_max_jumps(mut self, k_max: u32) -> Self {
        self.max_jumps_per_step = Some(k_max);
        self
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.n_paths > 0, "at least one path is required");
        ensure!(
            self.dt.is_finite() && self.dt > 0.0,
            "dt must be positive, got {}",
            self.dt
        );
        Ok(())
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            n_steps: 252,
            n_paths: 500,
            dt: 1.0 / 252.0,
            risk_neutral: false,
            seed: None,
            max_jumps_per_step: None,
        }
    }
}

/// Output of [`simulate`].
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Simulated prices, shape `(n_paths, n_steps + 1)`.
    pub paths: PathEnsemble,
    /// The time points of the columns.
    pub grid: TimeGrid,
}

impl Simulation {
    /// Log-returns of the simulated paths.
    pub fn log_returns(&self) -> LogReturnEnsemble {
        self.paths.log_returns()
    }
}

/// Simulate Merton jump-diffusion paths starting from `s0`.
///
/// Column 0 of the ensemble equals `s0` on every row. Prices are never
/// clamped: an overflowing step yields `inf`, an underflowing one `0`, and
/// both surface as non-finite log-returns.
pub fn simulate(
    s0: Price,
    params: &MertonParameters,
    settings: &SimulationSettings,
) -> Result<Simulation> {
    ensure!(s0.is_finite() && s0 > 0.0, "s0 must be positive, got {s0}");
    settings.validate()?;
    let process = MertonProcess::new(*params, settings.dt, settings.risk_neutral)?;
    let grid = TimeGrid::new(settings.n_steps, settings.dt)?;

    let mut rng = match settings.seed {
        Some(seed) => InverseCumulativeRng::new(seed),
        None => InverseCumulativeRng::from_entropy(),
    };

    let n = settings.n_paths;
    let mut values = Matrix::zeros(n, settings.n_steps + 1);
    values.column_mut(0).fill(s0);

    let mut z = Array::zeros(n);
    let mut jumps = Array::zeros(n);
    let mut z_jump = Array::zeros(n);
    let jump_mean = process.jump_mean();

    for i in 0..settings.n_steps {
        rng.fill_normal(z.as_mut_slice());
        rng.fill_poisson(jumps.as_mut_slice(), jump_mean, settings.max_jumps_per_step);
        rng.fill_normal(z_jump.as_mut_slice());

        let growth = process
            .log_increments(&z, &jumps, &z_jump)
            .map(Real::exp);
        let next = values.column(i).component_mul(&growth);
        values.set_column(i + 1, &next);
    }

    Ok(Simulation {
        paths: PathEnsemble::new(values),
        grid,
    })
}

/// Something that can produce a path ensemble for trial parameters.
///
/// The calibration objective simulates through this trait so tests and
/// alternative schemes can stand in for [`simulate`].
pub trait PathSimulator: Send + Sync {
    /// Simulate an ensemble starting from `s0`.
    fn simulate(
        &self,
        s0: Price,
        params: &MertonParameters,
        settings: &SimulationSettings,
    ) -> Result<PathEnsemble>;
}

/// The standard [`simulate`] function as a [`PathSimulator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MertonPathSimulator;

impl PathSimulator for MertonPathSimulator {
    fn simulate(
        &self,
        s0: Price,
        params: &MertonParameters,
        settings: &SimulationSettings,
    ) -> Result<PathEnsemble> {
        simulate(s0, params, settings).map(|s| s.paths)
    }
}

impl<F> PathSimulator for F
where
    F: Fn(Price, &MertonParameters, &SimulationSettings) -> Result<PathEnsemble> + Send + Sync,
{
    fn simulate(
        &self,
        s0: Price,
        params: &MertonParameters,
        settings: &SimulationSettings,
    ) -> Result<PathEnsemble> {
        self(s0, params, settings)
    }
}
