//! Multi-start calibration driver.
//!
//! A calibration resolves one simulation seed, builds a [`ReturnObjective`]
//! that reuses it on every evaluation (common random numbers), draws all
//! start points up front, runs the local optimizer from each, and keeps the
//! restart with the lowest objective value. Ties go to the lower restart
//! index, so running restarts on the rayon pool returns the same result as
//! running them in order.

use crate::calibration_result::{CalibrationResult, CalibrationStatus};
use crate::objective::{observed_log_returns, ReturnObjective, PENALTY_VALUE};
use crate::parameter_bounds::ParameterBounds;
use jd_core::{ensure, errors::Result, Price, Real, Size, Time};
use jd_math::distributions::PoissonDistribution;
use jd_math::random_numbers::MersenneTwisterUniformRng;
use jd_math::{Array, EndCriteria, OptimizationMethod, OptimizationResult, Powell};
use jd_methods::{MertonPathSimulator, PathSimulator, SimulationSettings};
use jd_processes::{MertonParameter, MertonParameters};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Truncation probability above which a jump cap is reported.
const JUMP_CAP_TAIL_WARNING: Real = 1e-12;

/// Offset separating the start-point stream from the simulation stream.
const START_STREAM_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

/// Controls for [`MertonCalibrator`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationConfig {
    /// Paths simulated per objective evaluation.
    pub n_paths: Size,
    /// Number of optimizer runs from distinct start points.
    pub restarts: Size,
    /// Iteration cap per restart.
    pub max_iterations: Size,
    /// Relative function tolerance of the local search.
    pub function_tolerance: Real,
    /// Step tolerance of the local search.
    pub x_tolerance: Real,
    /// Cap on jumps per path per step (`k_max`).
    pub max_jumps_per_step: Option<u32>,
    /// Simulation seed; drawn from entropy when `None`.
    pub seed: Option<u64>,
    /// Simulate with the risk-neutral drift.
    pub risk_neutral: bool,
    /// Start point of restart 0, clipped into the bounds.
    pub initial_guess: Option<MertonParameters>,
    /// Run restarts on the rayon thread pool.
    pub parallel: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            n_paths: 500,
            restarts: 5,
            max_iterations: 200,
            function_tolerance: 1e-4,
            x_tolerance: 1e-4,
            max_jumps_per_step: None,
            seed: None,
            risk_neutral: false,
            initial_guess: None,
            parallel: true,
        }
    }
}

impl CalibrationConfig {
    /// Set the number of paths per evaluation.
    pub fn with_paths(mut self, n_paths: Size) -> Self {
        self.n_paths = n_paths;
        self
    }

    /// Set the number of restarts.
    pub fn with_restarts(mut self, restarts: Size) -> Self {
        self.restarts = restarts;
        self
    }

    /// Set the iteration cap per restart.
    pub fn with_max_iterations(mut self, max_iterations: Size) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the function and step tolerances.
    pub fn with_tolerances(mut self, function_tolerance: Real, x_tolerance: Real) -> Self {
        self.function_tolerance = function_tolerance;
        self.x_tolerance = x_tolerance;
        self
    }

    /// Cap jumps per step at `k_max`.
    pub fn with_max_jumps(mut self, k_max: u32) -> Self {
        self.max_jumps_per_step = Some(k_max);
        self
    }

    /// Fix the simulation seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use the risk-neutral drift.
    pub fn risk_neutral(mut self, risk_neutral: bool) -> Self {
        self.risk_neutral = risk_neutral;
        self
    }

    /// Start restart 0 from `guess`.
    pub fn with_initial_guess(mut self, guess: MertonParameters) -> Self {
        self.initial_guess = Some(guess);
        self
    }

    /// Run restarts in parallel or in order.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.n_paths >= 1, "n_paths must be at least 1");
        ensure!(self.restarts >= 1, "restarts must be at least 1");
        ensure!(self.max_iterations >= 1, "max_iterations must be at least 1");
        ensure!(
            self.function_tolerance.is_finite() && self.function_tolerance >= 0.0,
            "function_tolerance must be finite and non-negative, got {}",
            self.function_tolerance
        );
        ensure!(
            self.x_tolerance.is_finite() && self.x_tolerance > 0.0,
            "x_tolerance must be positive, got {}",
            self.x_tolerance
        );
        Ok(())
    }

    fn end_criteria(&self) -> EndCriteria {
        EndCriteria::new(
            self.max_iterations,
            self.function_tolerance,
            self.x_tolerance,
        )
    }
}

/// Fits [`MertonParameters`] to an observed price series.
///
/// The local search is any [`OptimizationMethod`] ([`Powell`] by default)
/// and paths come from any [`PathSimulator`].
#[derive(Debug, Clone)]
pub struct MertonCalibrator<M = Powell, S = MertonPathSimulator> {
    method: M,
    simulator: S,
    config: CalibrationConfig,
}

impl MertonCalibrator {
    /// Powell search over the standard simulator.
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            method: Powell::new(),
            simulator: MertonPathSimulator,
            config,
        }
    }
}

impl Default for MertonCalibrator {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}

impl<M: OptimizationMethod, S: PathSimulator> MertonCalibrator<M, S> {
    /// Replace the local search.
    pub fn with_method<N: OptimizationMethod>(self, method: N) -> MertonCalibrator<N, S> {
        MertonCalibrator {
            method,
            simulator: self.simulator,
            config: self.config,
        }
    }

    /// Replace the path simulator.
    pub fn with_simulator<T: PathSimulator>(self, simulator: T) -> MertonCalibrator<M, T> {
        MertonCalibrator {
            method: self.method,
            simulator,
            config: self.config,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Calibrate to `target_prices` observed on a grid of spacing `dt`.
    ///
    /// # Errors
    /// Fails before any simulation if the series has fewer than two points
    /// or a non-positive price, if `dt` is not positive, or if the
    /// configuration is out of range. A run in which no restart reaches a
    /// finite objective is not an error: it returns
    /// [`CalibrationStatus::Failed`] with the best point found.
    pub fn calibrate(
        &self,
        target_prices: &[Price],
        bounds: &ParameterBounds,
        dt: Time,
    ) -> Result<CalibrationResult> {
        observed_log_returns(target_prices)?;
        ensure!(dt.is_finite() && dt > 0.0, "dt must be positive, got {dt}");
        self.config.validate()?;
        let constraint = bounds.to_box_constraint()?;

        if let Some(k_max) = self.config.max_jumps_per_step {
            check_jump_cap(bounds, dt, k_max)?;
        }

        let seed = self
            .config
            .seed
            .unwrap_or_else(|| MersenneTwisterUniformRng::from_entropy().next_u64());
        let mut settings = SimulationSettings::new(0, dt)
            .with_paths(self.config.n_paths)
            .with_seed(seed)
            .risk_neutral(self.config.risk_neutral);
        settings.max_jumps_per_step = self.config.max_jumps_per_step;
        let objective = ReturnObjective::new(&self.simulator, target_prices, settings)?;

        let starts = self.start_points(bounds, seed);
        let end_criteria = self.config.end_criteria();
        info!(
            method = self.method.name(),
            restarts = starts.len(),
            n_paths = self.config.n_paths,
            n_returns = objective.observed_log_returns().len(),
            seed,
            "calibrating Merton parameters"
        );

        let run = |(restart, x0): (Size, &Array)| -> Result<(Size, OptimizationResult)> {
            debug!(restart, start = ?x0.as_slice(), "restart started");
            let result = self
                .method
                .minimize(&objective, &constraint, x0, &end_criteria)?;
            debug!(
                restart,
                value = result.value,
                iterations = result.iterations,
                evaluations = result.evaluations,
                end = ?result.end_type,
                "restart finished"
            );
            Ok((restart, result))
        };
        let runs = if self.config.parallel {
            starts
                .par_iter()
                .enumerate()
                .map(run)
                .collect::<Result<Vec<_>>>()?
        } else {
            starts
                .iter()
                .enumerate()
                .map(run)
                .collect::<Result<Vec<_>>>()?
        };

        let total_evaluations: Size = runs.iter().map(|(_, r)| r.evaluations).sum();
        let (restart, best) = select_best(runs)?;
        let result = build_result(restart, best, seed)?;

        match result.status {
            CalibrationStatus::Converged => {}
            CalibrationStatus::MaxIterExceeded => warn!(
                restart,
                iterations = result.iterations,
                "best restart stopped before converging"
            ),
            CalibrationStatus::Failed => warn!(
                restarts = self.config.restarts,
                "no restart reached a finite objective value"
            ),
        }
        info!(
            status = %result.status,
            loss = result.objective_value,
            restart,
            total_evaluations,
            parameters = %result.parameters,
            "calibration finished"
        );
        Ok(result)
    }

    /// Restart 0 uses the initial guess when one is configured; every other
    /// start is uniform in the box.
    fn start_points(&self, bounds: &ParameterBounds, seed: u64) -> Vec<Array> {
        let mut rng = MersenneTwisterUniformRng::new(seed.wrapping_add(START_STREAM_OFFSET));
        (0..self.config.restarts)
            .map(|i| match (i, self.config.initial_guess) {
                (0, Some(guess)) => bounds.clip(&guess).to_array(),
                _ => uniform_point(bounds, &mut rng),
            })
            .collect()
    }
}

fn uniform_point(bounds: &ParameterBounds, rng: &mut MersenneTwisterUniformRng) -> Array {
    Array::from_iterator(
        MertonParameter::ALL.len(),
        MertonParameter::ALL.iter().map(|&p| {
            let b = bounds.get(p);
            b.clip(b.lower + rng.next_real() * b.width())
        }),
    )
}

/// Lowest objective value; equal values keep the lower restart index.
fn select_best(runs: Vec<(Size, OptimizationResult)>) -> Result<(Size, OptimizationResult)> {
    let best = runs.into_iter().min_by(|(i, a), (j, b)| {
        a.value.total_cmp(&b.value).then_with(|| i.cmp(j))
    });
    match best {
        Some(best) => Ok(best),
        None => jd_core::fail!("calibration ran no restarts"),
    }
}

fn build_result(restart: Size, best: OptimizationResult, seed: u64) -> Result<CalibrationResult> {
    let status = if best.value.is_nan() || best.value >= PENALTY_VALUE {
        CalibrationStatus::Failed
    } else if best.end_type.is_converged() {
        CalibrationStatus::Converged
    } else {
        CalibrationStatus::MaxIterExceeded
    };
    Ok(CalibrationResult {
        parameters: MertonParameters::from_slice(best.x.as_slice())?,
        objective_value: best.value,
        status,
        iterations: best.iterations,
        restart,
        evaluations: best.evaluations,
        seed,
    })
}

/// Warn when capping jumps at `k_max` could bite at the largest intensity
/// the bounds allow.
fn check_jump_cap(bounds: &ParameterBounds, dt: Time, k_max: u32) -> Result<()> {
    let lam_upper = bounds.get(MertonParameter::Lam).upper.max(0.0);
    let tail = PoissonDistribution::new(lam_upper * dt)?.survival(u64::from(k_max));
    if tail > JUMP_CAP_TAIL_WARNING {
        warn!(
            k_max,
            lam_upper,
            dt,
            tail,
            "jump cap truncates the Poisson count with non-negligible probability"
        );
    }
    Ok(())
}

/// Calibrate with [`Powell`] and otherwise default settings.
///
/// `k_max` caps jumps per step, `restarts` is the number of start points,
/// and `maxiter` the iteration budget of each local search. The simulation
/// seed is drawn from entropy; use [`MertonCalibrator`] with
/// [`CalibrationConfig::with_seed`] for a reproducible run.
pub fn calibrate(
    target_prices: &[Price],
    bounds: &ParameterBounds,
    dt: Time,
    k_max: u32,
    restarts: Size,
    maxiter: Size,
) -> Result<CalibrationResult> {
    let config = CalibrationConfig::default()
        .with_max_jumps(k_max)
        .with_restarts(restarts)
        .with_max_iterations(maxiter);
    MertonCalibrator::new(config).calibrate(target_prices, bounds, dt)
}
