//! Return-matching calibration objective.
//!
//! For a candidate parameter vector the objective simulates `n_paths`
//! paths over the observed grid and returns the mean over paths of the
//! per-path sum of squared differences between simulated and observed
//! log-returns.
//!
//! The objective never fails. Candidates outside the model domain, a
//! non-positive `dt`, a simulation error, or a non-finite loss all score
//! [`PENALTY_VALUE`], so a search can cross invalid regions without
//! aborting.

use jd_core::{ensure_input, errors::Result, Price, Real, Size, Time};
use jd_math::{Array, CostFunction};
use jd_methods::{MertonPathSimulator, PathSimulator, SimulationSettings};
use jd_processes::MertonParameters;
use tracing::trace;

/// Score assigned to rejected candidates.
pub const PENALTY_VALUE: Real = 1e50;

/// Check an observed price series and return its log-returns.
pub(crate) fn observed_log_returns(target_prices: &[Price]) -> Result<Vec<Real>> {
    ensure_input!(
        target_prices.len() >= 2,
        "need at least 2 observed prices to form a log-return, got {}",
        target_prices.len()
    );
    for (i, &p) in target_prices.iter().enumerate() {
        ensure_input!(
            p.is_finite() && p > 0.0,
            "observed price {i} must be finite and positive, got {p}"
        );
    }
    Ok(target_prices
        .windows(2)
        .map(|w| (w[1] / w[0]).ln())
        .collect())
}

/// Mean per-path SSE between simulated and observed log-returns.
///
/// Observed log-returns are computed once at construction. The simulation
/// seed lives in the settings, so every evaluation with the same seed uses
/// the same random numbers.
#[derive(Debug)]
pub struct ReturnObjective<'a, S: PathSimulator + ?Sized = MertonPathSimulator> {
    simulator: &'a S,
    s0: Price,
    observed: Vec<Real>,
    settings: SimulationSettings,
}

impl<'a, S: PathSimulator + ?Sized> ReturnObjective<'a, S> {
    /// Build the objective for `target_prices`.
    ///
    /// `settings.n_steps` is replaced by the number of observed returns.
    ///
    /// # Errors
    /// [`jd_core::Error::MalformedInput`] if the series has fewer than two
    /// points or holds a non-finite or non-positive price.
    pub fn new(
        simulator: &'a S,
        target_prices: &[Price],
        settings: SimulationSettings,
    ) -> Result<Self> {
        let observed = observed_log_returns(target_prices)?;
        Ok(Self {
            simulator,
            s0: target_prices[0],
            settings: SimulationSettings {
                n_steps: observed.len(),
                ..settings
            },
            observed,
        })
    }

    /// Observed log-returns, one per step.
    pub fn observed_log_returns(&self) -> &[Real] {
        &self.observed
    }

    /// Starting price of every simulated path.
    pub fn s0(&self) -> Price {
        self.s0
    }

    /// Settings passed to the simulator on every evaluation.
    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Grid spacing.
    pub fn dt(&self) -> Time {
        self.settings.dt
    }

    /// Score a parameter set.
    pub fn score(&self, params: &MertonParameters) -> Real {
        if !params.is_valid() {
            trace!(%params, "candidate outside model domain");
            return PENALTY_VALUE;
        }
        let dt = self.settings.dt;
        if dt.is_nan() || dt <= 0.0 {
            trace!(dt, "non-positive time step");
            return PENALTY_VALUE;
        }

        let paths = match self.simulator.simulate(self.s0, params, &self.settings) {
            Ok(paths) => paths,
            Err(error) => {
                trace!(%params, %error, "simulation rejected candidate");
                return PENALTY_VALUE;
            }
        };
        if paths.n_paths() == 0 || paths.n_steps() != self.observed.len() {
            trace!(
                shape = ?paths.shape(),
                expected_steps = self.observed.len(),
                "simulator returned an ensemble of the wrong shape"
            );
            return PENALTY_VALUE;
        }

        let loss = paths.log_returns().squared_errors(&self.observed).mean();
        if loss.is_finite() {
            loss
        } else {
            trace!(%params, loss, "non-finite loss");
            PENALTY_VALUE
        }
    }
}

impl<S: PathSimulator + ?Sized> CostFunction for ReturnObjective<'_, S> {
    fn value(&self, x: &Array) -> Real {
        match MertonParameters::from_slice(x.as_slice()) {
            Ok(params) => self.score(&params),
            Err(_) => PENALTY_VALUE,
        }
    }
}

/// Score `params` (`[mu, sigma, lam, mu_j, sigma_j]`) against
/// `target_prices` with a one-off objective.
///
/// Returns a non-negative loss or [`PENALTY_VALUE`]. Inputs the objective
/// cannot be built from (a series shorter than two points, a wrong-length
/// parameter vector) also score the penalty; use [`ReturnObjective::new`]
/// to get an error instead.
pub fn score<S: PathSimulator + ?Sized>(
    params: &[Real],
    simulator: &S,
    target_prices: &[Price],
    seed: Option<u64>,
    n_paths: Size,
    dt: Time,
    risk_neutral: bool,
) -> Real {
    let params = match MertonParameters::from_slice(params) {
        Ok(params) => params,
        Err(_) => return PENALTY_VALUE,
    };
    let mut settings = SimulationSettings::new(0, dt)
        .with_paths(n_paths)
        .risk_neutral(risk_neutral);
    settings.seed = seed;
    match ReturnObjective::new(simulator, target_prices, settings) {
        Ok(objective) => objective.score(&params),
        Err(error) => {
            trace!(%error, "objective could not be built");
            PENALTY_VALUE
        }
    }
}
