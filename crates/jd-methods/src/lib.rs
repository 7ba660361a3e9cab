//! # jd-methods
//!
//! Numerical methods: the uniform [`TimeGrid`] and the Monte Carlo
//! simulator that turns Merton parameters into an ensemble of price paths.
//!
//! # Modules
//!
//! * [`time_grid`]: uniform grid of time points starting at 0
//! * [`monte_carlo`]: path ensembles, log-returns, and the simulator

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Uniform time grids.
pub mod time_grid;

/// Monte Carlo simulation: path ensembles and the jump-diffusion simulator.
pub mod monte_carlo;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use monte_carlo::{
    simulate, LogReturnEnsemble, MertonPathSimulator, PathEnsemble, PathSimulator, Simulation,
    SimulationSettings,
};
pub use time_grid::TimeGrid;
