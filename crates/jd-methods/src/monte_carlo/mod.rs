//! Monte Carlo simulation of the Merton jump-diffusion.
//!
//! # Overview
//!
//! * [`simulate`]: generate a [`PathEnsemble`] on a [`TimeGrid`](crate::TimeGrid)
//! * [`PathEnsemble`]: `(n_paths, n_steps + 1)` matrix of prices
//! * [`LogReturnEnsemble`]: `(n_paths, n_steps)` matrix of log-returns
//! * [`PathSimulator`]: the seam the calibration objective simulates through

mod path_ensemble;
mod simulator;

pub use path_ensemble::{LogReturnEnsemble, PathEnsemble};
pub use simulator::{simulate, MertonPathSimulator, PathSimulator, Simulation, SimulationSettings};
