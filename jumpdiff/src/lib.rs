//! # jumpdiff
//!
//! Monte Carlo calibration of the Merton jump-diffusion model to an
//! observed price series.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates, plus the small [`series`] module used to
//! load observations from CSV. Application code should depend on this
//! crate rather than the individual `jd-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use jumpdiff::methods::{simulate, SimulationSettings};
//! use jumpdiff::models::{CalibrationConfig, MertonCalibrator, ParameterBounds};
//! use jumpdiff::processes::MertonParameters;
//!
//! let truth = MertonParameters::new(0.05, 0.2, 1.0, -0.05, 0.1);
//! let settings = SimulationSettings::new(20, 1.0 / 252.0).with_paths(1).with_seed(7);
//! let prices = simulate(100.0, &truth, &settings).unwrap().paths.path(0);
//!
//! let config = CalibrationConfig::default()
//!     .with_paths(1)
//!     .with_seed(7)
//!     .with_restarts(2)
//!     .with_max_iterations(5);
//! let result = MertonCalibrator::new(config)
//!     .calibrate(&prices, &ParameterBounds::merton_default(), 1.0 / 252.0)
//!     .unwrap();
//! assert!(ParameterBounds::merton_default().contains(&result.parameters));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use jd_core as core;

/// Distributions, random numbers, and optimization.
pub use jd_math as math;

/// Merton parameters and step dynamics.
pub use jd_processes as processes;

/// Time grids and Monte Carlo path simulation.
pub use jd_methods as methods;

/// Bounds, objective, and calibrator.
pub use jd_models as models;

/// Loading observed series from CSV.
pub mod series;
