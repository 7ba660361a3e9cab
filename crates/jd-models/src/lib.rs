//! # jd-models
//!
//! Calibration of the Merton jump-diffusion to an observed price series.
//!
//! ```text
//! MertonCalibrator ──(candidate x)──► OptimizationMethod (Powell, Simplex)
//!        │                                   │
//!        └──── ReturnObjective ◄─────────────┘
//!                    │
//!                    └──► PathSimulator (simulate)
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Calibration inputs ───────────────────────────────────────────────────
pub mod parameter_bounds;

// ── Objective ────────────────────────────────────────────────────────────
pub mod objective;

// ── Calibration driver and output ────────────────────────────────────────
pub mod calibration_result;
pub mod calibrator;

// ── Re-exports ───────────────────────────────────────────────────────────
pub use calibration_result::{CalibrationResult, CalibrationStatus};
pub use calibrator::{calibrate, CalibrationConfig, MertonCalibrator};
pub use objective::{score, ReturnObjective, PENALTY_VALUE};
pub use parameter_bounds::{Bound, ParameterBounds};
