//! Outcome of a calibration run.

use jd_core::{format_significant, Real, Size};
use jd_processes::{MertonParameter, MertonParameters};
use std::fmt;

/// Digits used when rendering fitted values.
const DISPLAY_DIGITS: usize = 6;

/// How the winning restart ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CalibrationStatus {
    /// The optimizer's convergence test succeeded.
    Converged,
    /// The iteration (or evaluation) budget ran out first. The parameters
    /// are still the best found.
    MaxIterExceeded,
    /// No restart produced a finite objective value.
    Failed,
}

impl CalibrationStatus {
    /// `true` for [`CalibrationStatus::Converged`].
    pub fn is_converged(self) -> bool {
        self == Self::Converged
    }
}

impl fmt::Display for CalibrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Converged => "converged",
            Self::MaxIterExceeded => "max iterations exceeded",
            Self::Failed => "failed",
        })
    }
}

/// Best-of-restarts calibration outcome.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationResult {
    /// Fitted parameters.
    pub parameters: MertonParameters,
    /// Objective value at `parameters`.
    pub objective_value: Real,
    /// Termination status of the winning restart.
    pub status: CalibrationStatus,
    /// Optimizer iterations of the winning restart.
    pub iterations: Size,
    /// Index of the winning restart.
    pub restart: Size,
    /// Objective evaluations of the winning restart.
    pub evaluations: Size,
    /// Seed of the simulations behind every objective evaluation.
    pub seed: u64,
}

impl fmt::Display for CalibrationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status : {}", self.status)?;
        writeln!(
            f,
            "Loss   : {}",
            format_significant(self.objective_value, DISPLAY_DIGITS)
        )?;
        for p in MertonParameter::ALL {
            writeln!(
                f,
                "{:7}: {}",
                p.name(),
                format_significant(self.parameters.get(p), DISPLAY_DIGITS)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let r = CalibrationResult {
            parameters: MertonParameters::new(0.0512345678, 0.2, 1.0, -0.05, 0.1),
            objective_value: 1.5e-7,
            status: CalibrationStatus::Converged,
            iterations: 12,
            restart: 3,
            evaluations: 900,
            seed: 42,
        };
        let text = r.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Status : converged");
        assert_eq!(lines[1], "Loss   : 1.5e-07");
        assert_eq!(lines[2], "mu     : 0.0512346");
        assert_eq!(lines[6], "sigma_j: 0.1");
    }

    #[test]
    fn status() {
        assert!(CalibrationStatus::Converged.is_converged());
        assert!(!CalibrationStatus::MaxIterExceeded.is_converged());
        assert_eq!(CalibrationStatus::Failed.to_string(), "failed");
    }
}
