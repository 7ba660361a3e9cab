//! Uniform time grid.

use jd_core::{ensure, errors::Result, Size, Time};

/// `n_steps + 1` equally spaced time points `0, dt, 2·dt, …`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<Time>,
    dt: Time,
}

impl TimeGrid {
    /// Create a grid of `n_steps` intervals of length `dt`.
    pub fn new(n_steps: Size, dt: Time) -> Result<Self> {
        ensure!(dt.is_finite() && dt > 0.0, "dt must be positive, got {dt}");
        let times = (0..=n_steps).map(|i| i as Time * dt).collect();
        Ok(Self { times, dt })
    }

    /// Number of time points (= steps + 1).
    pub fn size(&self) -> Size {
        self.times.len()
    }

    /// Number of intervals.
    pub fn steps(&self) -> Size {
        self.times.len() - 1
    }

    /// Grid spacing.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// All time points.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Last time point (the horizon).
    pub fn back(&self) -> Time {
        self.times[self.times.len() - 1]
    }
}
