//! Simulated price paths and their log-returns.

use jd_core::{Real, Size};
use jd_math::{Array, Matrix};

/// An ensemble of simulated price paths.
///
/// Row `i` is one trajectory; column `j` holds every path's price at time
/// point `j`. Storage is column-major, so a whole time slice is contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEnsemble {
    values: Matrix,
}

impl PathEnsemble {
    /// Wrap a `(n_paths, n_points)` price matrix.
    pub fn new(values: Matrix) -> Self {
        Self { values }
    }

    /// Number of paths (rows).
    pub fn n_paths(&self) -> Size {
        self.values.nrows()
    }

    /// Number of time steps (columns − 1).
    pub fn n_steps(&self) -> Size {
        self.values.ncols().saturating_sub(1)
    }

    /// `(n_paths, n_steps + 1)`.
    pub fn shape(&self) -> (Size, Size) {
        self.values.shape()
    }

    /// Price of path `path` at time point `step`.
    pub fn value(&self, path: Size, step: Size) -> Real {
        self.values[(path, step)]
    }

    /// One trajectory as a vector.
    pub fn path(&self, path: Size) -> Vec<Real> {
        self.values.row(path).iter().copied().collect()
    }

    /// Prices at the first time point.
    pub fn initial_values(&self) -> Array {
        self.values.column(0).clone_owned()
    }

    /// Prices at the last time point.
    pub fn terminal_values(&self) -> Array {
        self.values.column(self.values.ncols() - 1).clone_owned()
    }

    /// The underlying matrix.
    pub fn values(&self) -> &Matrix {
        &self.values
    }

    /// Consume and return the underlying matrix.
    pub fn into_inner(self) -> Matrix {
        self.values
    }

    /// Per-step log-returns, `ln(S[i, j+1] / S[i, j])`.
    ///
    /// Non-positive or overflowed prices produce non-finite entries; callers
    /// that need finite numbers must check.
    pub fn log_returns(&self) -> LogReturnEnsemble {
        let n_steps = self.n_steps();
        let mut returns = Matrix::zeros(self.n_paths(), n_steps);
        for j in 0..n_steps {
            let r = self
                .values
                .column(j + 1)
                .zip_map(&self.values.column(j), |next, prev| (next / prev).ln());
            returns.set_column(j, &r);
        }
        LogReturnEnsemble { values: returns }
    }
}

/// Log-returns of a [`PathEnsemble`], shape `(n_paths, n_steps)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogReturnEnsemble {
    values: Matrix,
}

impl LogReturnEnsemble {
    /// Number of paths.
    pub fn n_paths(&self) -> Size {
        self.values.nrows()
    }

    /// Number of returns per path.
    pub fn n_steps(&self) -> Size {
        self.values.ncols()
    }

    /// Return of path `path` over step `step`.
    pub fn value(&self, path: Size, step: Size) -> Real {
        self.values[(path, step)]
    }

    /// The underlying matrix.
    pub fn values(&self) -> &Matrix {
        &self.values
    }

    /// Sum over steps of `(r[i, j] − target[j])²`, one entry per path.
    ///
    /// # Panics
    /// Panics if `target.len() != self.n_steps()`.
    pub fn squared_errors(&self, target: &[Real]) -> Array {
        assert_eq!(
            target.len(),
            self.n_steps(),
            "target has {} returns, ensemble has {}",
            target.len(),
            self.n_steps()
        );
        let mut sse = Array::zeros(self.n_paths());
        for (column, &observed) in self.values.column_iter().zip(target) {
            sse.zip_apply(&column, |acc, r| {
                let e = r - observed;
                *acc += e * e;
            });
        }
        sse
    }
}
