//! Derivative-free optimization framework.
//!
//! Provides the scalar [`CostFunction`] seam, the [`BoxConstraint`] every
//! search must respect, [`EndCriteria`], and two interchangeable
//! [`OptimizationMethod`]s: Powell's direction-set method and a bounded
//! Nelder–Mead simplex.
//!
//! Methods never evaluate the cost outside the box: every trial point is
//! projected onto it before evaluation.

use crate::Array;
use jd_core::{ensure, errors::Result, Real, Size};
use std::cell::Cell;

pub mod line_search;
pub mod powell;
pub mod simplex;

pub use powell::Powell;
pub use simplex::Simplex;

// ── Cost function trait ───────────────────────────────────────────────────────

/// A scalar objective to be minimized.
pub trait CostFunction {
    /// Evaluate the cost at `x`.
    fn value(&self, x: &Array) -> Real;
}

impl<F> CostFunction for F
where
    F: Fn(&Array) -> Real,
{
    fn value(&self, x: &Array) -> Real {
        self(x)
    }
}

// ── Box constraint ────────────────────────────────────────────────────────────

/// Inclusive, finite per-coordinate bounds `lower[i] ≤ x[i] ≤ upper[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxConstraint {
    lower: Array,
    upper: Array,
}

impl BoxConstraint {
    /// Create a box from lower and upper corners.
    pub fn new(lower: Array, upper: Array) -> Result<Self> {
        ensure!(
            lower.len() == upper.len(),
            "bound dimensions differ: {} lower vs {} upper",
            lower.len(),
            upper.len()
        );
        for i in 0..lower.len() {
            ensure!(
                lower[i].is_finite() && upper[i].is_finite(),
                "bounds for coordinate {i} must be finite"
            );
            ensure!(
                lower[i] <= upper[i],
                "lower bound {} exceeds upper bound {} for coordinate {i}",
                lower[i],
                upper[i]
            );
        }
        Ok(Self { lower, upper })
    }

    /// Number of coordinates.
    pub fn size(&self) -> Size {
        self.lower.len()
    }

    /// Lower corner.
    pub fn lower(&self) -> &Array {
        &self.lower
    }

    /// Upper corner.
    pub fn upper(&self) -> &Array {
        &self.upper
    }

    /// Width of coordinate `i`.
    pub fn width(&self, i: Size) -> Real {
        self.upper[i] - self.lower[i]
    }

    /// `true` if `x` lies inside the box (bounds inclusive).
    pub fn test(&self, x: &Array) -> bool {
        x.len() == self.size()
            && x
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(&v, (&lo, &hi))| v >= lo && v <= hi)
    }

    /// Clamp `x` onto the box. Non-finite coordinates go to the lower bound.
    pub fn project(&self, x: &Array) -> Array {
        Array::from_fn(self.size(), |i, _| {
            let v = x[i];
            if v.is_nan() {
                self.lower[i]
            } else {
                v.clamp(self.lower[i], self.upper[i])
            }
        })
    }

    /// Feasible step interval `[t_min, t_max]` such that `x + t·d` stays in
    /// the box. Always contains 0 when `x` is feasible.
    pub fn line_bounds(&self, x: &Array, d: &Array) -> (Real, Real) {
        let mut t_min = Real::NEG_INFINITY;
        let mut t_max = Real::INFINITY;
        for i in 0..self.size() {
            if d[i] == 0.0 {
                continue;
            }
            let a = (self.lower[i] - x[i]) / d[i];
            let b = (self.upper[i] - x[i]) / d[i];
            t_min = t_min.max(a.min(b));
            t_max = t_max.min(a.max(b));
        }
        (t_min.min(0.0), t_max.max(0.0))
    }
}

// ── End criteria ──────────────────────────────────────────────────────────────

/// Criteria to stop an optimization.
#[derive(Debug, Clone)]
pub struct EndCriteria {
    /// Maximum number of outer iterations.
    pub max_iterations: Size,
    /// Maximum number of cost evaluations, if any.
    pub max_evaluations: Option<Size>,
    /// Relative function tolerance: stop when an iteration improves the
    /// cost by less than this fraction.
    pub function_epsilon: Real,
    /// Absolute tolerance on the line-search step.
    pub x_epsilon: Real,
    /// Stop as soon as the cost falls to or below this value.
    pub root_epsilon: Real,
}

impl EndCriteria {
    /// Create end criteria with no evaluation cap and a zero root epsilon.
    pub fn new(max_iterations: Size, function_epsilon: Real, x_epsilon: Real) -> Self {
        Self {
            max_iterations,
            max_evaluations: None,
            function_epsilon,
            x_epsilon,
            root_epsilon: 0.0,
        }
    }

    /// Cap the number of cost evaluations.
    pub fn with_max_evaluations(mut self, max_evaluations: Size) -> Self {
        self.max_evaluations = Some(max_evaluations);
        self
    }

    /// Stop once the cost reaches `root_epsilon`.
    pub fn with_root_epsilon(mut self, root_epsilon: Real) -> Self {
        self.root_epsilon = root_epsilon;
        self
    }
}

impl Default for EndCriteria {
    fn default() -> Self {
        Self::new(200, 1e-4, 1e-4)
    }
}

/// The reason an optimization terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCriteriaType {
    /// Maximum iterations reached.
    MaxIterations,
    /// Maximum cost evaluations reached.
    MaxEvaluations,
    /// Cost at or below root epsilon.
    RootEpsilon,
    /// Relative cost change below function epsilon.
    FunctionEpsilon,
}

impl EndCriteriaType {
    /// Whether the run stopped because a convergence test succeeded.
    pub fn is_converged(self) -> bool {
        matches!(self, Self::RootEpsilon | Self::FunctionEpsilon)
    }
}

/// Result of an optimization.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Final parameter values.
    pub x: Array,
    /// Final cost value.
    pub value: Real,
    /// Number of outer iterations performed.
    pub iterations: Size,
    /// Number of cost evaluations performed.
    pub evaluations: Size,
    /// Reason for termination.
    pub end_type: EndCriteriaType,
}

// ── Optimization method trait ─────────────────────────────────────────────────

/// A bounds-respecting local minimizer.
///
/// The calibrator only talks to this trait, so search strategies can be
/// swapped without touching the simulator or the objective.
pub trait OptimizationMethod: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Minimize `cost_fn` inside `constraint`, starting from
    /// `initial_values` (projected onto the box first).
    fn minimize(
        &self,
        cost_fn: &dyn CostFunction,
        constraint: &BoxConstraint,
        initial_values: &Array,
        end_criteria: &EndCriteria,
    ) -> Result<OptimizationResult>;
}

// ── Evaluation bookkeeping ────────────────────────────────────────────────────

/// Projects trial points, counts evaluations, and maps NaN to +∞ so that
/// comparisons inside the search stay well-ordered.
pub(crate) struct Evaluator<'a> {
    cost_fn: &'a dyn CostFunction,
    constraint: &'a BoxConstraint,
    evaluations: Cell<Size>,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(cost_fn: &'a dyn CostFunction, constraint: &'a BoxConstraint) -> Self {
        Self {
            cost_fn,
            constraint,
            evaluations: Cell::new(0),
        }
    }

    pub(crate) fn constraint(&self) -> &BoxConstraint {
        self.constraint
    }

    pub(crate) fn value(&self, x: &Array) -> Real {
        self.evaluations.set(self.evaluations.get() + 1);
        let v = self.cost_fn.value(&self.constraint.project(x));
        if v.is_nan() {
            Real::INFINITY
        } else {
            v
        }
    }

    pub(crate) fn evaluations(&self) -> Size {
        self.evaluations.get()
    }

    pub(crate) fn budget_exhausted(&self, end_criteria: &EndCriteria) -> bool {
        end_criteria
            .max_evaluations
            .is_some_and(|max| self.evaluations() >= max)
    }
}

pub(crate) fn check_dimensions(constraint: &BoxConstraint, initial_values: &Array) -> Result<()> {
    ensure!(constraint.size() > 0, "cannot optimize over zero parameters");
    ensure!(
        initial_values.len() == constraint.size(),
        "initial values have {} coordinates, bounds have {}",
        initial_values.len(),
        constraint.size()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(n: usize) -> BoxConstraint {
        BoxConstraint::new(Array::zeros(n), Array::from_element(n, 1.0)).unwrap()
    }

    #[test]
    fn box_rejects_inverted_or_infinite_bounds() {
        assert!(BoxConstraint::new(Array::from_vec(vec![1.0]), Array::from_vec(vec![0.0])).is_err());
        assert!(
            BoxConstraint::new(Array::from_vec(vec![0.0]), Array::from_vec(vec![f64::INFINITY]))
                .is_err()
        );
        assert!(BoxConstraint::new(Array::zeros(2), Array::zeros(1)).is_err());
    }

    #[test]
    fn box_test_is_inclusive() {
        let c = unit_box(2);
        assert!(c.test(&Array::from_vec(vec![0.0, 1.0])));
        assert!(!c.test(&Array::from_vec(vec![-1e-12, 0.5])));
        assert!(!c.test(&Array::from_vec(vec![0.5, 1.0 + 1e-12])));
    }

    #[test]
    fn projection_clamps() {
        let c = unit_box(3);
        let p = c.project(&Array::from_vec(vec![-2.0, 0.3, f64::NAN]));
        assert_eq!(p, Array::from_vec(vec![0.0, 0.3, 0.0]));
    }

    #[test]
    fn line_bounds_cover_feasible_segment() {
        let c = unit_box(2);
        let x = Array::from_vec(vec![0.25, 0.5]);
        let d = Array::from_vec(vec![1.0, -1.0]);
        // Backwards, coordinate 0 reaches its lower bound first; forwards,
        // coordinate 1 does.
        let (lo, hi) = c.line_bounds(&x, &d);
        assert!((lo + 0.25).abs() < 1e-15, "lo = {lo}");
        assert!((hi - 0.5).abs() < 1e-15, "hi = {hi}");

        let x = Array::from_vec(vec![0.75, 0.5]);
        let (lo, hi) = c.line_bounds(&x, &d);
        assert!((lo + 0.5).abs() < 1e-15, "lo = {lo}");
        assert!((hi - 0.25).abs() < 1e-15, "hi = {hi}");
        assert!(c.test(&(&x + &d * lo)) && c.test(&(&x + &d * hi)));
    }

    #[test]
    fn evaluator_counts_and_projects() {
        let c = unit_box(1);
        let f = |x: &Array| x[0];
        let e = Evaluator::new(&f, &c);
        assert_eq!(e.value(&Array::from_vec(vec![5.0])), 1.0);
        assert_eq!(e.evaluations(), 1);
        let nan = |_: &Array| f64::NAN;
        let e = Evaluator::new(&nan, &c);
        assert_eq!(e.value(&Array::zeros(1)), f64::INFINITY);
    }
}
