//! Powell's conjugate-direction method with box constraints.
//!
//! Each iteration runs a bounded line search along every direction in the
//! set, then tries the net displacement of the iteration as a new direction,
//! replacing the direction of largest decrease when Powell's test accepts
//! it. No gradients are used, so the method tolerates the piecewise-smooth,
//! simulation-based objectives the calibrator feeds it.

use super::line_search::bounded_brent;
use super::{
    check_dimensions, BoxConstraint, CostFunction, EndCriteria, EndCriteriaType, Evaluator,
    OptimizationMethod, OptimizationResult,
};
use crate::{Array, Matrix};
use jd_core::{errors::Result, Real};

/// Evaluation cap for a single line search.
const LINE_SEARCH_EVALUATIONS: usize = 500;

/// Powell's direction-set minimizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Powell;

impl Powell {
    /// Create a Powell optimizer.
    pub fn new() -> Self {
        Self
    }
}

impl OptimizationMethod for Powell {
    fn name(&self) -> &'static str {
        "powell"
    }

    fn minimize(
        &self,
        cost_fn: &dyn CostFunction,
        constraint: &BoxConstraint,
        initial_values: &Array,
        end_criteria: &EndCriteria,
    ) -> Result<OptimizationResult> {
        check_dimensions(constraint, initial_values)?;
        let n = initial_values.len();
        let eval = Evaluator::new(cost_fn, constraint);

        let mut x = constraint.project(initial_values);
        let mut fval = eval.value(&x);
        let mut directions = Matrix::identity(n, n);
        let mut x_start = x.clone();
        let mut iterations = 0;

        let end_type = loop {
            if fval <= end_criteria.root_epsilon {
                break EndCriteriaType::RootEpsilon;
            }

            let f_start = fval;
            let mut largest_drop = 0.0;
            let mut largest_index = 0;

            for i in 0..n {
                let direction = directions.column(i).clone_owned();
                let before = fval;
                let (f_new, x_new, _) = line_minimize(&eval, &x, &direction, fval, end_criteria);
                fval = f_new;
                x = x_new;
                if before - fval > largest_drop {
                    largest_drop = before - fval;
                    largest_index = i;
                }
            }
            iterations += 1;

            let bound = end_criteria.function_epsilon * (f_start.abs() + fval.abs()) + 1e-20;
            if 2.0 * (f_start - fval) <= bound {
                break EndCriteriaType::FunctionEpsilon;
            }
            if eval.budget_exhausted(end_criteria) {
                break EndCriteriaType::MaxEvaluations;
            }
            if iterations >= end_criteria.max_iterations {
                break EndCriteriaType::MaxIterations;
            }

            // Extrapolate along the net displacement of this iteration.
            let displacement = &x - &x_start;
            x_start = x.clone();
            let (_, t_max) = constraint.line_bounds(&x, &displacement);
            let x_extra = &x + &displacement * t_max.min(1.0);
            let f_extra = eval.value(&x_extra);

            if f_start > f_extra {
                let a = f_start - fval - largest_drop;
                let b = f_start - f_extra;
                let t = 2.0 * (f_start + f_extra - 2.0 * fval) * a * a - largest_drop * b * b;
                if t < 0.0 {
                    let (f_new, x_new, step) =
                        line_minimize(&eval, &x, &displacement, fval, end_criteria);
                    fval = f_new;
                    x = x_new;
                    if step.iter().any(|&s| s != 0.0) {
                        let last = directions.column(n - 1).clone_owned();
                        directions.set_column(largest_index, &last);
                        directions.set_column(n - 1, &step);
                    }
                }
            }
        };

        Ok(OptimizationResult {
            x,
            value: fval,
            iterations,
            evaluations: eval.evaluations(),
            end_type,
        })
    }
}

/// Minimize along `direction` from `x` inside the box.
///
/// Returns the new value, the new point, and the step taken. The point only
/// moves when the line search strictly improves on `fval`.
fn line_minimize(
    eval: &Evaluator<'_>,
    x: &Array,
    direction: &Array,
    fval: Real,
    end_criteria: &EndCriteria,
) -> (Real, Array, Array) {
    let no_move = || (fval, x.clone(), Array::zeros(x.len()));
    if direction.iter().all(|&d| d == 0.0) {
        return no_move();
    }
    let (t_min, t_max) = eval.constraint().line_bounds(x, direction);
    if t_max.is_nan() || t_max <= t_min {
        return no_move();
    }

    let (t, f_t, _) = bounded_brent(
        |t| eval.value(&(x + direction * t)),
        t_min,
        t_max,
        end_criteria.x_epsilon,
        LINE_SEARCH_EVALUATIONS,
    );
    if f_t < fval {
        let step = direction * t;
        let moved = eval.constraint().project(&(x + &step));
        let step = &moved - x;
        (f_t, moved, step)
    } else {
        no_move()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_box(n: usize, lo: Real, hi: Real) -> BoxConstraint {
        BoxConstraint::new(Array::from_element(n, lo), Array::from_element(n, hi)).unwrap()
    }

    #[test]
    fn quadratic_bowl() {
        let f = |x: &Array| (x[0] - 1.0).powi(2) + 4.0 * (x[1] + 0.5).powi(2) + 3.0;
        let ec = EndCriteria::new(100, 1e-12, 1e-8);
        let r = Powell::new()
            .minimize(&f, &square_box(2, -5.0, 5.0), &Array::zeros(2), &ec)
            .unwrap();
        assert!((r.x[0] - 1.0).abs() < 1e-4, "x = {}", r.x);
        assert!((r.x[1] + 0.5).abs() < 1e-4, "x = {}", r.x);
        assert!(r.end_type.is_converged());
    }

    #[test]
    fn rosenbrock() {
        let f = |x: &Array| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let ec = EndCriteria::new(1000, 1e-14, 1e-10);
        let r = Powell::new()
            .minimize(&f, &square_box(2, -2.0, 2.0), &Array::from_vec(vec![-1.2, 1.0]), &ec)
            .unwrap();
        assert!((r.x[0] - 1.0).abs() < 1e-2, "x = {}", r.x);
        assert!((r.x[1] - 1.0).abs() < 2e-2, "x = {}", r.x);
    }

    #[test]
    fn active_bound() {
        // Unconstrained minimum at (-3, 2) lies outside the box.
        let f = |x: &Array| (x[0] + 3.0).powi(2) + (x[1] - 2.0).powi(2);
        let ec = EndCriteria::new(100, 1e-12, 1e-9);
        let r = Powell::new()
            .minimize(&f, &square_box(2, 0.0, 1.0), &Array::from_vec(vec![0.5, 0.5]), &ec)
            .unwrap();
        assert!(r.x[0] >= 0.0 && r.x[0] < 1e-4, "x = {}", r.x);
        assert!(r.x[1] <= 1.0 && r.x[1] > 1.0 - 1e-4, "x = {}", r.x);
    }

    #[test]
    fn never_evaluates_outside_box() {
        let c = square_box(3, -1.0, 1.0);
        let f = |x: &Array| {
            assert!(x.iter().all(|v| (-1.0..=1.0).contains(v)), "left the box: {x}");
            x.iter().map(|v| (v - 2.0).powi(2)).sum::<Real>()
        };
        let r = Powell::new()
            .minimize(&f, &c, &Array::from_vec(vec![5.0, -5.0, 0.0]), &EndCriteria::default())
            .unwrap();
        assert!(c.test(&r.x));
    }

    #[test]
    fn iteration_cap_reported() {
        let f = |x: &Array| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let ec = EndCriteria::new(1, 1e-14, 1e-10);
        let r = Powell::new()
            .minimize(&f, &square_box(2, -2.0, 2.0), &Array::from_vec(vec![-1.2, 1.0]), &ec)
            .unwrap();
        assert_eq!(r.end_type, EndCriteriaType::MaxIterations);
        assert_eq!(r.iterations, 1);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let f = |x: &Array| x[0];
        let r = Powell::new().minimize(
            &f,
            &square_box(2, 0.0, 1.0),
            &Array::zeros(3),
            &EndCriteria::default(),
        );
        assert!(r.is_err());
    }
}
