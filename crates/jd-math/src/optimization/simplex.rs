//! Nelder–Mead simplex restricted to a box.
//!
//! Reflection and expansion points that leave the box are scored +∞ without
//! being evaluated; contractions and shrinks are convex combinations of
//! feasible vertices and so stay inside.

use super::{
    check_dimensions, BoxConstraint, CostFunction, EndCriteria, EndCriteriaType, Evaluator,
    OptimizationMethod, OptimizationResult,
};
use crate::Array;
use jd_core::{errors::Result, Real};

/// Bounded Nelder–Mead simplex optimizer.
#[derive(Debug, Clone, Copy)]
pub struct Simplex {
    lambda: Real,
}

impl Simplex {
    /// Create a simplex whose initial edge along coordinate `i` is
    /// `lambda` times the width of the box in that coordinate.
    pub fn new(lambda: Real) -> Self {
        Self { lambda }
    }
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl OptimizationMethod for Simplex {
    fn name(&self) -> &'static str {
        "simplex"
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
        let np1 = n + 1;
        let eval = Evaluator::new(cost_fn, constraint);
        let feasible_value = |x: &Array| {
            if constraint.test(x) {
                eval.value(x)
            } else {
                Real::INFINITY
            }
        };

        let x0 = constraint.project(initial_values);
        let mut vertices: Vec<Array> = Vec::with_capacity(np1);
        vertices.push(x0.clone());
        for i in 0..n {
            let step = self.lambda * constraint.width(i);
            let mut v = x0.clone();
            v[i] += step;
            if v[i] > constraint.upper()[i] {
                v[i] = x0[i] - step;
            }
            vertices.push(constraint.project(&v));
        }
        let mut values: Vec<Real> = vertices.iter().map(|v| eval.value(v)).collect();

        let mut iterations = 0;
        loop {
            // Best, worst, second-worst.
            let (mut ilo, mut ihi, mut inhi) = (0usize, 0usize, 0usize);
            for i in 0..np1 {
                if values[i] < values[ilo] {
                    ilo = i;
                }
                if values[i] > values[ihi] {
                    inhi = ihi;
                    ihi = i;
                } else if i != ihi && values[i] > values[inhi] {
                    inhi = i;
                }
            }
            if ihi == inhi {
                inhi = if ihi == 0 { 1 } else { 0 };
                for i in 0..np1 {
                    if i != ihi && values[i] > values[inhi] {
                        inhi = i;
                    }
                }
            }

            let finish = |end_type| OptimizationResult {
                x: vertices[ilo].clone(),
                value: values[ilo],
                iterations,
                evaluations: eval.evaluations(),
                end_type,
            };

            if values[ilo] <= end_criteria.root_epsilon {
                return Ok(finish(EndCriteriaType::RootEpsilon));
            }
            let spread = (values[ihi] - values[ilo]).abs();
            let scale = values[ihi].abs() + values[ilo].abs();
            if spread.is_finite() && spread <= end_criteria.function_epsilon * scale + 1e-20 {
                return Ok(finish(EndCriteriaType::FunctionEpsilon));
            }
            if eval.budget_exhausted(end_criteria) {
                return Ok(finish(EndCriteriaType::MaxEvaluations));
            }
            if iterations >= end_criteria.max_iterations {
                return Ok(finish(EndCriteriaType::MaxIterations));
            }
            iterations += 1;

            // Centroid of all but the worst vertex.
            let mut centroid = Array::zeros(n);
            for (i, v) in vertices.iter().enumerate() {
                if i != ihi {
                    centroid += v;
                }
            }
            centroid /= n as Real;

            let reflected = &centroid * 2.0 - &vertices[ihi];
            let fr = feasible_value(&reflected);

            if fr < values[ilo] {
                let expanded = &reflected * 2.0 - &centroid;
                let fe = feasible_value(&expanded);
                if fe < fr {
                    vertices[ihi] = expanded;
                    values[ihi] = fe;
                } else {
                    vertices[ihi] = reflected;
                    values[ihi] = fr;
                }
            } else if fr < values[inhi] {
                vertices[ihi] = reflected;
                values[ihi] = fr;
            } else {
                let contracted = if fr < values[ihi] {
                    (&centroid + &reflected) * 0.5
                } else {
                    (&centroid + &vertices[ihi]) * 0.5
                };
                let fc = feasible_value(&contracted);
                if fc < values[ihi].min(fr) {
                    vertices[ihi] = contracted;
                    values[ihi] = fc;
                } else {
                    let best = vertices[ilo].clone();
                    for i in 0..np1 {
                        if i != ilo {
                            vertices[i] = (&best + &vertices[i]) * 0.5;
                            values[i] = eval.value(&vertices[i]);
                        }
                    }
                }
            }
        }
    }
}
