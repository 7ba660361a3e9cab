//! One-dimensional minimization on a closed interval.
//!
//! [`bounded_brent`] is Brent's method (golden-section steps with parabolic
//! interpolation) restricted to `[a, b]`. It never evaluates the end points,
//! which keeps the direction-set search strictly inside the box.

use jd_core::Real;

const GOLDEN: Real = 0.381_966_011_250_105_1; // (3 − √5) / 2

/// Minimize `f` over `[a, b]` to absolute tolerance `x_tolerance`.
///
/// Returns `(x_min, f(x_min), evaluations)`.
pub fn bounded_brent<F>(
    mut f: F,
    a: Real,
    b: Real,
    x_tolerance: Real,
    max_evaluations: usize,
) -> (Real, Real, usize)
where
    F: FnMut(Real) -> Real,
{
    let sqrt_eps = Real::EPSILON.sqrt();
    let (mut a, mut b) = (a, b);

    // v: previous value of w, w: second best, x: best so far.
    let mut v = a + GOLDEN * (b - a);
    let mut w = v;
    let mut x = v;
    let mut fx = f(x);
    let mut fv = fx;
    let mut fw = fx;
    let mut evaluations = 1;

    let mut d: Real = 0.0;
    let mut e: Real = 0.0;
    let mut xm = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * x.abs() + x_tolerance / 3.0;
    let mut tol2 = 2.0 * tol1;

    while (x - xm).abs() > tol2 - 0.5 * (b - a) {
        let mut golden = true;

        if e.abs() > tol1 {
            // Fit a parabola through x, w, v.
            let mut r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = d;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - x) && p < q * (b - x) {
                d = p / q;
                let u = x + d;
                if (u - a) < tol2 || (b - u) < tol2 {
                    d = tol1 * sign_or_one(xm - x);
                }
                golden = false;
            }
        }

        if golden {
            e = if x >= xm { a - x } else { b - x };
            d = GOLDEN * e;
        }

        let u = x + sign_or_one(d) * d.abs().max(tol1);
        let fu = f(u);
        evaluations += 1;

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }

        xm = 0.5 * (a + b);
        tol1 = sqrt_eps * x.abs() + x_tolerance / 3.0;
        tol2 = 2.0 * tol1;

        if evaluations >= max_evaluations {
            break;
        }
    }

    (x, fx, evaluations)
}

#[inline]
fn sign_or_one(x: Real) -> Real {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_minimum() {
        let (x, fx, _) = bounded_brent(|x| (x - 0.3).powi(2) + 1.0, -1.0, 2.0, 1e-8, 500);
        assert!((x - 0.3).abs() < 1e-6, "x = {x}");
        assert!((fx - 1.0).abs() < 1e-10);
    }

    #[test]
    fn minimum_at_boundary_stays_inside() {
        let (x, _, _) = bounded_brent(|x| x, 0.0, 1.0, 1e-6, 500);
        assert!(x > 0.0 && x < 1e-4, "x = {x}");
    }

    #[test]
    fn step_function() {
        // Non-smooth objectives still terminate and land on the low plateau.
        let (x, fx, n) = bounded_brent(|x| if x > 0.7 { 0.0 } else { 1.0 }, 0.0, 1.0, 1e-5, 500);
        assert!(x > 0.7 && fx == 0.0, "x = {x}");
        assert!(n < 500);
    }

    #[test]
    fn respects_evaluation_cap() {
        let (_, _, n) = bounded_brent(|x| x.sin(), 0.0, 100.0, 1e-12, 5);
        assert_eq!(n, 5);
    }
}
