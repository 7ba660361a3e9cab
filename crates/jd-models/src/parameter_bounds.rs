//! Inclusive search bounds for the five Merton parameters.
//!
//! Bounds arrive from callers as a name → `(low, high)` mapping. Every one
//! of the five parameters must be present, names must be known, and each
//! range must be finite with `low ≤ high`; anything else is rejected before
//! a calibration starts.

use jd_core::{ensure_input, errors::Result, Error, Real};
use jd_math::{Array, BoxConstraint};
use jd_processes::{MertonParameter, MertonParameters};
use std::collections::HashMap;
use std::fmt;

/// An inclusive range `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bound {
    /// Lower end (inclusive).
    pub lower: Real,
    /// Upper end (inclusive).
    pub upper: Real,
}

impl Bound {
    /// Create a range. Validation happens when it is placed in
    /// [`ParameterBounds`].
    pub const fn new(lower: Real, upper: Real) -> Self {
        Self { lower, upper }
    }

    /// Whether `x` lies in the range.
    pub fn contains(&self, x: Real) -> bool {
        self.lower <= x && x <= self.upper
    }

    /// Clamp `x` into the range.
    pub fn clip(&self, x: Real) -> Real {
        x.clamp(self.lower, self.upper)
    }

    /// `upper − lower`.
    pub fn width(&self) -> Real {
        self.upper - self.lower
    }

    fn check(&self, p: MertonParameter) -> Result<()> {
        ensure_input!(
            self.lower.is_finite() && self.upper.is_finite(),
            "bound for {p} must be finite, got [{}, {}]",
            self.lower,
            self.upper
        );
        ensure_input!(
            self.lower <= self.upper,
            "bound for {p} has lower {} above upper {}",
            self.lower,
            self.upper
        );
        Ok(())
    }
}

impl From<(Real, Real)> for Bound {
    fn from((lower, upper): (Real, Real)) -> Self {
        Self::new(lower, upper)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

/// Validated bounds for every Merton parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterBounds {
    mu: Bound,
    sigma: Bound,
    lam: Bound,
    mu_j: Bound,
    sigma_j: Bound,
}

impl ParameterBounds {
    /// Build from one range per parameter.
    pub fn new(mu: Bound, sigma: Bound, lam: Bound, mu_j: Bound, sigma_j: Bound) -> Result<Self> {
        let bounds = Self {
            mu,
            sigma,
            lam,
            mu_j,
            sigma_j,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Wide default bounds:
    /// μ ∈ [-1, 1], σ ∈ [1e-8, 3], λ ∈ [1e-10, 10], μ_J ∈ [-2, 2],
    /// σ_J ∈ [1e-8, 2].
    pub fn merton_default() -> Self {
        Self {
            mu: Bound::new(-1.0, 1.0),
            sigma: Bound::new(1e-8, 3.0),
            lam: Bound::new(1e-10, 10.0),
            mu_j: Bound::new(-2.0, 2.0),
            sigma_j: Bound::new(1e-8, 2.0),
        }
    }

    /// Build from `(name, (low, high))` pairs.
    ///
    /// Names are parsed with [`MertonParameter::from_str`](std::str::FromStr),
    /// so `lambda` is accepted for `lam`.
    ///
    /// # Errors
    /// * [`Error::UnknownParameter`] for a name the model does not have;
    /// * [`Error::InvalidArgument`] when a parameter is given twice;
    /// * [`Error::MissingBound`] when a parameter is absent;
    /// * [`Error::MalformedInput`] for a non-finite or inverted range.
    pub fn from_pairs<I, K, B>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, B)>,
        K: AsRef<str>,
        B: Into<Bound>,
    {
        let mut slots: [Option<Bound>; 5] = [None; 5];
        for (name, bound) in pairs {
            let p: MertonParameter = name.as_ref().parse()?;
            let slot = &mut slots[p.index()];
            if slot.is_some() {
                return Err(Error::InvalidArgument(format!(
                    "bound for {p} given more than once"
                )));
            }
            *slot = Some(bound.into());
        }

        let mut resolved = [Bound::new(0.0, 0.0); 5];
        for p in MertonParameter::ALL {
            resolved[p.index()] =
                slots[p.index()].ok_or_else(|| Error::MissingBound(p.name().to_string()))?;
        }
        let [mu, sigma, lam, mu_j, sigma_j] = resolved;
        Self::new(mu, sigma, lam, mu_j, sigma_j)
    }

    /// Build from a name → `(low, high)` map.
    pub fn from_map(map: &HashMap<String, (Real, Real)>) -> Result<Self> {
        Self::from_pairs(map.iter().map(|(name, &range)| (name.as_str(), range)))
    }

    /// Replace the range of one parameter.
    pub fn with_bound(mut self, p: MertonParameter, bound: Bound) -> Result<Self> {
        bound.check(p)?;
        *self.slot_mut(p) = bound;
        Ok(self)
    }

    /// Range of parameter `p`.
    pub fn get(&self, p: MertonParameter) -> Bound {
        match p {
            MertonParameter::Mu => self.mu,
            MertonParameter::Sigma => self.sigma,
            MertonParameter::Lam => self.lam,
            MertonParameter::MuJ => self.mu_j,
            MertonParameter::SigmaJ => self.sigma_j,
        }
    }

    fn slot_mut(&mut self, p: MertonParameter) -> &mut Bound {
        match p {
            MertonParameter::Mu => &mut self.mu,
            MertonParameter::Sigma => &mut self.sigma,
            MertonParameter::Lam => &mut self.lam,
            MertonParameter::MuJ => &mut self.mu_j,
            MertonParameter::SigmaJ => &mut self.sigma_j,
        }
    }

    fn validate(&self) -> Result<()> {
        MertonParameter::ALL
            .iter()
            .try_for_each(|&p| self.get(p).check(p))
    }

    /// Lower corner in vector order.
    pub fn lower(&self) -> Array {
        Array::from_iterator(5, MertonParameter::ALL.iter().map(|&p| self.get(p).lower))
    }

    /// Upper corner in vector order.
    pub fn upper(&self) -> Array {
        Array::from_iterator(5, MertonParameter::ALL.iter().map(|&p| self.get(p).upper))
    }

    /// The bounds as an optimizer box.
    pub fn to_box_constraint(&self) -> Result<BoxConstraint> {
        BoxConstraint::new(self.lower(), self.upper())
    }

    /// Whether every parameter lies inside its range.
    pub fn contains(&self, params: &MertonParameters) -> bool {
        MertonParameter::ALL
            .iter()
            .all(|&p| self.get(p).contains(params.get(p)))
    }

    /// Clamp every parameter into its range.
    pub fn clip(&self, params: &MertonParameters) -> MertonParameters {
        MertonParameters::new(
            self.mu.clip(params.mu),
            self.sigma.clip(params.sigma),
            self.lam.clip(params.lam),
            self.mu_j.clip(params.mu_j),
            self.sigma_j.clip(params.sigma_j),
        )
    }
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self::merton_default()
    }
}

impl fmt::Display for ParameterBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in MertonParameter::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p} ∈ {}", self.get(*p))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs() -> Vec<(&'static str, (Real, Real))> {
        vec![
            ("mu", (-1.0, 1.0)),
            ("sigma", (1e-6, 2.0)),
            ("lam", (0.0, 10.0)),
            ("mu_j", (-2.0, 2.0)),
            ("sigma_j", (1e-3, 2.0)),
        ]
    }

    #[test]
    fn from_pairs_in_any_order() {
        let mut p = pairs();
        p.reverse();
        let b = ParameterBounds::from_pairs(p).unwrap();
        assert_eq!(b.get(MertonParameter::Sigma), Bound::new(1e-6, 2.0));
        assert_eq!(b.lower()[2], 0.0);
        assert_eq!(b.upper()[4], 2.0);
    }

    #[test]
    fn lambda_alias() {
        let mut p = pairs();
        p[2].0 = "lambda";
        assert!(ParameterBounds::from_pairs(p).is_ok());
    }

    #[test]
    fn missing_bound() {
        let p: Vec<_> = pairs().into_iter().filter(|(n, _)| *n != "sigma_j").collect();
        assert_eq!(
            ParameterBounds::from_pairs(p),
            Err(Error::MissingBound("sigma_j".into()))
        );
    }

    #[test]
    fn unknown_and_duplicate_names() {
        let mut p = pairs();
        p.push(("kappa", (0.0, 1.0)));
        assert_eq!(
            ParameterBounds::from_pairs(p),
            Err(Error::UnknownParameter("kappa".into()))
        );

        let mut p = pairs();
        p.push(("mu", (0.0, 1.0)));
        assert!(matches!(
            ParameterBounds::from_pairs(p),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn inverted_and_infinite_ranges() {
        let mut p = pairs();
        p[1].1 = (2.0, 1.0);
        assert!(matches!(
            ParameterBounds::from_pairs(p),
            Err(Error::MalformedInput(_))
        ));

        let mut p = pairs();
        p[0].1 = (Real::NEG_INFINITY, 1.0);
        assert!(matches!(
            ParameterBounds::from_pairs(p),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn from_map() {
        let map: HashMap<String, (Real, Real)> =
            pairs().into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        let b = ParameterBounds::from_map(&map).unwrap();
        assert_eq!(b, ParameterBounds::from_pairs(pairs()).unwrap());
    }

    #[test]
    fn contains_and_clip() {
        let b = ParameterBounds::merton_default();
        let inside = MertonParameters::new(0.05, 0.2, 1.0, -0.05, 0.1);
        assert!(b.contains(&inside));

        let outside = MertonParameters::new(3.0, -1.0, 50.0, -0.05, 0.1);
        assert!(!b.contains(&outside));
        let clipped = b.clip(&outside);
        assert!(b.contains(&clipped));
        assert_eq!(clipped.mu, 1.0);
        assert_eq!(clipped.sigma, 1e-8);
        assert_eq!(clipped.lam, 10.0);
    }

    #[test]
    fn with_bound_validates() {
        let b = ParameterBounds::merton_default();
        let tight = b
            .with_bound(MertonParameter::Lam, Bound::new(0.5, 2.0))
            .unwrap();
        assert_eq!(tight.get(MertonParameter::Lam).width(), 1.5);
        assert!(b
            .with_bound(MertonParameter::Lam, Bound::new(2.0, 0.5))
            .is_err());
    }

    #[test]
    fn box_constraint_matches() {
        let c = ParameterBounds::merton_default().to_box_constraint().unwrap();
        assert_eq!(c.size(), 5);
        assert_eq!(c.lower()[1], 1e-8);
        assert_eq!(c.upper()[3], 2.0);
    }
}
