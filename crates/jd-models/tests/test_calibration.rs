//! Integration tests for the return-matching calibration.
//!
//! The end-to-end scenario generates a synthetic "observed" path with known
//! parameters and calibrates against it with the same seed and a single
//! path, so the objective is exactly zero at the generating parameters.

use jd_core::{Error, Real};
use jd_math::Simplex;
use jd_methods::{simulate, MertonPathSimulator, SimulationSettings};
use jd_models::{
    calibrate, score, Bound, CalibrationConfig, CalibrationStatus, MertonCalibrator,
    ParameterBounds, PENALTY_VALUE,
};
use jd_processes::MertonParameters;
use proptest::prelude::*;
use std::collections::HashMap;

const DT: Real = 1.0 / 252.0;

fn truth() -> MertonParameters {
    MertonParameters::new(0.05, 0.2, 1.0, -0.05, 0.1)
}

fn observed(n_steps: usize, seed: u64) -> Vec<Real> {
    let settings = SimulationSettings::new(n_steps, DT)
        .with_paths(1)
        .with_seed(seed);
    simulate(100.0, &truth(), &settings).unwrap().paths.path(0)
}

fn reasonable_bounds() -> ParameterBounds {
    ParameterBounds::from_pairs([
        ("mu", (-0.5, 0.5)),
        ("sigma", (0.01, 1.0)),
        ("lam", (0.0, 5.0)),
        ("mu_j", (-0.5, 0.5)),
        ("sigma_j", (0.01, 0.5)),
    ])
    .unwrap()
}

// ───────────────────────── end to end ─────────────────────────

#[test]
fn test_recovers_synthetic_parameters() {
    let prices = observed(252, 42);
    let bounds = reasonable_bounds();
    let config = CalibrationConfig::default()
        .with_paths(1)
        .with_seed(42)
        .with_restarts(8);
    let result = MertonCalibrator::new(config)
        .calibrate(&prices, &bounds, DT)
        .unwrap();

    assert_eq!(result.status, CalibrationStatus::Converged);
    assert_eq!(result.seed, 42);
    assert!(bounds.contains(&result.parameters));

    // Same seed and a single path: the loss is exactly zero at the
    // generating parameters, and the search gets there.
    assert!(
        result.objective_value < 1e-12,
        "loss {}, result:\n{result}",
        result.objective_value
    );

    // Drift and diffusive volatility are pinned by every one of the 252
    // returns.
    let p = result.parameters;
    let t = truth();
    assert!((p.mu - t.mu).abs() < 0.3 * t.mu.abs(), "mu = {}", p.mu);
    assert!((p.sigma - t.sigma).abs() < 0.3 * t.sigma, "sigma = {}", p.sigma);

    // lam, mu_j and sigma_j only enter through the few steps that carry a
    // jump, so several combinations fit them exactly. What must hold is
    // that the fitted jump parameters replay the observed path: the same
    // seed simulates the observed prices to within rounding.
    let settings = SimulationSettings::new(252, DT).with_paths(1).with_seed(42);
    let replayed = simulate(prices[0], &p, &settings).unwrap().paths.path(0);
    for (j, (fit, obs)) in replayed.iter().zip(&prices).enumerate() {
        assert!(
            ((fit - obs) / obs).abs() < 1e-5,
            "step {j}: fitted {fit} vs observed {obs}"
        );
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let prices = observed(30, 8);
    let bounds = reasonable_bounds();
    let config = CalibrationConfig::default()
        .with_paths(10)
        .with_seed(3)
        .with_restarts(3)
        .with_max_iterations(4);
    let parallel = MertonCalibrator::new(config.clone().parallel(true))
        .calibrate(&prices, &bounds, DT)
        .unwrap();
    let sequential = MertonCalibrator::new(config.parallel(false))
        .calibrate(&prices, &bounds, DT)
        .unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn test_initial_guess_is_used() {
    // One restart, one iteration: the run cannot wander far from the guess.
    let prices = observed(30, 8);
    let bounds = reasonable_bounds();
    let config = CalibrationConfig::default()
        .with_paths(1)
        .with_seed(8)
        .with_restarts(1)
        .with_max_iterations(1)
        .with_initial_guess(truth());
    let result = MertonCalibrator::new(config)
        .calibrate(&prices, &bounds, DT)
        .unwrap();
    assert_eq!(result.restart, 0);
    assert_eq!(result.objective_value, 0.0);
}

#[test]
fn test_simplex_can_replace_powell() {
    let prices = observed(40, 5);
    let bounds = reasonable_bounds();
    let config = CalibrationConfig::default()
        .with_paths(5)
        .with_seed(5)
        .with_restarts(2)
        .with_max_iterations(50);
    let result = MertonCalibrator::new(config)
        .with_method(Simplex::default())
        .calibrate(&prices, &bounds, DT)
        .unwrap();
    assert_ne!(result.status, CalibrationStatus::Failed);
    assert!(bounds.contains(&result.parameters));
    assert!(result.objective_value.is_finite());
}

#[test]
fn test_custom_simulator() {
    // A simulator that always fails drives every candidate to the penalty.
    let broken = |_: Real, _: &MertonParameters, _: &SimulationSettings| {
        Err::<jd_methods::PathEnsemble, _>(Error::Runtime("no paths today".into()))
    };
    let config = CalibrationConfig::default()
        .with_seed(1)
        .with_restarts(2)
        .with_max_iterations(2);
    let result = MertonCalibrator::new(config)
        .with_simulator(broken)
        .calibrate(&observed(10, 1), &reasonable_bounds(), DT)
        .unwrap();
    assert_eq!(result.status, CalibrationStatus::Failed);
    assert_eq!(result.objective_value, PENALTY_VALUE);
}

// ───────────────────────── failure semantics ─────────────────────────

#[test]
fn test_all_restarts_invalid_is_failed_status() {
    let bounds = reasonable_bounds()
        .with_bound(jd_processes::MertonParameter::Sigma, Bound::new(-0.5, -0.1))
        .unwrap();
    let config = CalibrationConfig::default()
        .with_paths(4)
        .with_seed(2)
        .with_restarts(3)
        .with_max_iterations(5);
    let result = MertonCalibrator::new(config)
        .calibrate(&observed(20, 2), &bounds, DT)
        .unwrap();
    assert_eq!(result.status, CalibrationStatus::Failed);
    assert_eq!(result.objective_value, PENALTY_VALUE);
    assert!(bounds.contains(&result.parameters));
}

#[test]
fn test_short_series_is_rejected() {
    let bounds = ParameterBounds::merton_default();
    for prices in [&[][..], &[100.0][..]] {
        assert!(matches!(
            calibrate(prices, &bounds, DT, 40, 5, 200),
            Err(Error::MalformedInput(_))
        ));
    }
    assert!(matches!(
        calibrate(&[100.0, -1.0, 100.0], &bounds, DT, 40, 5, 200),
        Err(Error::MalformedInput(_))
    ));
}

#[test]
fn test_missing_bound_is_rejected() {
    let mut map: HashMap<String, (Real, Real)> = HashMap::new();
    map.insert("mu".into(), (-1.0, 1.0));
    map.insert("sigma".into(), (1e-8, 3.0));
    map.insert("mu_j".into(), (-2.0, 2.0));
    map.insert("sigma_j".into(), (1e-8, 2.0));
    assert_eq!(
        ParameterBounds::from_map(&map),
        Err(Error::MissingBound("lam".into()))
    );
}

#[test]
fn test_sentinel_for_negative_sigma() {
    let prices = observed(20, 4);
    let s = score(
        &[0.05, -0.1, 1.0, -0.05, 0.1],
        &MertonPathSimulator,
        &prices,
        Some(4),
        50,
        DT,
        false,
    );
    assert_eq!(s, PENALTY_VALUE);
}

// ───────────────────────── properties ─────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_score_is_non_negative_or_penalty(
        mu in -2.0f64..2.0,
        sigma in -0.5f64..2.0,
        lam in -1.0f64..20.0,
        mu_j in -2.0f64..2.0,
        sigma_j in -0.5f64..2.0,
        seed in any::<u64>(),
        risk_neutral in any::<bool>(),
    ) {
        let prices = observed(15, 6);
        let s = score(
            &[mu, sigma, lam, mu_j, sigma_j],
            &MertonPathSimulator,
            &prices,
            Some(seed),
            8,
            DT,
            risk_neutral,
        );
        prop_assert!(s == PENALTY_VALUE || (s.is_finite() && s >= 0.0), "score {}", s);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn prop_result_respects_bounds(
        lows in prop::array::uniform5(0.0f64..0.3),
        widths in prop::array::uniform5(0.0f64..0.5),
        seed in any::<u64>(),
    ) {
        let bounds = ParameterBounds::new(
            Bound::new(lows[0] - 0.3, lows[0] - 0.3 + widths[0]),
            Bound::new(lows[1], lows[1] + widths[1]),
            Bound::new(lows[2], lows[2] + 10.0 * widths[2]),
            Bound::new(lows[3] - 0.3, lows[3] - 0.3 + widths[3]),
            Bound::new(lows[4], lows[4] + widths[4]),
        )
        .unwrap();
        let config = CalibrationConfig::default()
            .with_paths(3)
            .with_seed(seed)
            .with_restarts(2)
            .with_max_iterations(3)
            .with_max_jumps(20);
        let result = MertonCalibrator::new(config)
            .calibrate(&observed(12, 9), &bounds, DT)
            .unwrap();
        prop_assert!(bounds.contains(&result.parameters), "{}", result);
    }
}
