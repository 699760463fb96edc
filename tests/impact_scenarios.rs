mod common;

use approx::assert_relative_eq;
use neorisk::{NeoRiskError, ObjectObservation, RiskLevel, SimulationConfig};

use crate::common::{
    assert_interval_invariants, close_object, engine, engine_with, far_object, grazing_object,
};

#[test]
fn far_object_is_safe_and_converges_early() {
    let result = engine(100_000).simulate_seeded(&far_object(), 42).unwrap();

    assert_eq!(result.impact_count, 0);
    assert_eq!(result.impact_probability, 0.0);
    assert!(result.converged);
    assert!(result.trials_run < 100_000);
    assert_eq!(result.convergence_trial, Some(1));
    assert_eq!(result.risk_level, RiskLevel::Low);

    // Wilson keeps a non-degenerate upper bound with zero hits.
    assert_eq!(result.confidence_interval_low, 0.0);
    assert!(result.confidence_interval_high > 0.0);
    assert!(result.safety_margin_km() > 0.0);
    assert_interval_invariants(&result);
}

#[test]
fn close_wide_object_is_riskier_than_far_object() {
    let far = engine(100_000).simulate_seeded(&far_object(), 42).unwrap();
    let close = engine(100_000).simulate_seeded(&close_object(), 42).unwrap();

    assert!(close.impact_probability > far.impact_probability);
    assert!(close.impact_probability > 0.5);
    assert_eq!(close.risk_level, RiskLevel::High);
    assert!(close.interval_width() >= far.interval_width() - 1e-12);
    assert!(close.safety_margin_km() < 0.0);
    assert_interval_invariants(&close);
}

#[test]
fn zero_trials_fails_at_statistics_step() {
    let err = engine(0).simulate_seeded(&far_object(), 42).unwrap_err();
    assert_eq!(err, NeoRiskError::InsufficientTrials);
}

#[test]
fn grazing_object_has_an_intermediate_probability() {
    let config = SimulationConfig::builder()
        .max_trials(200_000)
        .early_stop(false)
        .build()
        .unwrap();
    let result = engine_with(config)
        .simulate_seeded(&grazing_object(), 7)
        .unwrap();

    // Φ((r - μ)/σ) - Φ((-r - μ)/σ) with μ = 12 000 km, σ = 7 200 km, r ≈ 7 959 km
    assert_relative_eq!(result.impact_probability, 0.2846, max_relative = 0.02);
    assert_eq!(result.trials_run, 200_000);
    assert_eq!(result.risk_level, RiskLevel::High);
    assert!(result.relative_error.is_some());
    assert_interval_invariants(&result);
}

#[test]
fn sampled_distance_summary_follows_the_calibration() {
    let config = SimulationConfig::builder()
        .max_trials(100_000)
        .early_stop(false)
        .build()
        .unwrap();
    let obs = ObjectObservation::new("summary", 40_000.0, 20.0, 5, false);
    let result = engine_with(config).simulate_seeded(&obs, 2024).unwrap();

    assert_relative_eq!(result.sigma_km, 8_000.0);
    assert_relative_eq!(result.mean_miss_distance_km, 40_000.0, max_relative = 0.01);
    assert_relative_eq!(result.std_miss_distance_km, 8_000.0, max_relative = 0.02);
    assert!(result.min_miss_distance_km < result.mean_miss_distance_km);
    assert!(result.max_miss_distance_km > result.mean_miss_distance_km);
    assert_eq!(result.closest_approach_km(), result.min_miss_distance_km);
}

#[test]
fn convergence_curve_ends_at_the_final_estimate() {
    let config = SimulationConfig::builder()
        .max_trials(20_000)
        .early_stop(false)
        .build()
        .unwrap();
    let result = engine_with(config)
        .simulate_seeded(&grazing_object(), 3)
        .unwrap();

    let curve = &result.convergence_curve;
    let trials: Vec<usize> = curve.points.iter().map(|p| p.trials).collect();
    assert_eq!(trials, vec![100, 1_000, 10_000, 20_000]);

    let last = curve.points.last().unwrap();
    assert_eq!(last.probability, result.impact_probability);
    assert_eq!(last.percent_diff_from_final, Some(0.0));
}

#[test]
fn report_renders_every_section() {
    let result = engine(10_000).simulate_seeded(&close_object(), 1).unwrap();
    let report = format!("{result:#}");

    assert!(report.contains("IMPACT RISK REPORT: close-7"));
    assert!(report.contains("[Risk assessment]"));
    assert!(report.contains("HIGH"));
    assert!(format!("{result}").starts_with("close-7: p="));
}

#[test]
fn wider_spread_gives_strictly_wider_interval_at_equal_trials() {
    let config = SimulationConfig::builder()
        .max_trials(20_000)
        .early_stop(false)
        .build()
        .unwrap();
    let engine = engine_with(config);
    let far = engine.simulate_seeded(&far_object(), 42).unwrap();
    let grazing = engine.simulate_seeded(&grazing_object(), 42).unwrap();

    assert_eq!(far.trials_run, grazing.trials_run);
    assert!(grazing.impact_probability > 0.0 && grazing.impact_probability < 1.0);
    assert!(grazing.interval_width() > far.interval_width());
    // ~0.0125 against ~1.9e-4
    assert!(grazing.interval_width() > 10.0 * far.interval_width());
}

#[test]
fn unconverged_run_still_reports_estimate_and_interval() {
    let config = SimulationConfig::builder()
        .max_trials(5_000)
        .convergence_window(1_000)
        .convergence_tolerance(0.0)
        .build()
        .unwrap();
    let result = engine_with(config)
        .simulate_seeded(&grazing_object(), 13)
        .unwrap();

    assert!(!result.converged);
    assert_eq!(result.convergence_trial, None);
    assert_eq!(result.trials_run, 5_000);
    assert!(result.impact_probability > 0.2 && result.impact_probability < 0.4);
    assert!(result.interval_width() > 0.0);
    assert_interval_invariants(&result);
    assert!(format!("{result}").contains("not converged"));
}

#[test]
fn medium_risk_object_is_not_ranked_low_by_early_stop() {
    // μ = 15 700 km, σ = 2 355 km, r ≈ 7 960 km: p ≈ 5.1e-4
    let obs = ObjectObservation::new("medium-4", 15_700.0, 15.0, 4, false);
    let engine = engine_with(SimulationConfig::default());

    for seed in 0..6 {
        let result = engine.simulate_seeded(&obs, seed).unwrap();
        assert!(result.impact_count > 0, "seed {seed}: {result}");
        assert!(
            !(result.converged && result.risk_level == RiskLevel::Low),
            "seed {seed}: {result}"
        );
        assert!(result.confidence_interval_high > 1e-4, "seed {seed}: {result}");
        assert_interval_invariants(&result);
    }
}
