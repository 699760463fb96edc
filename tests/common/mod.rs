#![allow(dead_code)]

use neorisk::{ImpactEngine, ObjectObservation, SimulationConfig, SimulationResult, UncertaintyProfile};

/// Engine with the default calibration and the given trial ceiling.
pub fn engine(max_trials: usize) -> ImpactEngine {
    let config = SimulationConfig::builder()
        .max_trials(max_trials)
        .build()
        .unwrap();
    ImpactEngine::new(UncertaintyProfile::default(), config).unwrap()
}

pub fn engine_with(config: SimulationConfig) -> ImpactEngine {
    ImpactEngine::new(UncertaintyProfile::default(), config).unwrap()
}

/// Far, well-determined object: never inside the capture radius.
pub fn far_object() -> ObjectObservation {
    ObjectObservation::new("far-0", 50_000.0, 12.0, 0, false)
}

/// Very close, slow object with a wide positional spread.
pub fn close_object() -> ObjectObservation {
    ObjectObservation::new("close-7", 500.0, 5.0, 7, true)
}

/// Apophis-like 2029 flyby.
pub fn apophis() -> ObjectObservation {
    ObjectObservation::new("99942", 31_600.0, 7.4, 4, true)
}

/// Object whose spread straddles the capture radius.
pub fn grazing_object() -> ObjectObservation {
    ObjectObservation::new("grazer-9", 12_000.0, 15.0, 9, false)
}

pub fn assert_interval_invariants(result: &SimulationResult) {
    assert!(result.confidence_interval_low >= 0.0);
    assert!(result.confidence_interval_high <= 1.0);
    assert!(result.confidence_interval_low <= result.impact_probability);
    assert!(result.impact_probability <= result.confidence_interval_high);
    assert!(result.trials_run > 0);
    assert_eq!(
        result.impact_probability,
        result.impact_count as f64 / result.trials_run as f64
    );
}
