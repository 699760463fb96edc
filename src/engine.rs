//! # Impact engine
//!
//! [`ImpactEngine`] binds an immutable [`UncertaintyProfile`] and a validated
//! [`SimulationConfig`], and turns [`ObjectObservation`]s into [`SimulationResult`]s:
//!
//! 1. [`TrialRunner::run`] validates the row and executes the trials,
//! 2. [`estimate_probability`] derives the point estimate and the Wilson interval,
//! 3. the convergence verdict, distance summary and geometry are copied into the result.
//!
//! ## Reproducibility
//!
//! * [`ImpactEngine::simulate`] consumes the caller's generator.
//! * [`ImpactEngine::simulate_seeded`] builds a [`StdRng`] from an explicit seed.
//! * [`ImpactEngine::simulate_batch`] runs every object on its own task with a generator
//!   seeded from `(base_seed, neo_id)` (see [`object_seed`]), so an object's result does not
//!   depend on the batch it belongs to, its position in it, or the thread that ran it.
//!
//! The engine never shares a generator between objects and holds no mutable state, so one
//! engine can be used from several threads at once.
use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "progress")]
use std::time::Duration;

use crate::config::SimulationConfig;
use crate::constants::NeoId;
use crate::neorisk_errors::NeoRiskError;
use crate::observation::ObjectObservation;
use crate::result::{RiskLevel, SimulationResult};
use crate::runner::TrialRunner;
use crate::statistics::estimate_probability;
use crate::uncertainty::UncertaintyProfile;

/// Per-object outcomes of a batch, in input order.
pub type BatchOutcome = Vec<(NeoId, Result<SimulationResult, NeoRiskError>)>;

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

/// Stable per-object seed derived from a batch seed and the object identifier.
///
/// The value only depends on its two arguments (FNV-1a over the little-endian seed followed
/// by the identifier bytes), so it is identical across runs, platforms and batch layouts.
pub fn object_seed(base_seed: u64, neo_id: &str) -> u64 {
    let mut buf = Vec::with_capacity(8 + neo_id.len());
    buf.extend_from_slice(&base_seed.to_le_bytes());
    buf.extend_from_slice(neo_id.as_bytes());
    fnv1a64(&buf)
}

/// Monte Carlo impact-risk engine.
#[derive(Debug, Clone)]
pub struct ImpactEngine {
    profile: UncertaintyProfile,
    config: SimulationConfig,
}

impl ImpactEngine {
    /// Build an engine.
    ///
    /// Arguments
    /// -----------------
    /// * `profile`: Orbit-uncertainty calibration (already validated by construction).
    /// * `config`: Simulation parameters; validated again here so that hand-built or
    ///   deserialized configurations are rejected before any object is processed.
    ///
    /// Return
    /// ----------
    /// * The engine, or [`NeoRiskError::InvalidConfig`].
    pub fn new(
        profile: UncertaintyProfile,
        config: SimulationConfig,
    ) -> Result<Self, NeoRiskError> {
        config.validate()?;
        Ok(ImpactEngine { profile, config })
    }

    pub fn profile(&self) -> &UncertaintyProfile {
        &self.profile
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate one object with the caller's random generator.
    ///
    /// Arguments
    /// -----------------
    /// * `observation`: Close approach to evaluate.
    /// * `rng`: Random source; trials are drawn from it in order.
    ///
    /// Return
    /// ----------
    /// * The [`SimulationResult`], or
    ///   * a validation error raised before any trial ([`NeoRiskError::InvalidUncertaintyClass`],
    ///     [`NeoRiskError::InvalidVelocity`], [`NeoRiskError::InvalidMissDistance`],
    ///     [`NeoRiskError::InvalidObservation`], [`NeoRiskError::DegenerateVariance`]),
    ///   * [`NeoRiskError::InsufficientTrials`] if no trial was run.
    ///
    /// See also
    /// ------------
    /// * [`ImpactEngine::simulate_seeded`] – Same with an internally seeded generator.
    pub fn simulate(
        &self,
        observation: &ObjectObservation,
        rng: &mut impl Rng,
    ) -> Result<SimulationResult, NeoRiskError> {
        let run = TrialRunner::run(observation, &self.profile, &self.config, rng)?;

        let estimate = estimate_probability(
            run.impact_count,
            run.trials_run as u64,
            self.config.confidence_level,
        )?;
        let distances = run
            .distances
            .summary()
            .ok_or(NeoRiskError::InsufficientTrials)?;

        Ok(SimulationResult {
            neo_id: observation.neo_id.clone(),
            miss_distance_km: observation.miss_distance_km,
            velocity_km_s: observation.velocity_km_s,
            orbit_uncertainty: observation.orbit_uncertainty,
            is_potentially_hazardous: observation.is_potentially_hazardous,
            trials_run: run.trials_run,
            impact_count: run.impact_count,
            impact_probability: estimate.probability,
            confidence_interval_low: estimate.ci_low,
            confidence_interval_high: estimate.ci_high,
            confidence_level: self.config.confidence_level,
            standard_error: estimate.standard_error,
            relative_error: estimate.relative_error,
            converged: run.convergence.converged,
            convergence_trial: run.convergence.convergence_trial,
            mean_miss_distance_km: distances.mean_km,
            std_miss_distance_km: distances.std_km,
            min_miss_distance_km: distances.min_km,
            max_miss_distance_km: distances.max_km,
            sigma_km: run.sigma_km,
            critical_radius_km: run.critical_radius_km,
            focusing_factor: run.focusing_factor,
            risk_level: RiskLevel::from_probability(estimate.probability),
            convergence_curve: run.curve,
        })
    }

    /// Simulate one object with a [`StdRng`] seeded from `seed`.
    ///
    /// Two calls with the same observation, configuration and seed return identical results.
    pub fn simulate_seeded(
        &self,
        observation: &ObjectObservation,
        seed: u64,
    ) -> Result<SimulationResult, NeoRiskError> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.simulate(observation, &mut rng)
    }

    /// Simulate a batch of objects in parallel.
    ///
    /// Each object runs on its own rayon task with a generator seeded by
    /// [`object_seed(base_seed, neo_id)`](object_seed). Failures are collected per object and
    /// never abort the batch.
    ///
    /// Return
    /// ----------
    /// * One `(neo_id, outcome)` pair per input row, in input order.
    pub fn simulate_batch(
        &self,
        observations: &[ObjectObservation],
        base_seed: u64,
    ) -> BatchOutcome {
        #[cfg(feature = "progress")]
        let pb = {
            let pb = ProgressBar::new(observations.len().max(1) as u64);
            if let Ok(style) = ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {per_sec} | ETA {eta_precise}",
            ) {
                pb.set_style(style);
            }
            pb.enable_steady_tick(Duration::from_millis(200));
            pb
        };

        let outcomes: BatchOutcome = observations
            .par_iter()
            .map(|obs| {
                let outcome = self.simulate_seeded(obs, object_seed(base_seed, &obs.neo_id));
                #[cfg(feature = "progress")]
                pb.inc(1);
                (obs.neo_id.clone(), outcome)
            })
            .collect();

        #[cfg(feature = "progress")]
        pb.finish_and_clear();

        let mut failures = 0usize;
        let mut converged = 0usize;
        for (neo_id, outcome) in &outcomes {
            match outcome {
                Ok(result) if result.converged => converged += 1,
                Ok(_) => {}
                Err(err) => {
                    failures += 1;
                    warn!("{neo_id}: rejected ({err})");
                }
            }
        }
        info!(
            "batch of {} objects: {} simulated ({} converged), {} rejected",
            outcomes.len(),
            outcomes.len() - failures,
            converged,
            failures
        );

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(max_trials: usize) -> ImpactEngine {
        let config = SimulationConfig::builder()
            .max_trials(max_trials)
            .build()
            .unwrap();
        ImpactEngine::new(UncertaintyProfile::default(), config).unwrap()
    }

    #[test]
    fn fnv_reference_values() {
        assert_eq!(fnv1a64(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a64(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn object_seed_depends_on_both_inputs() {
        assert_eq!(object_seed(7, "2004 MN4"), object_seed(7, "2004 MN4"));
        assert_ne!(object_seed(7, "2004 MN4"), object_seed(8, "2004 MN4"));
        assert_ne!(object_seed(7, "2004 MN4"), object_seed(7, "2004 MN5"));
    }

    #[test]
    fn hand_built_invalid_config_is_rejected() {
        let config = SimulationConfig {
            confidence_level: 1.5,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            ImpactEngine::new(UncertaintyProfile::default(), config),
            Err(NeoRiskError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_trials_is_insufficient() {
        let obs = ObjectObservation::new("zero", 10_000.0, 10.0, 3, false);
        assert_eq!(
            engine(0).simulate_seeded(&obs, 1),
            Err(NeoRiskError::InsufficientTrials)
        );
    }

    #[test]
    fn result_echoes_input_and_geometry() {
        let obs = ObjectObservation::new("99942", 31_600.0, 7.4, 4, true);
        let result = engine(20_000).simulate_seeded(&obs, 2029).unwrap();

        assert_eq!(result.neo_id, "99942");
        assert!(result.is_potentially_hazardous);
        assert_eq!(result.orbit_uncertainty, 4);
        approx::assert_relative_eq!(result.sigma_km, 31_600.0 * 0.15);
        assert!(result.focusing_factor > 1.0);
        assert_eq!(
            result.risk_level,
            RiskLevel::from_probability(result.impact_probability)
        );
        assert!(result.min_miss_distance_km <= result.mean_miss_distance_km);
        assert!(result.mean_miss_distance_km <= result.max_miss_distance_km);
    }

    #[test]
    fn batch_keeps_input_order_and_collects_failures() {
        let observations = vec![
            ObjectObservation::new("a", 50_000.0, 12.0, 0, false),
            ObjectObservation::new("b", 10_000.0, 10.0, 12, false),
            ObjectObservation::new("c", 800.0, 6.0, 7, true),
        ];
        let outcomes = engine(5_000).simulate_batch(&observations, 99);

        let ids: Vec<&str> = outcomes.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(outcomes[0].1.is_ok());
        assert_eq!(
            outcomes[1].1,
            Err(NeoRiskError::InvalidUncertaintyClass(12))
        );
        assert!(outcomes[2].1.is_ok());
    }
}
