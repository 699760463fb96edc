//! # Trial runner
//!
//! Executes the Monte Carlo trials of a single object:
//!
//! 1. validate the configuration and the observation, then resolve the positional spread
//!    from the [`UncertaintyProfile`],
//! 2. build the Gaussian [`MissDistanceSampler`] and the [`ImpactCriterion`] once,
//! 3. draw trials one after the other, feeding the hit counter, the
//!    [`StreamingStats`] of sampled distances, the [`ConvergenceTracker`] and the
//!    [`ConvergenceCurve`] checkpoints,
//! 4. stop at `max_trials`, or earlier once convergence is declared when `early_stop` is set.
//!
//! Trials are consumed in a fixed order from the supplied generator, so the sequence of
//! outcomes and the stopping point are fully determined by the generator state. Memory use
//! does not depend on the number of trials: no individual sample is kept.
use log::debug;
use rand::Rng;

use crate::config::SimulationConfig;
use crate::constants::Kilometer;
use crate::convergence::{ConvergenceCurve, ConvergenceTracker, ConvergenceVerdict};
use crate::impact::ImpactCriterion;
use crate::neorisk_errors::NeoRiskError;
use crate::observation::ObjectObservation;
use crate::sampler::MissDistanceSampler;
use crate::statistics::StreamingStats;
use crate::uncertainty::UncertaintyProfile;

/// Raw outcome of the trial loop for one object, before probability estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRun {
    pub impact_count: u64,
    /// Number of trials actually executed (`<= max_trials`).
    pub trials_run: usize,
    pub sigma_km: Kilometer,
    pub critical_radius_km: Kilometer,
    pub focusing_factor: f64,
    pub distances: StreamingStats,
    pub convergence: ConvergenceVerdict,
    pub curve: ConvergenceCurve,
}

impl TrialRun {
    /// Running estimate at the end of the run, `None` if no trial was executed.
    pub fn running_estimate(&self) -> Option<f64> {
        (self.trials_run > 0).then(|| self.impact_count as f64 / self.trials_run as f64)
    }
}

/// Sequential Monte Carlo driver.
pub struct TrialRunner;

impl TrialRunner {
    /// Run the trials of one object.
    ///
    /// Arguments
    /// -----------------
    /// * `observation`: Close approach to simulate; validated before the first trial.
    /// * `profile`: Orbit-uncertainty calibration.
    /// * `config`: Trial ceiling, convergence window/tolerance, Earth constants.
    /// * `rng`: Random source owned by this object's task.
    ///
    /// Return
    /// ----------
    /// * The [`TrialRun`] counters, or a validation error
    ///   ([`NeoRiskError::InvalidConfig`], [`NeoRiskError::InvalidUncertaintyClass`],
    ///   [`NeoRiskError::InvalidVelocity`], [`NeoRiskError::InvalidMissDistance`], …) raised
    ///   before any trial executes.
    ///
    /// Notes
    /// ----------
    /// * `max_trials == 0` is not an error here: the returned run has `trials_run == 0` and
    ///   the statistics step reports [`NeoRiskError::InsufficientTrials`].
    /// * Early termination never happens before one full `convergence_window` of trials.
    pub fn run(
        observation: &ObjectObservation,
        profile: &UncertaintyProfile,
        config: &SimulationConfig,
        rng: &mut impl Rng,
    ) -> Result<TrialRun, NeoRiskError> {
        config.validate()?;
        observation.validate()?;

        let sigma_km =
            profile.sigma_km(observation.orbit_uncertainty, observation.miss_distance_km)?;
        let criterion = ImpactCriterion::new(
            observation.velocity_km_s,
            config.earth_radius_km,
            config.earth_escape_velocity_km_s,
        )?;
        let sampler = MissDistanceSampler::new(observation.miss_distance_km, sigma_km)?;

        let mut checkpoints = config.curve_checkpoints.clone();
        checkpoints.sort_unstable();
        checkpoints.dedup();
        let mut checkpoints = checkpoints.into_iter().peekable();

        let mut tracker =
            ConvergenceTracker::new(config.convergence_window, config.convergence_tolerance);
        let mut distances = StreamingStats::new();
        let mut curve = ConvergenceCurve::default();
        let mut impact_count: u64 = 0;
        let mut trials_run: usize = 0;

        while trials_run < config.max_trials {
            let distance = sampler.sample(rng);
            distances.push(distance);
            if criterion.is_impact(distance) {
                impact_count += 1;
            }
            trials_run += 1;

            let estimate = impact_count as f64 / trials_run as f64;
            if checkpoints.next_if_eq(&trials_run).is_some() {
                curve.record(trials_run, estimate);
            }

            if let Some(verdict) = tracker.observe(estimate) {
                debug!(
                    "{}: converged at trial {:?} (declared at {trials_run}, p = {estimate:.3e})",
                    observation.neo_id, verdict.convergence_trial
                );
                if config.early_stop {
                    break;
                }
            }
        }

        if !tracker.is_converged() && trials_run > 0 {
            debug!(
                "{}: no convergence after {trials_run} trials (window = {}, tol = {:.1e})",
                observation.neo_id, config.convergence_window, config.convergence_tolerance
            );
        }

        if trials_run > 0 {
            curve.finish(trials_run, impact_count as f64 / trials_run as f64);
        }

        Ok(TrialRun {
            impact_count,
            trials_run,
            sigma_km,
            critical_radius_km: criterion.critical_radius_km(),
            focusing_factor: criterion.focusing_factor(),
            distances,
            convergence: tracker.verdict(),
            curve,
        })
    }
}
