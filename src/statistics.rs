//! # Statistics estimator
//!
//! Turns the counters accumulated by the [`TrialRunner`](crate::runner::TrialRunner) into
//! an impact probability with its uncertainty, and summarizes the sampled miss distances.
//!
//! Components
//! -----------------
//! * [`StreamingStats`] – bounded-memory accumulator (count, shifted sum, shifted sum of
//!   squares, min, max) fed with every sampled distance.
//! * [`DistanceSummary`] – mean / standard deviation / min / max extracted from it.
//! * [`z_score`] – two-sided standard normal quantile for a confidence level.
//! * [`wilson_interval`] – Wilson score interval for a binomial proportion.
//! * [`estimate_probability`] – point estimate, interval and standard errors in one call.
//!
//! Wilson interval
//! -----------------
//! For `p̂ = k / n` and `z` the two-sided quantile:
//!
//! ```text
//! center     = (p̂ + z²/(2n)) / (1 + z²/n)
//! half_width = z / (1 + z²/n) · sqrt(p̂(1 − p̂)/n + z²/(4n²))
//! [low, high] = [center − half_width, center + half_width] ∩ [0, 1]
//! ```
//!
//! Unlike the naive normal approximation, the interval keeps a non-zero width when
//! `k = 0` or `k = n`.
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::constants::{Kilometer, Probability};
use crate::neorisk_errors::NeoRiskError;

/// Streaming aggregate of sampled miss distances.
///
/// Sums are accumulated relative to the first sample to limit cancellation when the spread
/// is small compared to the nominal distance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StreamingStats {
    count: u64,
    shift: f64,
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
}

impl StreamingStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, x: f64) {
        if self.count == 0 {
            self.shift = x;
            self.min = x;
            self.max = x;
        } else {
            self.min = self.min.min(x);
            self.max = self.max.max(x);
        }
        let d = x - self.shift;
        self.count += 1;
        self.sum += d;
        self.sum_sq += d * d;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.shift + self.sum / self.count as f64)
    }

    /// Population standard deviation of the pushed samples.
    pub fn std_dev(&self) -> Option<f64> {
        (self.count > 0).then(|| {
            let n = self.count as f64;
            ((self.sum_sq - self.sum * self.sum / n) / n).max(0.0).sqrt()
        })
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    /// Summary of the samples, or `None` if nothing was pushed.
    pub fn summary(&self) -> Option<DistanceSummary> {
        Some(DistanceSummary {
            mean_km: self.mean()?,
            std_km: self.std_dev()?,
            min_km: self.min()?,
            max_km: self.max()?,
        })
    }
}

/// Distribution summary of the sampled miss distances of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceSummary {
    pub mean_km: Kilometer,
    pub std_km: Kilometer,
    pub min_km: Kilometer,
    pub max_km: Kilometer,
}

/// Point estimate and uncertainty of an impact probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactEstimate {
    pub probability: Probability,
    pub ci_low: Probability,
    pub ci_high: Probability,
    /// Two-sided normal quantile used for the interval.
    pub z: f64,
    /// `sqrt(p̂(1 − p̂)/n)`
    pub standard_error: f64,
    /// `standard_error / p̂`, undefined when `p̂ = 0`.
    pub relative_error: Option<f64>,
}

/// Two-sided standard normal quantile for `confidence_level` (1.96 for 0.95).
///
/// Return
/// ----------
/// * `z` such that `P(|Z| ≤ z) = confidence_level`, or
/// * [`NeoRiskError::InvalidConfig`] if the level is outside `(0, 1)`,
/// * [`NeoRiskError::InvalidQuantile`] if the normal distribution cannot be built.
pub fn z_score(confidence_level: f64) -> Result<f64, NeoRiskError> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(NeoRiskError::InvalidConfig(
            "confidence_level must be in (0, 1)".into(),
        ));
    }
    let std_normal =
        Normal::new(0.0, 1.0).map_err(|e| NeoRiskError::InvalidQuantile(e.to_string()))?;
    Ok(std_normal.inverse_cdf(0.5 + confidence_level / 2.0))
}

/// Wilson score interval for `impact_count` successes out of `trials_run`.
///
/// Arguments
/// -----------------
/// * `impact_count`: Number of impacts (`<= trials_run`).
/// * `trials_run`: Number of trials.
/// * `z`: Two-sided normal quantile (see [`z_score`]).
///
/// Return
/// ----------
/// * `(low, high)` clamped to `[0, 1]` and always bracketing `impact_count / trials_run`, or
/// * [`NeoRiskError::InsufficientTrials`] if `trials_run == 0`,
/// * [`NeoRiskError::InvalidConfig`] if `impact_count > trials_run`.
pub fn wilson_interval(
    impact_count: u64,
    trials_run: u64,
    z: f64,
) -> Result<(Probability, Probability), NeoRiskError> {
    if trials_run == 0 {
        return Err(NeoRiskError::InsufficientTrials);
    }
    if impact_count > trials_run {
        return Err(NeoRiskError::InvalidConfig(format!(
            "impact_count ({impact_count}) exceeds trials_run ({trials_run})"
        )));
    }

    let n = trials_run as f64;
    let p_hat = impact_count as f64 / n;
    let z2 = z * z;

    let denominator = 1.0 + z2 / n;
    let center = (p_hat + z2 / (2.0 * n)) / denominator;
    let half_width = (z / denominator) * (p_hat * (1.0 - p_hat) / n + z2 / (4.0 * n * n)).sqrt();

    // Rounding can push a bound past p̂ at the extremes.
    let low = (center - half_width).clamp(0.0, 1.0).min(p_hat);
    let high = (center + half_width).clamp(0.0, 1.0).max(p_hat);
    Ok((low, high))
}

/// Impact probability, Wilson interval and standard errors for one run.
///
/// Return
/// ----------
/// * The [`ImpactEstimate`], or [`NeoRiskError::InsufficientTrials`] if `trials_run == 0`
///   (checked before anything else), or a configuration error for an invalid level.
pub fn estimate_probability(
    impact_count: u64,
    trials_run: u64,
    confidence_level: f64,
) -> Result<ImpactEstimate, NeoRiskError> {
    if trials_run == 0 {
        return Err(NeoRiskError::InsufficientTrials);
    }
    let z = z_score(confidence_level)?;
    let (ci_low, ci_high) = wilson_interval(impact_count, trials_run, z)?;

    let probability = impact_count as f64 / trials_run as f64;
    let standard_error = (probability * (1.0 - probability) / trials_run as f64).sqrt();
    let relative_error = (probability > 0.0).then(|| standard_error / probability);

    Ok(ImpactEstimate {
        probability,
        ci_low,
        ci_high,
        z,
        standard_error,
        relative_error,
    })
}
