//! # Simulation results
//!
//! [`SimulationResult`] is the immutable per-object output of the engine. It carries the
//! fields required by the downstream persistence collaborator (identifier, probability,
//! interval, trial counts, convergence, miss-distance summary) together with the derived
//! quantities used to rank objects: capture radius, focusing factor, safety margin and
//! [`RiskLevel`].
//!
//! ## Rendering
//!
//! * `format!("{result}")` gives a one-line summary,
//! * `format!("{result:#}")` gives a multi-section text report.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    Kilometer, KmPerSec, NeoId, Probability, HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD,
};
use crate::convergence::ConvergenceCurve;

/// Coarse ranking of an impact probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// `High` above 1 %, `Medium` above 0.01 %, `Low` otherwise.
    pub fn from_probability(probability: Probability) -> Self {
        if probability > HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if probability > MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        };
        f.pad(s)
    }
}

/// Outcome of the Monte Carlo simulation of one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub neo_id: NeoId,

    // Input echo
    pub miss_distance_km: Kilometer,
    pub velocity_km_s: KmPerSec,
    pub orbit_uncertainty: i64,
    pub is_potentially_hazardous: bool,

    // Trials
    pub trials_run: usize,
    pub impact_count: u64,

    // Probability
    pub impact_probability: Probability,
    pub confidence_interval_low: Probability,
    pub confidence_interval_high: Probability,
    pub confidence_level: f64,
    pub standard_error: f64,
    /// `None` when no impact was sampled.
    pub relative_error: Option<f64>,

    // Convergence
    pub converged: bool,
    /// 1-based trial from which the running estimate stayed within tolerance.
    pub convergence_trial: Option<usize>,

    // Sampled miss distances
    pub mean_miss_distance_km: Kilometer,
    pub std_miss_distance_km: Kilometer,
    pub min_miss_distance_km: Kilometer,
    pub max_miss_distance_km: Kilometer,

    // Geometry
    pub sigma_km: Kilometer,
    pub critical_radius_km: Kilometer,
    pub focusing_factor: f64,

    pub risk_level: RiskLevel,
    pub convergence_curve: ConvergenceCurve,
}

impl SimulationResult {
    /// Width of the confidence interval.
    pub fn interval_width(&self) -> Probability {
        self.confidence_interval_high - self.confidence_interval_low
    }

    /// Closest sampled approach, i.e. the minimum sampled miss distance.
    pub fn closest_approach_km(&self) -> Kilometer {
        self.min_miss_distance_km
    }

    /// Closest sampled approach minus the capture radius; negative when at least one trial
    /// fell inside the capture radius on the near side.
    pub fn safety_margin_km(&self) -> Kilometer {
        self.closest_approach_km() - self.critical_radius_km
    }

    /// `1 / p̂`, the "one chance in N" form of the probability (`None` when `p̂ = 0`).
    pub fn odds(&self) -> Option<f64> {
        (self.impact_probability > 0.0).then(|| 1.0 / self.impact_probability)
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            return write!(
                f,
                "{}: p={:.3e} [{:.3e}, {:.3e}] ({} trials, {}, risk {})",
                self.neo_id,
                self.impact_probability,
                self.confidence_interval_low,
                self.confidence_interval_high,
                self.trials_run,
                if self.converged { "converged" } else { "not converged" },
                self.risk_level,
            );
        }

        const RULE: &str = "============================================================";
        const LABEL: usize = 28;

        macro_rules! row {
            ($label:expr, $($arg:tt)*) => {
                writeln!(f, "  {:<LABEL$} {}", $label, format!($($arg)*))
            };
        }

        writeln!(f, "{RULE}")?;
        writeln!(f, "IMPACT RISK REPORT: {}", self.neo_id)?;
        writeln!(f, "{RULE}")?;

        writeln!(f, "\n[Impact probability]")?;
        row!("probability", "{:.6e}", self.impact_probability)?;
        match self.odds() {
            Some(odds) => row!("odds", "1 in {:.0}", odds)?,
            None => row!("odds", "no impact sampled")?,
        }
        row!(
            format!("{:.1} % interval", self.confidence_level * 100.0),
            "[{:.6e}, {:.6e}]",
            self.confidence_interval_low,
            self.confidence_interval_high
        )?;
        row!("standard error", "{:.3e}", self.standard_error)?;
        match self.relative_error {
            Some(r) => row!("relative error", "{:.2} %", r * 100.0)?,
            None => row!("relative error", "n/a")?,
        }

        writeln!(f, "\n[Input data]")?;
        row!("miss distance", "{:.1} km", self.miss_distance_km)?;
        row!("velocity", "{:.2} km/s", self.velocity_km_s)?;
        row!("orbit uncertainty class", "{}", self.orbit_uncertainty)?;
        row!("positional sigma", "{:.1} km", self.sigma_km)?;
        row!(
            "potentially hazardous",
            "{}",
            if self.is_potentially_hazardous { "yes" } else { "no" }
        )?;

        writeln!(f, "\n[Earth parameters]")?;
        row!("capture radius", "{:.1} km", self.critical_radius_km)?;
        row!("focusing factor", "{:.3}", self.focusing_factor)?;

        writeln!(f, "\n[Simulation statistics]")?;
        row!("trials run", "{}", self.trials_run)?;
        row!("impacts", "{}", self.impact_count)?;
        match self.convergence_trial {
            Some(t) if self.converged => row!("converged", "yes (from trial {t})")?,
            _ => row!("converged", "no")?,
        }
        row!(
            "sampled distance",
            "{:.1} +/- {:.1} km",
            self.mean_miss_distance_km,
            self.std_miss_distance_km
        )?;
        row!(
            "sampled range",
            "[{:.1}, {:.1}] km",
            self.min_miss_distance_km,
            self.max_miss_distance_km
        )?;

        writeln!(f, "\n[Risk assessment]")?;
        row!("risk level", "{}", self.risk_level)?;
        row!("closest approach", "{:.1} km", self.closest_approach_km())?;
        row!("safety margin", "{:.1} km", self.safety_margin_km())?;

        if !self.convergence_curve.is_empty() {
            writeln!(f, "\n[Convergence]")?;
            write!(f, "{}", self.convergence_curve)?;
        }
        write!(f, "{RULE}")
    }
}
