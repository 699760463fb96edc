//! # Simulation parameters
//!
//! This module defines [`SimulationConfig`] and its validating builder. A configuration is
//! supplied once per engine and never mutated while objects are simulated.
//!
//! ## Fields
//!
//! * `max_trials` – trial ceiling per object (≤ [`MAX_TRIALS_CEILING`]). `0` is accepted and
//!   makes every run fail at the statistics step with
//!   [`InsufficientTrials`](crate::neorisk_errors::NeoRiskError::InsufficientTrials).
//! * `confidence_level` – two-sided level of the Wilson interval, in `(0, 1)`.
//! * `convergence_window` – number of trailing running estimates judged for stability.
//! * `convergence_tolerance` – maximum drift of the running estimate inside that window.
//! * `early_stop` – stop a run as soon as convergence is declared.
//! * `earth_radius_km`, `earth_escape_velocity_km_s` – capture-radius constants.
//! * `curve_checkpoints` – trial counts at which the convergence curve is sampled.
//!
//! ## Example
//!
//! ```rust
//! use neorisk::config::SimulationConfig;
//!
//! let config = SimulationConfig::builder()
//!     .max_trials(100_000)
//!     .confidence_level(0.99)
//!     .convergence_window(2_000)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.max_trials, 100_000);
//! println!("{config:#}");
//! ```
use std::cmp::Ordering::{Equal, Greater, Less};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    Kilometer, KmPerSec, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_CONVERGENCE_TOLERANCE,
    DEFAULT_CONVERGENCE_WINDOW, DEFAULT_CURVE_CHECKPOINTS, EARTH_ESCAPE_VELOCITY_KM_S,
    EARTH_RADIUS_KM, MAX_TRIALS_CEILING,
};
use crate::neorisk_errors::NeoRiskError;

/// Configuration of a Monte Carlo impact-risk run.
///
/// Defaults
/// -----------------
/// * `max_trials`: 500 000
/// * `confidence_level`: 0.95
/// * `convergence_window`: 50 000
/// * `convergence_tolerance`: 1e-4
/// * `early_stop`: true
/// * `earth_radius_km`: 6378.0
/// * `earth_escape_velocity_km_s`: 11.2
/// * `curve_checkpoints`: 100, 1 000, 10 000, 100 000, 500 000
///
/// Instances obtained through [`SimulationConfig::builder`] are validated; instances
/// deserialized or built by hand are validated again by
/// [`ImpactEngine::new`](crate::engine::ImpactEngine::new).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub max_trials: usize,
    pub confidence_level: f64,
    pub convergence_window: usize,
    pub convergence_tolerance: f64,
    pub early_stop: bool,
    pub earth_radius_km: Kilometer,
    pub earth_escape_velocity_km_s: KmPerSec,
    pub curve_checkpoints: Vec<usize>,
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`SimulationConfigBuilder`] initialized with the defaults.
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::new()
    }

    /// Check every field against the validation rules of [`SimulationConfigBuilder::build`].
    pub fn validate(&self) -> Result<(), NeoRiskError> {
        if self.max_trials > MAX_TRIALS_CEILING {
            return Err(NeoRiskError::InvalidConfig(format!(
                "max_trials must be <= {MAX_TRIALS_CEILING}"
            )));
        }
        if !(gt0(self.confidence_level) && lt(self.confidence_level, 1.0)) {
            return Err(NeoRiskError::InvalidConfig(
                "confidence_level must be in (0, 1)".into(),
            ));
        }
        if self.convergence_window == 0 {
            return Err(NeoRiskError::InvalidConfig(
                "convergence_window must be >= 1".into(),
            ));
        }
        if !ge0(self.convergence_tolerance) || !self.convergence_tolerance.is_finite() {
            return Err(NeoRiskError::InvalidConfig(
                "convergence_tolerance must be finite and >= 0".into(),
            ));
        }
        if !gt0(self.earth_radius_km) || !self.earth_radius_km.is_finite() {
            return Err(NeoRiskError::InvalidConfig(
                "earth_radius_km must be > 0".into(),
            ));
        }
        if !gt0(self.earth_escape_velocity_km_s) || !self.earth_escape_velocity_km_s.is_finite()
        {
            return Err(NeoRiskError::InvalidConfig(
                "earth_escape_velocity_km_s must be > 0".into(),
            ));
        }
        if self.curve_checkpoints.contains(&0) {
            return Err(NeoRiskError::InvalidConfig(
                "curve_checkpoints must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            max_trials: MAX_TRIALS_CEILING,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            convergence_window: DEFAULT_CONVERGENCE_WINDOW,
            convergence_tolerance: DEFAULT_CONVERGENCE_TOLERANCE,
            early_stop: true,
            earth_radius_km: EARTH_RADIUS_KM,
            earth_escape_velocity_km_s: EARTH_ESCAPE_VELOCITY_KM_S,
            curve_checkpoints: DEFAULT_CURVE_CHECKPOINTS.to_vec(),
        }
    }
}

// ---- Numeric helpers for PartialOrd (NaN is never valid) ----

#[inline]
fn gt0(x: f64) -> bool {
    x.partial_cmp(&0.0) == Some(Greater)
}

#[inline]
fn ge0(x: f64) -> bool {
    matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
}

#[inline]
fn lt(a: f64, b: f64) -> bool {
    a.partial_cmp(&b) == Some(Less)
}

/// Builder for [`SimulationConfig`], with validation.
#[derive(Debug, Clone)]
pub struct SimulationConfigBuilder {
    config: SimulationConfig,
}

impl Default for SimulationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
        }
    }

    pub fn max_trials(mut self, v: usize) -> Self {
        self.config.max_trials = v;
        self
    }
    pub fn confidence_level(mut self, v: f64) -> Self {
        self.config.confidence_level = v;
        self
    }
    pub fn convergence_window(mut self, v: usize) -> Self {
        self.config.convergence_window = v;
        self
    }
    pub fn convergence_tolerance(mut self, v: f64) -> Self {
        self.config.convergence_tolerance = v;
        self
    }
    pub fn early_stop(mut self, v: bool) -> Self {
        self.config.early_stop = v;
        self
    }
    pub fn earth_radius_km(mut self, v: Kilometer) -> Self {
        self.config.earth_radius_km = v;
        self
    }
    pub fn earth_escape_velocity_km_s(mut self, v: KmPerSec) -> Self {
        self.config.earth_escape_velocity_km_s = v;
        self
    }
    pub fn curve_checkpoints(mut self, v: Vec<usize>) -> Self {
        self.config.curve_checkpoints = v;
        self
    }

    /// Finalize the builder and produce a validated [`SimulationConfig`].
    ///
    /// Validation rules
    /// -----------------
    /// * `max_trials <= 500 000` (zero is allowed, see the module documentation).
    /// * `0 < confidence_level < 1`.
    /// * `convergence_window >= 1`.
    /// * `convergence_tolerance` finite and `>= 0`.
    /// * `earth_radius_km > 0`, `earth_escape_velocity_km_s > 0`.
    /// * every curve checkpoint `>= 1`.
    ///
    /// Checkpoints are sorted and deduplicated.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(SimulationConfig)`, or [`NeoRiskError::InvalidConfig`] naming the first failed rule.
    pub fn build(mut self) -> Result<SimulationConfig, NeoRiskError> {
        self.config.curve_checkpoints.sort_unstable();
        self.config.curve_checkpoints.dedup();
        self.config.validate()?;
        Ok(self.config)
    }
}

impl fmt::Display for SimulationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 44;
            writeln!(f, "Impact simulation parameters")?;
            writeln!(f, "----------------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Monte Carlo]")?;
            line!("max_trials            = {}", self.max_trials, "Trial ceiling per object")?;
            line!(
                "confidence_level      = {:.3}",
                self.confidence_level,
                "Two-sided Wilson interval level"
            )?;
            line!(
                "convergence_window    = {}",
                self.convergence_window,
                "Trailing estimates judged for stability"
            )?;
            line!(
                "convergence_tolerance = {:.1e}",
                self.convergence_tolerance,
                "Max drift inside the window"
            )?;
            line!("early_stop            = {}", self.early_stop, "Stop once converged")?;
            line!(
                "curve_checkpoints     = {:?}",
                self.curve_checkpoints,
                "Convergence curve sample points"
            )?;

            writeln!(f, "\n[Earth]")?;
            line!(
                "earth_radius_km       = {:.1} km",
                self.earth_radius_km,
                "Physical radius"
            )?;
            line!(
                "escape_velocity       = {:.2} km/s",
                self.earth_escape_velocity_km_s,
                "Surface escape velocity"
            )?;
            Ok(())
        } else {
            write!(
                f,
                "SimulationConfig(max_trials={}, confidence={:.3}, window={}, tol={:.1e}, early_stop={}, R={:.1}km, v_esc={:.2}km/s)",
                self.max_trials,
                self.confidence_level,
                self.convergence_window,
                self.convergence_tolerance,
                self.early_stop,
                self.earth_radius_km,
                self.earth_escape_velocity_km_s,
            )
        }
    }
}
