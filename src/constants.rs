//! # Constants and type definitions for neorisk
//!
//! This module centralizes the **physical constants**, **engine limits**, and **common type
//! aliases** used throughout the `neorisk` library.
//!
//! ## Overview
//!
//! - Geophysical constants used by the capture-radius computation
//! - Engine limits (trial ceiling, number of orbit-uncertainty classes)
//! - Unit type aliases shared by the public API
//! - The default orbit-uncertainty calibration table
//!
//! The defaults defined here are only *defaults*: every value that enters the simulation is
//! carried by [`SimulationConfig`](crate::config::SimulationConfig) or
//! [`UncertaintyProfile`](crate::uncertainty::UncertaintyProfile) and can be overridden by
//! the caller.

// -------------------------------------------------------------------------------------------------
// Physical constants
// -------------------------------------------------------------------------------------------------

/// Earth mean equatorial radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6378.0;

/// Earth escape velocity at the surface in km/s
pub const EARTH_ESCAPE_VELOCITY_KM_S: f64 = 11.2;

// -------------------------------------------------------------------------------------------------
// Engine limits
// -------------------------------------------------------------------------------------------------

/// Hard ceiling on the number of Monte Carlo trials run for a single object
pub const MAX_TRIALS_CEILING: usize = 500_000;

/// Number of NASA orbit-uncertainty classes (0 = best known, 9 = least known)
pub const N_UNCERTAINTY_CLASSES: usize = 10;

/// Default confidence level of the Wilson score interval
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Default number of trailing running estimates used to judge convergence.
///
/// A run can only stop early after this many trials. With zero impacts the Wilson upper
/// bound at that point is `z² / (W + z²)` (≈ 7.7e-5 at 95 %), below
/// [`MEDIUM_RISK_THRESHOLD`], so an early zero-hit stop is consistent with a `Low` ranking.
pub const DEFAULT_CONVERGENCE_WINDOW: usize = 50_000;

/// Default maximum drift of the running estimate inside the convergence window
pub const DEFAULT_CONVERGENCE_TOLERANCE: f64 = 1e-4;

/// Default trial counts at which the convergence curve is sampled
pub const DEFAULT_CURVE_CHECKPOINTS: [usize; 5] = [100, 1_000, 10_000, 100_000, 500_000];

/// Default orbit-uncertainty calibration: 1-σ positional spread as a **fraction of the
/// nominal miss distance**, indexed by uncertainty class.
///
/// The values are a deliberately pessimistic estimate used for risk ranking, not a
/// published covariance model.
pub const DEFAULT_RELATIVE_SIGMAS: [f64; N_UNCERTAINTY_CLASSES] =
    [0.01, 0.02, 0.05, 0.10, 0.15, 0.20, 0.30, 0.40, 0.50, 0.60];

// -------------------------------------------------------------------------------------------------
// Risk thresholds
// -------------------------------------------------------------------------------------------------

/// Impact probability above which an object is ranked [`RiskLevel::High`](crate::result::RiskLevel::High)
pub const HIGH_RISK_THRESHOLD: f64 = 1e-2;

/// Impact probability above which an object is ranked [`RiskLevel::Medium`](crate::result::RiskLevel::Medium)
pub const MEDIUM_RISK_THRESHOLD: f64 = 1e-4;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Distance in kilometers
pub type Kilometer = f64;
/// Velocity in kilometers per second
pub type KmPerSec = f64;
/// Probability in `[0, 1]`
pub type Probability = f64;
/// Opaque identifier of a near-Earth object (as delivered by the upstream feed)
pub type NeoId = String;
