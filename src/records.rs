//! # CSV boundary
//!
//! Reading upstream close-approach rows and writing result rows for the persistence
//! collaborator.
//!
//! ## Input columns
//!
//! `neo_id, miss_distance_km, velocity_km_s, orbit_uncertainty[, is_potentially_hazardous]`
//!
//! * `orbit_uncertainty` is stored as text by the warehouse; it is parsed as an integer
//!   (`"4"`, `" 4 "`, `"4.0"`). Range checks are left to the engine.
//! * `is_potentially_hazardous` accepts `true/false`, `t/f`, `yes/no`, `1/0` (any case) and
//!   defaults to `false` when the column or the value is missing.
//!
//! ## Output columns
//!
//! One flat row per [`SimulationResult`]; see [`write_results`].
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::constants::{Kilometer, KmPerSec, Probability};
use crate::neorisk_errors::NeoRiskError;
use crate::observation::ObjectObservation;
use crate::result::{RiskLevel, SimulationResult};

#[derive(Debug, Deserialize)]
struct ObservationRecord {
    neo_id: String,
    miss_distance_km: Kilometer,
    velocity_km_s: KmPerSec,
    orbit_uncertainty: String,
    #[serde(default)]
    is_potentially_hazardous: Option<String>,
}

fn parse_class(neo_id: &str, raw: &str) -> Result<i64, NeoRiskError> {
    let raw = raw.trim();
    if let Ok(class) = raw.parse::<i64>() {
        return Ok(class);
    }
    match raw.parse::<f64>() {
        Ok(x) if x.fract() == 0.0 && x.abs() < i64::MAX as f64 => Ok(x as i64),
        _ => Err(NeoRiskError::InvalidObservation(format!(
            "{neo_id}: orbit_uncertainty {raw:?} is not an integer class"
        ))),
    }
}

fn parse_flag(neo_id: &str, raw: Option<&str>) -> Result<bool, NeoRiskError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "0" => Ok(false),
        _ => Err(NeoRiskError::InvalidObservation(format!(
            "{neo_id}: is_potentially_hazardous {raw:?} is not a boolean"
        ))),
    }
}

impl TryFrom<ObservationRecord> for ObjectObservation {
    type Error = NeoRiskError;

    fn try_from(record: ObservationRecord) -> Result<Self, Self::Error> {
        let orbit_uncertainty = parse_class(&record.neo_id, &record.orbit_uncertainty)?;
        let hazardous = parse_flag(&record.neo_id, record.is_potentially_hazardous.as_deref())?;
        Ok(ObjectObservation::new(
            record.neo_id,
            record.miss_distance_km,
            record.velocity_km_s,
            orbit_uncertainty,
            hazardous,
        ))
    }
}

/// Parse close-approach rows from CSV (header row required, fields trimmed).
///
/// Return
/// ----------
/// * The parsed rows, not yet validated (see [`ObjectObservation::validate`]), or
/// * [`NeoRiskError::CsvError`] for malformed CSV or non-numeric distances/velocities,
/// * [`NeoRiskError::InvalidObservation`] for an unparsable class or hazard flag.
pub fn read_observations<R: Read>(reader: R) -> Result<Vec<ObjectObservation>, NeoRiskError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize::<ObservationRecord>()
        .map(|record| ObjectObservation::try_from(record?))
        .collect()
}

#[derive(Debug, Serialize)]
struct ResultRecord<'a> {
    neo_id: &'a str,
    impact_probability: Probability,
    confidence_interval_low: Probability,
    confidence_interval_high: Probability,
    confidence_level: f64,
    trials_run: usize,
    impact_count: u64,
    converged: bool,
    convergence_trial: Option<usize>,
    mean_miss_distance_km: Kilometer,
    std_miss_distance_km: Kilometer,
    min_miss_distance_km: Kilometer,
    max_miss_distance_km: Kilometer,
    sigma_km: Kilometer,
    critical_radius_km: Kilometer,
    safety_margin_km: Kilometer,
    standard_error: f64,
    relative_error: Option<f64>,
    risk_level: RiskLevel,
    is_potentially_hazardous: bool,
}

impl<'a> From<&'a SimulationResult> for ResultRecord<'a> {
    fn from(r: &'a SimulationResult) -> Self {
        ResultRecord {
            neo_id: &r.neo_id,
            impact_probability: r.impact_probability,
            confidence_interval_low: r.confidence_interval_low,
            confidence_interval_high: r.confidence_interval_high,
            confidence_level: r.confidence_level,
            trials_run: r.trials_run,
            impact_count: r.impact_count,
            converged: r.converged,
            convergence_trial: r.convergence_trial,
            mean_miss_distance_km: r.mean_miss_distance_km,
            std_miss_distance_km: r.std_miss_distance_km,
            min_miss_distance_km: r.min_miss_distance_km,
            max_miss_distance_km: r.max_miss_distance_km,
            sigma_km: r.sigma_km,
            critical_radius_km: r.critical_radius_km,
            safety_margin_km: r.safety_margin_km(),
            standard_error: r.standard_error,
            relative_error: r.relative_error,
            risk_level: r.risk_level,
            is_potentially_hazardous: r.is_potentially_hazardous,
        }
    }
}

/// Write one CSV row (with header) per result.
///
/// Columns, in order: `neo_id, impact_probability, confidence_interval_low,
/// confidence_interval_high, confidence_level, trials_run, impact_count, converged,
/// convergence_trial, mean/std/min/max_miss_distance_km, sigma_km, critical_radius_km,
/// safety_margin_km, standard_error, relative_error, risk_level, is_potentially_hazardous`.
/// Missing optional values are written as empty fields.
pub fn write_results<'a, W, I>(writer: W, results: I) -> Result<(), NeoRiskError>
where
    W: Write,
    I: IntoIterator<Item = &'a SimulationResult>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for result in results {
        wtr.serialize(ResultRecord::from(result))?;
    }
    wtr.flush()?;
    Ok(())
}
