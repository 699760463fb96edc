//! # Close-approach observations
//!
//! [`ObjectObservation`] is the per-object input row delivered by the upstream data feed:
//! nominal miss distance, relative velocity and NASA orbit-uncertainty class. Rows are
//! validated with [`ObjectObservation::validate`] before any trial is run; invalid rows are
//! rejected, never clamped.
use serde::{Deserialize, Serialize};

use crate::constants::{Kilometer, KmPerSec, NeoId};
use crate::neorisk_errors::NeoRiskError;
use crate::uncertainty::class_index;

/// One close approach of a near-Earth object.
///
/// `is_potentially_hazardous` is informational and does not enter the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectObservation {
    pub neo_id: NeoId,
    pub miss_distance_km: Kilometer,
    pub velocity_km_s: KmPerSec,
    pub orbit_uncertainty: i64,
    #[serde(default)]
    pub is_potentially_hazardous: bool,
}

impl ObjectObservation {
    pub fn new(
        neo_id: impl Into<NeoId>,
        miss_distance_km: Kilometer,
        velocity_km_s: KmPerSec,
        orbit_uncertainty: i64,
        is_potentially_hazardous: bool,
    ) -> Self {
        ObjectObservation {
            neo_id: neo_id.into(),
            miss_distance_km,
            velocity_km_s,
            orbit_uncertainty,
            is_potentially_hazardous,
        }
    }

    /// Check the row invariants.
    ///
    /// Return
    /// ----------
    /// * `Ok(())` if the row can be simulated, otherwise the first violated rule:
    ///   * [`NeoRiskError::InvalidObservation`] – empty `neo_id`,
    ///   * [`NeoRiskError::InvalidMissDistance`] – miss distance not finite or `<= 0`,
    ///   * [`NeoRiskError::InvalidVelocity`] – velocity not finite or `<= 0`,
    ///   * [`NeoRiskError::InvalidUncertaintyClass`] – class outside `0..=9`.
    pub fn validate(&self) -> Result<(), NeoRiskError> {
        if self.neo_id.trim().is_empty() {
            return Err(NeoRiskError::InvalidObservation(
                "neo_id must not be empty".into(),
            ));
        }
        if !self.miss_distance_km.is_finite() || self.miss_distance_km <= 0.0 {
            return Err(NeoRiskError::InvalidMissDistance(self.miss_distance_km));
        }
        if !self.velocity_km_s.is_finite() || self.velocity_km_s <= 0.0 {
            return Err(NeoRiskError::InvalidVelocity(self.velocity_km_s));
        }
        class_index(self.orbit_uncertainty)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apophis() -> ObjectObservation {
        ObjectObservation::new("99942", 31_600.0, 7.4, 4, true)
    }

    #[test]
    fn valid_row_passes() {
        assert!(apophis().validate().is_ok());
    }

    #[test]
    fn each_invariant_has_its_error() {
        let mut obs = apophis();
        obs.neo_id = "  ".into();
        assert!(matches!(
            obs.validate(),
            Err(NeoRiskError::InvalidObservation(_))
        ));

        let mut obs = apophis();
        obs.miss_distance_km = 0.0;
        assert_eq!(obs.validate(), Err(NeoRiskError::InvalidMissDistance(0.0)));

        let mut obs = apophis();
        obs.velocity_km_s = -7.4;
        assert_eq!(obs.validate(), Err(NeoRiskError::InvalidVelocity(-7.4)));

        let mut obs = apophis();
        obs.orbit_uncertainty = 10;
        assert_eq!(
            obs.validate(),
            Err(NeoRiskError::InvalidUncertaintyClass(10))
        );
    }

    #[test]
    fn nan_inputs_are_rejected() {
        let mut obs = apophis();
        obs.miss_distance_km = f64::NAN;
        assert!(matches!(
            obs.validate(),
            Err(NeoRiskError::InvalidMissDistance(_))
        ));

        let mut obs = apophis();
        obs.velocity_km_s = f64::INFINITY;
        assert!(matches!(
            obs.validate(),
            Err(NeoRiskError::InvalidVelocity(_))
        ));
    }
}
