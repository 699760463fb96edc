//! # Impact criterion
//!
//! A trial is an impact when the sampled miss distance falls inside Earth's **effective
//! capture radius**. Gravitational focusing bends the path of a slow body towards Earth, so
//! the capture cross-section is larger than the physical disk:
//!
//! ```text
//! r_critical = R_earth · sqrt(1 + v_esc² / v²)
//! ```
//!
//! with `v` the relative approach velocity and `v_esc` Earth's escape velocity. A trial hits
//! when `|sampled_distance| ≤ r_critical`; negative draws are compared by magnitude.
use crate::constants::{Kilometer, KmPerSec};
use crate::neorisk_errors::NeoRiskError;

/// Effective capture radius of Earth for a body approaching at `velocity_km_s`.
///
/// Arguments
/// -----------------
/// * `velocity_km_s`: Relative approach velocity (strictly positive).
/// * `earth_radius_km`: Physical radius of Earth.
/// * `escape_velocity_km_s`: Escape velocity at that radius.
///
/// Return
/// ----------
/// * `r_critical` in km, or [`NeoRiskError::InvalidVelocity`] if the velocity is not a
///   finite, strictly positive number.
pub fn critical_radius(
    velocity_km_s: KmPerSec,
    earth_radius_km: Kilometer,
    escape_velocity_km_s: KmPerSec,
) -> Result<Kilometer, NeoRiskError> {
    if !velocity_km_s.is_finite() || velocity_km_s <= 0.0 {
        return Err(NeoRiskError::InvalidVelocity(velocity_km_s));
    }
    let focusing = 1.0 + (escape_velocity_km_s * escape_velocity_km_s)
        / (velocity_km_s * velocity_km_s);
    Ok(earth_radius_km * focusing.sqrt())
}

/// Classify a single sampled miss distance.
///
/// Return
/// ----------
/// * `true` if `|sampled_distance_km| ≤ r_critical`, or [`NeoRiskError::InvalidVelocity`]
///   for a non-positive velocity.
///
/// See also
/// ------------
/// * [`ImpactCriterion`] – Same test with the capture radius computed once.
pub fn is_impact(
    sampled_distance_km: Kilometer,
    velocity_km_s: KmPerSec,
    earth_radius_km: Kilometer,
    escape_velocity_km_s: KmPerSec,
) -> Result<bool, NeoRiskError> {
    let r_critical = critical_radius(velocity_km_s, earth_radius_km, escape_velocity_km_s)?;
    Ok(sampled_distance_km.abs() <= r_critical)
}

/// Pre-computed capture test for one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactCriterion {
    critical_radius_km: Kilometer,
    earth_radius_km: Kilometer,
}

impl ImpactCriterion {
    pub fn new(
        velocity_km_s: KmPerSec,
        earth_radius_km: Kilometer,
        escape_velocity_km_s: KmPerSec,
    ) -> Result<Self, NeoRiskError> {
        Ok(ImpactCriterion {
            critical_radius_km: critical_radius(
                velocity_km_s,
                earth_radius_km,
                escape_velocity_km_s,
            )?,
            earth_radius_km,
        })
    }

    #[inline]
    pub fn is_impact(&self, sampled_distance_km: Kilometer) -> bool {
        sampled_distance_km.abs() <= self.critical_radius_km
    }

    pub fn critical_radius_km(&self) -> Kilometer {
        self.critical_radius_km
    }

    /// Ratio of the capture radius to the physical radius (≥ 1).
    pub fn focusing_factor(&self) -> f64 {
        self.critical_radius_km / self.earth_radius_km
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{EARTH_ESCAPE_VELOCITY_KM_S, EARTH_RADIUS_KM};
    use approx::assert_relative_eq;

    #[test]
    fn critical_radius_matches_closed_form() {
        let r = critical_radius(12.0, EARTH_RADIUS_KM, EARTH_ESCAPE_VELOCITY_KM_S).unwrap();
        let expected = 6378.0 * (1.0_f64 + 11.2 * 11.2 / 144.0).sqrt();
        assert_relative_eq!(r, expected, epsilon = 1e-9);
        assert_relative_eq!(r, 8_724.4, max_relative = 1e-4);
    }

    #[test]
    fn slower_bodies_have_larger_capture_radius() {
        let slow = critical_radius(5.0, EARTH_RADIUS_KM, EARTH_ESCAPE_VELOCITY_KM_S).unwrap();
        let fast = critical_radius(40.0, EARTH_RADIUS_KM, EARTH_ESCAPE_VELOCITY_KM_S).unwrap();
        assert!(slow > fast);
        assert!(fast > EARTH_RADIUS_KM);
    }

    #[test]
    fn non_positive_velocity_is_rejected() {
        assert_eq!(
            critical_radius(0.0, EARTH_RADIUS_KM, EARTH_ESCAPE_VELOCITY_KM_S),
            Err(NeoRiskError::InvalidVelocity(0.0))
        );
        assert_eq!(
            is_impact(1.0, -3.0, EARTH_RADIUS_KM, EARTH_ESCAPE_VELOCITY_KM_S),
            Err(NeoRiskError::InvalidVelocity(-3.0))
        );
        assert!(ImpactCriterion::new(f64::NAN, EARTH_RADIUS_KM, EARTH_ESCAPE_VELOCITY_KM_S)
            .is_err());
    }

    #[test]
    fn negative_and_zero_draws_compare_by_magnitude() {
        let v = 20.0;
        let r = critical_radius(v, EARTH_RADIUS_KM, EARTH_ESCAPE_VELOCITY_KM_S).unwrap();
        let args = (v, EARTH_RADIUS_KM, EARTH_ESCAPE_VELOCITY_KM_S);

        assert!(is_impact(0.0, args.0, args.1, args.2).unwrap());
        assert!(is_impact(-r, args.0, args.1, args.2).unwrap());
        assert!(is_impact(r, args.0, args.1, args.2).unwrap());
        assert!(!is_impact(-(r + 1.0), args.0, args.1, args.2).unwrap());
        assert!(!is_impact(r + 1.0, args.0, args.1, args.2).unwrap());
    }

    #[test]
    fn criterion_agrees_with_free_function() {
        let criterion =
            ImpactCriterion::new(7.4, EARTH_RADIUS_KM, EARTH_ESCAPE_VELOCITY_KM_S).unwrap();
        for d in [-20_000.0, -9_000.0, 0.0, 5_000.0, 14_000.0, 31_600.0] {
            assert_eq!(
                criterion.is_impact(d),
                is_impact(d, 7.4, EARTH_RADIUS_KM, EARTH_ESCAPE_VELOCITY_KM_S).unwrap()
            );
        }
        assert!(criterion.focusing_factor() > 1.0);
    }
}
