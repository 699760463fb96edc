//! # Orbit-uncertainty calibration
//!
//! This module defines [`UncertaintyProfile`], the immutable calibration table mapping each
//! NASA **orbit-uncertainty class** (0 = best known orbit, 9 = least known) to the 1-σ
//! positional spread used when sampling miss distances.
//!
//! ## Scales
//!
//! Table entries are interpreted according to a [`SigmaScale`]:
//!
//! * [`SigmaScale::Relative`] – entries are **fractions of the nominal miss distance**
//!   (`σ = miss_distance_km × entry`). This is the scale of the default table.
//! * [`SigmaScale::Absolute`] – entries are already expressed in kilometers.
//!
//! ## Invariants
//!
//! A profile is validated **once**, when it is built:
//!
//! * every entry is finite and strictly positive,
//! * entries are **non-decreasing** with the class index (a less-well-known orbit never
//!   spreads less than a better-known one).
//!
//! A violation is a calibration error ([`NeoRiskError::NonMonotonicProfile`] or
//! [`NeoRiskError::InvalidProfileEntry`]); a profile that exists is always valid.
//!
//! ## Example
//!
//! ```rust
//! use neorisk::uncertainty::{SigmaScale, UncertaintyProfile};
//!
//! let profile = UncertaintyProfile::default();
//! assert_eq!(profile.scale(), SigmaScale::Relative);
//! assert_eq!(profile.variance_for(3).unwrap(), 0.10);
//!
//! // 10% of a 20 000 km nominal miss distance
//! assert_eq!(profile.sigma_km(3, 20_000.0).unwrap(), 2_000.0);
//! ```
use std::fmt;
use std::io::Read;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constants::{Kilometer, DEFAULT_RELATIVE_SIGMAS, N_UNCERTAINTY_CLASSES};
use crate::neorisk_errors::NeoRiskError;

/// How the entries of an [`UncertaintyProfile`] are turned into a standard deviation in km.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigmaScale {
    /// Entry is a fraction of the nominal miss distance.
    Relative,
    /// Entry is a standard deviation in kilometers.
    Absolute,
}

impl fmt::Display for SigmaScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigmaScale::Relative => write!(f, "relative"),
            SigmaScale::Absolute => write!(f, "absolute"),
        }
    }
}

/// Serialized shape of a profile, validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProfileTable {
    scale: SigmaScale,
    sigmas: [f64; N_UNCERTAINTY_CLASSES],
}

/// Immutable orbit-uncertainty → positional spread calibration table.
///
/// See the [module documentation](crate::uncertainty) for the scales and invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileTable", into = "ProfileTable")]
pub struct UncertaintyProfile {
    sigmas: [f64; N_UNCERTAINTY_CLASSES],
    scale: SigmaScale,
}

/// One `class,sigma` row of a calibration CSV file.
#[derive(Debug, Deserialize)]
struct ProfileRow {
    class: i64,
    sigma: f64,
}

/// Map a raw orbit-uncertainty class to a table index, rejecting anything outside `0..=9`.
pub(crate) fn class_index(orbit_uncertainty: i64) -> Result<usize, NeoRiskError> {
    usize::try_from(orbit_uncertainty)
        .ok()
        .filter(|&idx| idx < N_UNCERTAINTY_CLASSES)
        .ok_or(NeoRiskError::InvalidUncertaintyClass(orbit_uncertainty))
}

impl UncertaintyProfile {
    /// Build and validate a calibration table.
    ///
    /// Arguments
    /// -----------------
    /// * `sigmas`: One entry per uncertainty class, index = class.
    /// * `scale`: How entries are converted to kilometers.
    ///
    /// Return
    /// ----------
    /// * The validated profile, or
    /// * [`NeoRiskError::InvalidProfileEntry`] if an entry is not finite or not strictly positive,
    /// * [`NeoRiskError::NonMonotonicProfile`] if an entry is smaller than its predecessor.
    pub fn new(
        sigmas: [f64; N_UNCERTAINTY_CLASSES],
        scale: SigmaScale,
    ) -> Result<Self, NeoRiskError> {
        for (class, &value) in sigmas.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(NeoRiskError::InvalidProfileEntry { class, value });
            }
        }

        if let Some((class, (&previous, &current))) = sigmas
            .iter()
            .tuple_windows()
            .enumerate()
            .find(|(_, (prev, cur))| cur < prev)
        {
            return Err(NeoRiskError::NonMonotonicProfile {
                class: class + 1,
                previous,
                current,
            });
        }

        Ok(UncertaintyProfile { sigmas, scale })
    }

    /// Load a calibration table from CSV.
    ///
    /// The input must have a header row and exactly one `class,sigma` row per uncertainty
    /// class, in any order:
    ///
    /// ```text
    /// class,sigma
    /// 0,0.01
    /// 1,0.02
    /// ...
    /// ```
    ///
    /// Arguments
    /// -----------------
    /// * `reader`: Any byte source (file, buffer, …).
    /// * `scale`: How the loaded entries are converted to kilometers.
    ///
    /// Return
    /// ----------
    /// * The validated profile (same rules as [`UncertaintyProfile::new`]), or
    /// * [`NeoRiskError::CsvError`] on malformed CSV,
    /// * [`NeoRiskError::InvalidUncertaintyClass`] for a class outside `0..=9`,
    /// * [`NeoRiskError::InvalidConfig`] for duplicated or missing classes.
    pub fn from_csv_reader<R: Read>(reader: R, scale: SigmaScale) -> Result<Self, NeoRiskError> {
        let mut table: [Option<f64>; N_UNCERTAINTY_CLASSES] = [None; N_UNCERTAINTY_CLASSES];
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        for row in rdr.deserialize::<ProfileRow>() {
            let row = row?;
            let idx = class_index(row.class)?;
            if table[idx].replace(row.sigma).is_some() {
                return Err(NeoRiskError::InvalidConfig(format!(
                    "uncertainty class {idx} is defined more than once"
                )));
            }
        }

        let mut sigmas = [0.0; N_UNCERTAINTY_CLASSES];
        for (class, entry) in table.iter().enumerate() {
            sigmas[class] = entry.ok_or_else(|| {
                NeoRiskError::InvalidConfig(format!("uncertainty class {class} is missing"))
            })?;
        }

        Self::new(sigmas, scale)
    }

    /// Raw calibration entry for an orbit-uncertainty class.
    ///
    /// The returned value is the 1-σ spread in the profile's [`SigmaScale`]: a fraction of
    /// the nominal miss distance for relative profiles, kilometers for absolute ones.
    ///
    /// Return
    /// ----------
    /// * The table entry, or [`NeoRiskError::InvalidUncertaintyClass`] outside `0..=9`.
    pub fn variance_for(&self, orbit_uncertainty: i64) -> Result<f64, NeoRiskError> {
        Ok(self.sigmas[class_index(orbit_uncertainty)?])
    }

    /// Resolved 1-σ positional spread in kilometers for an object.
    ///
    /// Arguments
    /// -----------------
    /// * `orbit_uncertainty`: Orbit-uncertainty class of the object.
    /// * `nominal_km`: Nominal miss distance, used by relative profiles.
    ///
    /// Return
    /// ----------
    /// * The standard deviation in km, or
    /// * [`NeoRiskError::InvalidUncertaintyClass`] outside `0..=9`,
    /// * [`NeoRiskError::DegenerateVariance`] if the resolved spread is not a finite positive number.
    pub fn sigma_km(
        &self,
        orbit_uncertainty: i64,
        nominal_km: Kilometer,
    ) -> Result<Kilometer, NeoRiskError> {
        let idx = class_index(orbit_uncertainty)?;
        let entry = self.sigmas[idx];
        let sigma_km = match self.scale {
            SigmaScale::Relative => nominal_km * entry,
            SigmaScale::Absolute => entry,
        };

        if !sigma_km.is_finite() || sigma_km <= 0.0 {
            return Err(NeoRiskError::DegenerateVariance {
                class: idx as u8,
                sigma_km,
            });
        }
        Ok(sigma_km)
    }

    pub fn scale(&self) -> SigmaScale {
        self.scale
    }

    pub fn sigmas(&self) -> &[f64; N_UNCERTAINTY_CLASSES] {
        &self.sigmas
    }
}

impl Default for UncertaintyProfile {
    fn default() -> Self {
        UncertaintyProfile {
            sigmas: DEFAULT_RELATIVE_SIGMAS,
            scale: SigmaScale::Relative,
        }
    }
}

impl TryFrom<ProfileTable> for UncertaintyProfile {
    type Error = NeoRiskError;

    fn try_from(table: ProfileTable) -> Result<Self, Self::Error> {
        UncertaintyProfile::new(table.sigmas, table.scale)
    }
}

impl From<UncertaintyProfile> for ProfileTable {
    fn from(profile: UncertaintyProfile) -> Self {
        ProfileTable {
            scale: profile.scale,
            sigmas: profile.sigmas,
        }
    }
}

impl fmt::Display for UncertaintyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Orbit uncertainty profile ({})", self.scale)?;
            writeln!(f, "-------------------------------")?;
            for (class, sigma) in self.sigmas.iter().enumerate() {
                match self.scale {
                    SigmaScale::Relative => {
                        writeln!(f, "  class {class} : {:>7.2} %", sigma * 100.0)?
                    }
                    SigmaScale::Absolute => writeln!(f, "  class {class} : {sigma:>10.1} km")?,
                }
            }
            Ok(())
        } else {
            write!(f, "UncertaintyProfile({}, {:?})", self.scale, self.sigmas)
        }
    }
}
